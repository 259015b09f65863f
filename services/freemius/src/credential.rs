use std::fmt;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use licsign_core::{utils::Redact, Error, SigningCredential};
use serde::{Deserialize, Serialize};

/// The entity type a credential set authenticates as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// An application.
    App,
    /// A developer account.
    Developer,
    /// An end user.
    User,
    /// An installed product instance.
    Install,
}

impl Scope {
    /// The lowercase wire name of this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::App => "app",
            Scope::Developer => "developer",
            Scope::User => "user",
            Scope::Install => "install",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Scope::App),
            "developer" => Ok(Scope::Developer),
            "user" => Ok(Scope::User),
            "install" => Ok(Scope::Install),
            _ => Err(Error::config_invalid(format!("unknown scope: {s}"))),
        }
    }
}

/// Credential for the licensing API.
#[derive(Clone)]
pub struct Credential {
    /// The entity type this credential authenticates as.
    pub scope: Scope,
    /// The entity's id.
    pub id: u64,
    /// Public key.
    pub public_key: String,
    /// Secret key.
    pub secret_key: String,
}

impl Credential {
    /// Create a new credential.
    ///
    /// When no distinct secret key is supplied the public key doubles as
    /// the signing key, which switches the authorization scheme tag from
    /// `FS` to `FSP`.
    pub fn new(
        scope: Scope,
        id: u64,
        public_key: impl Into<String>,
        secret_key: Option<String>,
    ) -> Self {
        let public_key = public_key.into();
        let secret_key = secret_key.unwrap_or_else(|| public_key.clone());

        Self {
            scope,
            id,
            public_key,
            secret_key,
        }
    }

    /// Whether signatures use the public-key-hash scheme (`FSP`).
    pub fn uses_public_key_auth(&self) -> bool {
        self.secret_key == self.public_key
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scope", &self.scope)
            .field("id", &self.id)
            .field("public_key", &Redact::from(&self.public_key))
            .field("secret_key", &Redact::from(&self.secret_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.public_key.is_empty() && !self.secret_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_defaults_to_public_key() {
        let cred = Credential::new(Scope::Developer, 1234, "pk_abc", None);
        assert_eq!(cred.secret_key, "pk_abc");
        assert!(cred.uses_public_key_auth());

        let cred = Credential::new(Scope::Developer, 1234, "pk_abc", Some("sk_def".to_string()));
        assert_eq!(cred.secret_key, "sk_def");
        assert!(!cred.uses_public_key_auth());
    }

    #[test]
    fn test_scope_round_trip() {
        for (scope, s) in [
            (Scope::App, "app"),
            (Scope::Developer, "developer"),
            (Scope::User, "user"),
            (Scope::Install, "install"),
        ] {
            assert_eq!(scope.to_string(), s);
            assert_eq!(s.parse::<Scope>().unwrap(), scope);
        }

        assert!("plugin".parse::<Scope>().is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let cred = Credential::new(
            Scope::User,
            7,
            "pk_A7dqmGYHPuGLdRpTSGRm",
            Some("sk_ubuMcKkVm4uVRBlJsUQvuUYr".to_string()),
        );
        let out = format!("{cred:?}");
        assert!(!out.contains("sk_ubuMcKkVm4uVRBlJsUQvuUYr"));
        assert!(out.contains("pk_***"));
    }
}
