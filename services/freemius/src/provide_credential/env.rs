use async_trait::async_trait;
use licsign_core::{Context, Error, ProvideCredential, Result};

use crate::constants::*;
use crate::credential::Credential;

/// EnvCredentialProvider loads licensing API credentials from environment
/// variables.
///
/// This provider looks for the following environment variables:
/// - `FREEMIUS_API_SCOPE`: the entity type (`app`, `developer`, `user` or
///   `install`)
/// - `FREEMIUS_ENTITY_ID`: the entity's id
/// - `FREEMIUS_PUBLIC_KEY`: the public key
/// - `FREEMIUS_SECRET_KEY`: the secret key (optional; when absent the
///   public key signs and the `FSP` scheme is used)
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let (Some(scope), Some(id), Some(public_key)) = (
            envs.get(FREEMIUS_API_SCOPE),
            envs.get(FREEMIUS_ENTITY_ID),
            envs.get(FREEMIUS_PUBLIC_KEY),
        ) else {
            return Ok(None);
        };

        let scope = scope.parse()?;
        let id = id
            .parse()
            .map_err(|_| Error::config_invalid(format!("invalid entity id: {id}")))?;

        Ok(Some(Credential::new(
            scope,
            id,
            public_key.clone(),
            envs.get(FREEMIUS_SECRET_KEY).cloned(),
        )))
    }
}
