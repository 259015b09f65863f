use async_trait::async_trait;
use licsign_core::{Context, ProvideCredential, Result};

use crate::credential::{Credential, Scope};

/// StaticCredentialProvider serves a credential fixed at construction.
///
/// Useful when keys come from the caller's own configuration layer rather
/// than the environment.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider.
    ///
    /// Passing `None` as the secret key selects public-key-hash (`FSP`)
    /// signing.
    pub fn new(
        scope: Scope,
        id: u64,
        public_key: impl Into<String>,
        secret_key: Option<String>,
    ) -> Self {
        Self {
            credential: Credential::new(scope, id, public_key, secret_key),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
