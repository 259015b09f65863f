use std::fmt::{Debug, Formatter};

use crate::constants::*;
use crate::credential::Scope;
use licsign_core::{utils::Redact, Context};

/// Config carries all the configuration for the licensing API client.
#[derive(Clone, Default)]
pub struct Config {
    /// `scope` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`FREEMIUS_API_SCOPE`]
    pub scope: Option<Scope>,
    /// `id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`FREEMIUS_ENTITY_ID`]
    pub id: Option<u64>,
    /// `public_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`FREEMIUS_PUBLIC_KEY`]
    pub public_key: Option<String>,
    /// `secret_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`FREEMIUS_SECRET_KEY`]
    ///
    /// When left unset the public key doubles as the signing key and the
    /// authorization tag switches to `FSP`.
    pub secret_key: Option<String>,
    /// Target the sandbox endpoint instead of the production one.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`FREEMIUS_API_SANDBOX`] (`1` or `true`)
    pub sandbox: Option<bool>,
    /// Clock skew against the API server, in seconds.
    ///
    /// Positive values move the signed date into the past.
    pub clock_offset: i64,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Set id
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set public_key
    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    /// Set secret_key
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set sandbox
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Set clock_offset
    pub fn with_clock_offset(mut self, clock_offset: i64) -> Self {
        self.clock_offset = clock_offset;
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(FREEMIUS_API_SCOPE) {
            if let Ok(scope) = v.parse() {
                self.scope.get_or_insert(scope);
            }
        }
        if let Some(v) = ctx.env_var(FREEMIUS_ENTITY_ID) {
            if let Ok(id) = v.parse() {
                self.id.get_or_insert(id);
            }
        }
        if let Some(v) = ctx.env_var(FREEMIUS_PUBLIC_KEY) {
            self.public_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(FREEMIUS_SECRET_KEY) {
            self.secret_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(FREEMIUS_API_SANDBOX) {
            self.sandbox.get_or_insert(v == "1" || v == "true");
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("scope", &self.scope)
            .field("id", &self.id)
            .field("public_key", &self.public_key.as_ref().map(Redact::from))
            .field("secret_key", &self.secret_key.as_ref().map(Redact::from))
            .field("sandbox", &self.sandbox)
            .field("clock_offset", &self.clock_offset)
            .finish()
    }
}
