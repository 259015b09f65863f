//! Signed requests for the Freemius licensing API.
//!
//! This crate implements the licensing API's authorization scheme
//! (`FS`/`FSP` HMAC-SHA256 over a canonical request representation), the
//! JSON/multipart body encoding its write operations use, and a [`Client`]
//! that dispatches signed exchanges with a single forced-IPv4 fallback for
//! dual-stack hosts without IPv6 connectivity.
//!
//! ## Example
//!
//! ```no_run
//! use licsign_core::{Context, OsEnv};
//! use licsign_freemius::{Client, Config, Scope};
//! use serde_json::json;
//!
//! # async fn example() -> licsign_core::Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//!
//! let config = Config::new()
//!     .with_scope(Scope::Developer)
//!     .with_id(1234)
//!     .with_public_key("pk_YOUR_PUBLIC_KEY")
//!     .with_secret_key("sk_YOUR_SECRET_KEY");
//!
//! let client = Client::new(ctx, config);
//! let resp = client
//!     .post(
//!         "/v1/developers/1234/plugins/115/tags.json",
//!         Some(&json!({ "add_contributor": true })),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod body;
pub use body::{ExtensionMimeResolver, MimeResolver};

mod client;
pub use client::Client;

mod config;
pub use config::Config;

mod credential;
pub use credential::{Credential, Scope};

mod provide_credential;
pub use provide_credential::{
    DefaultCredentialProvider, EnvCredentialProvider, StaticCredentialProvider,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod constants;
