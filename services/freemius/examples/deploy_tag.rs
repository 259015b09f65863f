//! Upload a plugin archive and create a tag for it.
//!
//! ```shell
//! cargo run --example deploy_tag
//! ```

use licsign_core::{Context, ForceIpv4, OsEnv};
use licsign_file_read_tokio::TokioFileRead;
use licsign_freemius::{Client, Config, Scope};
use licsign_http_send_reqwest::{ReqwestHttpSend, TransportOptions};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let force_ipv4 = ForceIpv4::new();
    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::from_options(
            TransportOptions::default(),
            force_ipv4.clone(),
        )?)
        .with_env(OsEnv);

    let config = Config::new()
        .with_scope(Scope::Developer)
        .with_id(1234)
        .with_public_key("pk_YOUR_PUBLIC_KEY")
        .with_secret_key("sk_YOUR_SECRET_KEY");

    let client = Client::new(ctx, config).with_force_ipv4(force_ipv4);

    let resp = client
        .call(
            http::Method::POST,
            "/v1/developers/1234/plugins/115/tags.json",
            Some(&json!({ "add_contributor": true })),
            &[("file", "./my-plugin.zip")],
        )
        .await?;

    println!("{}", String::from_utf8_lossy(&resp));

    Ok(())
}
