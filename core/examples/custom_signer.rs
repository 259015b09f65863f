use async_trait::async_trait;
use http::request::Parts;
use licsign_core::hash::base64url_no_pad;
use licsign_core::hash::hex_hmac_sha256;
use licsign_core::Result;
use licsign_core::{Context, Error, OsEnv, ProvideCredential, SignRequest, Signer, SigningCredential};
use std::time::Duration;

// Define a custom credential type
#[derive(Clone, Debug)]
struct MyCredential {
    api_key: String,
    api_secret: String,
}

impl SigningCredential for MyCredential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

// Implement a credential loader that loads from environment
#[derive(Debug)]
struct MyCredentialLoader;

#[async_trait]
impl ProvideCredential for MyCredentialLoader {
    type Credential = MyCredential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        // Load credentials from environment variables
        let api_key = ctx.env_var("MY_API_KEY").unwrap_or_default();
        let api_secret = ctx.env_var("MY_API_SECRET").unwrap_or_default();

        // For demo purposes, use dummy credentials if none are provided
        if api_key.is_empty() || api_secret.is_empty() {
            println!("No credentials found in environment, using demo credentials");
            return Ok(Some(MyCredential {
                api_key: "demo-api-key".to_string(),
                api_secret: "demo-api-secret".to_string(),
            }));
        }

        Ok(Some(MyCredential {
            api_key,
            api_secret,
        }))
    }
}

// Implement a request builder
#[derive(Debug)]
struct MyRequestBuilder;

#[async_trait]
impl SignRequest for MyRequestBuilder {
    type Credential = MyCredential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        _expires_in: Option<Duration>,
    ) -> Result<()> {
        let cred =
            credential.ok_or_else(|| Error::credential_invalid("no credential provided"))?;

        // Sign the method and path with the secret
        let string_to_sign = format!("{}\n{}", req.method, req.uri.path());
        let signature = base64url_no_pad(
            hex_hmac_sha256(cred.api_secret.as_bytes(), string_to_sign.as_bytes()).as_bytes(),
        );

        req.headers.insert("x-api-key", cred.api_key.parse()?);
        req.headers.insert("x-api-signature", signature.parse()?);

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Create a context; signing only needs environment access
    let ctx = Context::new().with_env(OsEnv);

    // Create the signer
    let signer = Signer::new(ctx, MyCredentialLoader, MyRequestBuilder);

    // Create a request to sign
    let mut parts = http::Request::builder()
        .method("GET")
        .uri("https://api.example.com/v1/users")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    // Sign the request
    match signer.sign(&mut parts, None).await {
        Ok(_) => {
            println!("Request signed successfully!");
            println!("Headers: {:?}", parts.headers);
        }
        Err(e) => {
            eprintln!("Failed to sign request: {}", e);
        }
    }

    Ok(())
}
