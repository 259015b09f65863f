//! The licensing API client.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::Method;
use log::{debug, warn};
use serde_json::Value;

use crate::body::{self, ExtensionMimeResolver, MimeResolver, RequestBody};
use crate::config::Config;
use crate::constants::{API_ADDRESS, API_SANDBOX_ADDRESS, CONTENT_MD5};
use crate::credential::Credential;
use crate::provide_credential::{DefaultCredentialProvider, StaticCredentialProvider};
use crate::sign_request::RequestSigner;
use licsign_core::hash::hex_md5;
use licsign_core::{Context, Error, ForceIpv4, Result, Signer};

/// Client for the licensing API.
///
/// One instance owns its credential cache and transport context and may be
/// shared across threads. Cross-call mutable state is limited to the
/// cached credential (mutex) and the IPv4 toggle (atomic); everything else
/// is built fresh per call.
///
/// Responses are returned as raw bytes whatever their HTTP status;
/// decoding them is the caller's business.
///
/// ## Example
///
/// ```no_run
/// use licsign_core::Context;
/// use licsign_freemius::{Client, Config, Scope};
///
/// # async fn example() -> licsign_core::Result<()> {
/// let config = Config::new()
///     .with_scope(Scope::Developer)
///     .with_id(1234)
///     .with_public_key("pk_YOUR_PUBLIC_KEY")
///     .with_secret_key("sk_YOUR_SECRET_KEY");
///
/// let client = Client::new(Context::new(), config);
/// let plugins = client.get("/v1/developers/1234/plugins.json").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    ctx: Context,
    signer: Signer<Credential>,
    base: &'static str,
    force_ipv4: ForceIpv4,
    mime: Arc<dyn MimeResolver>,
}

impl Client {
    /// Create a new client.
    ///
    /// Credentials present in `config` take priority; anything missing is
    /// looked up through the default provider chain (environment
    /// variables) at first use.
    pub fn new(ctx: Context, config: Config) -> Self {
        let mut provider = DefaultCredentialProvider::new();
        if let (Some(scope), Some(id), Some(public_key)) =
            (config.scope, config.id, config.public_key.as_ref())
        {
            provider = provider.push_front(StaticCredentialProvider::new(
                scope,
                id,
                public_key.clone(),
                config.secret_key.clone(),
            ));
        }

        let builder = RequestSigner::new().with_clock_offset(config.clock_offset);
        let signer = Signer::new(ctx.clone(), provider, builder);

        Self {
            ctx,
            signer,
            base: if config.sandbox.unwrap_or(false) {
                API_SANDBOX_ADDRESS
            } else {
                API_ADDRESS
            },
            force_ipv4: ForceIpv4::new(),
            mime: Arc::new(ExtensionMimeResolver),
        }
    }

    /// Share an IPv4 toggle with the transport.
    ///
    /// Pass a clone of the toggle the transport was built with so that the
    /// dispatcher's fallback decision actually reroutes the retry.
    pub fn with_force_ipv4(mut self, force_ipv4: ForceIpv4) -> Self {
        self.force_ipv4 = force_ipv4;
        self
    }

    /// Replace the MIME resolver used for file attachments.
    pub fn with_mime_resolver(mut self, mime: impl MimeResolver) -> Self {
        self.mime = Arc::new(mime);
        self
    }

    /// The absolute URL for a canonical path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    /// Issue a GET request.
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        self.call(Method::GET, path, None, &[]).await
    }

    /// Issue a POST request with JSON parameters.
    pub async fn post(&self, path: &str, params: Option<&Value>) -> Result<Bytes> {
        self.call(Method::POST, path, params, &[]).await
    }

    /// Issue a PUT request with JSON parameters.
    pub async fn put(&self, path: &str, params: Option<&Value>) -> Result<Bytes> {
        self.call(Method::PUT, path, params, &[]).await
    }

    /// Issue a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Bytes> {
        self.call(Method::DELETE, path, None, &[]).await
    }

    /// Issue a signed request and return the raw response body.
    ///
    /// `params` is serialized to JSON. `files` maps multipart field names
    /// to file paths; when any are given (POST/PUT only), parameters ride
    /// inside the multipart body as a single JSON `data` field. A PUT with
    /// files goes over the wire as POST with a `method=PUT` query marker,
    /// while the signature keeps covering PUT.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        params: Option<&Value>,
        files: &[(&str, &str)],
    ) -> Result<Bytes> {
        let is_write = method == Method::POST || method == Method::PUT;

        let json = match params {
            Some(v) if !is_empty_params(v) => serde_json::to_string(v).map_err(|e| {
                Error::encoding_invalid("failed to encode parameters").with_source(e)
            })?,
            _ => String::new(),
        };

        let mut path = path.to_string();
        let mut wire_method = method.clone();

        // BUILD
        let request_body = if is_write && !files.is_empty() {
            let boundary = body::generate_boundary();
            let data = (!json.is_empty()).then_some(json.as_str());
            let encoded =
                body::multipart_body(&self.ctx, data, files, &boundary, self.mime.as_ref())
                    .await?;

            // Multipart PUT is not universally supported: ship it as POST
            // with an override marker. The signature keeps covering PUT.
            if wire_method == Method::PUT {
                path.push(if path.contains('?') { '&' } else { '?' });
                path.push_str("method=PUT");
                wire_method = Method::POST;
            }

            RequestBody::Multipart {
                body: encoded,
                boundary,
            }
        } else if is_write && !json.is_empty() {
            RequestBody::Json(json)
        } else {
            RequestBody::Empty
        };

        // SIGN
        let req = http::Request::builder()
            .method(method)
            .uri(self.url(&path))
            .body(())?;
        let (mut parts, _) = req.into_parts();

        parts
            .headers
            .insert(CONTENT_TYPE, request_body.content_type().parse()?);
        if let Some(json_body) = request_body.json() {
            parts.headers.insert(
                HeaderName::from_static(CONTENT_MD5),
                hex_md5(json_body.as_bytes()).parse()?,
            );
        }

        self.signer.sign(&mut parts, None).await?;
        parts.method = wire_method;

        // EXECUTE
        let method = parts.method;
        let uri = parts.uri;
        let headers = parts.headers;
        let payload = request_body.into_bytes();

        let make_request = || -> Result<http::Request<Bytes>> {
            let mut req = http::Request::builder()
                .method(method.clone())
                .uri(uri.clone())
                .body(payload.clone())?;
            *req.headers_mut() = headers.clone();
            Ok(req)
        };

        debug!("sending {} {}", method, uri);
        let resp = match self.ctx.http_send(make_request()?).await {
            Ok(resp) => resp,
            Err(err) => {
                if self.force_ipv4.enabled()
                    || !should_force_ipv4(uri.host().unwrap_or_default(), &err)
                {
                    return Err(err);
                }

                warn!("ipv6 route unreachable, retrying once over forced ipv4");
                self.force_ipv4.set();
                self.ctx.http_send(make_request()?).await?
            }
        };

        Ok(resp.into_body())
    }

    /// Produce a pre-signed URL.
    ///
    /// The signature material travels as `auth_date` and `authorization`
    /// query parameters instead of headers, for consumers that cannot
    /// attach headers (e.g. browser redirects). Query parameters already
    /// on `path` are preserved and excluded from the signature.
    pub async fn signed_url(&self, path: &str) -> Result<String> {
        let req = http::Request::get(self.url(path)).body(())?;
        let (mut parts, _) = req.into_parts();

        self.signer.sign(&mut parts, Some(Duration::ZERO)).await?;

        Ok(parts.uri.to_string())
    }
}

fn is_empty_params(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

/// Decide whether a transport failure looks like the dual-stack
/// IPv6-without-connectivity class.
///
/// Primary signal: curl-shaped failure text naming an IPv6 literal.
/// Fallback capability check: the target host itself is an IPv6 literal
/// and the failure mentions an unreachable network. Exact text varies
/// across transports, so detection is best-effort.
fn should_force_ipv4(host: &str, err: &Error) -> bool {
    let text = err.to_string();

    if let Some(peer) = unreachable_host(&text) {
        return peer.parse::<IpAddr>().is_ok_and(|ip| ip.is_ipv6());
    }

    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.parse::<IpAddr>().is_ok_and(|ip| ip.is_ipv6())
        && text.to_ascii_lowercase().contains("unreachable")
}

/// Extract the peer from `Failed to connect to <host>: Network is unreachable`.
fn unreachable_host(text: &str) -> Option<&str> {
    const PREFIX: &str = "failed to connect to ";
    const SUFFIX: &str = ": network is unreachable";

    let lower = text.to_ascii_lowercase();
    let start = lower.find(PREFIX)? + PREFIX.len();
    let end = lower[start..].rfind(SUFFIX)? + start;

    Some(text[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_host_extraction() {
        assert_eq!(
            unreachable_host("Failed to connect to 2001:db8::1: Network is unreachable"),
            Some("2001:db8::1")
        );
        assert_eq!(
            unreachable_host("Failed to connect to example.com: Network is unreachable"),
            Some("example.com")
        );
        assert_eq!(unreachable_host("connection timed out"), None);
    }

    #[test]
    fn test_should_force_ipv4_on_ipv6_literal() {
        let err =
            Error::transport_failed("Failed to connect to 2001:db8::1: Network is unreachable");
        assert!(should_force_ipv4("api.freemius.com", &err));
    }

    #[test]
    fn test_should_not_force_ipv4_on_hostname() {
        let err =
            Error::transport_failed("Failed to connect to example.com: Network is unreachable");
        assert!(!should_force_ipv4("api.freemius.com", &err));
    }

    #[test]
    fn test_should_not_force_ipv4_on_ipv4_literal() {
        let err =
            Error::transport_failed("Failed to connect to 192.0.2.1: Network is unreachable");
        assert!(!should_force_ipv4("api.freemius.com", &err));
    }

    #[test]
    fn test_capability_check_on_ipv6_target() {
        let err = Error::transport_failed(
            "error sending request: client error (Connect): Network unreachable (os error 101)",
        );
        assert!(should_force_ipv4("[2001:db8::1]", &err));
        assert!(!should_force_ipv4("api.freemius.com", &err));
    }

    #[test]
    fn test_is_empty_params() {
        use serde_json::json;

        assert!(is_empty_params(&Value::Null));
        assert!(is_empty_params(&json!({})));
        assert!(!is_empty_params(&json!({"add_contributor": true})));
    }
}
