//! Licensing API request signer.

use std::fmt::Write;
use std::time::Duration;

use http::header::HeaderName;
use http::header::AUTHORIZATION;
use http::header::CONTENT_TYPE;
use http::header::DATE;
use http::HeaderValue;
use log::debug;
use percent_encoding::utf8_percent_encode;

use crate::constants::{CONTENT_MD5, QUERY_ENCODE_SET};
use crate::credential::Credential;
use licsign_core::hash::{base64url_no_pad, hex_hmac_sha256};
use licsign_core::time::{format_rfc2822, now, DateTime};
use licsign_core::{Context, Error, Result};
use licsign_core::{SignRequest, SigningMethod, SigningRequest};

/// RequestSigner that implements the licensing API authorization scheme.
///
/// In header mode it inserts:
/// - `Date`: RFC 2822 timestamp, shifted by the configured clock offset
/// - `Authorization`: `FS {id}:{public_key}:{signature}`, or `FSP …` when
///   the credential signs with its public key
///
/// A `Content-MD5` header set by the dispatcher is folded into the
/// signature; the signer never computes one itself.
///
/// In query mode (signed URLs) the same material is delivered as
/// `auth_date` and `authorization` query parameters instead.
#[derive(Debug, Default)]
pub struct RequestSigner {
    clock_offset: i64,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new request signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the signing clock by `offset` seconds to compensate for skew
    /// against the API server. Positive offsets move the signed date into
    /// the past.
    pub fn with_clock_offset(mut self, offset: i64) -> Self {
        self.clock_offset = offset;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let k = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        let now = self.time.unwrap_or_else(now) - chrono::TimeDelta::seconds(self.clock_offset);

        let method = if let Some(expires_in) = expires_in {
            SigningMethod::Query(expires_in)
        } else {
            SigningMethod::Header
        };

        let mut ctx = SigningRequest::build(parts)?;

        let date = format_rfc2822(now);
        let string_to_sign = string_to_sign(&ctx, &date)?;
        // The wire signature is the base64url form of the lowercase hex
        // digest, not of the raw MAC bytes.
        let signature = base64url_no_pad(
            hex_hmac_sha256(k.secret_key.as_bytes(), string_to_sign.as_bytes()).as_bytes(),
        );

        let tag = if k.uses_public_key_auth() { "FSP" } else { "FS" };
        let authorization = format!("{tag} {}:{}:{signature}", k.id, k.public_key);

        match method {
            SigningMethod::Header => {
                ctx.headers.insert(DATE, date.parse()?);
                ctx.headers.insert(AUTHORIZATION, {
                    let mut value: HeaderValue = authorization.parse()?;
                    value.set_sensitive(true);

                    value
                });
            }
            // The scheme embeds no expiry parameter; `auth_date` anchors
            // the server-side validity window.
            SigningMethod::Query(_) => {
                ctx.query_push(
                    "auth_date",
                    utf8_percent_encode(&date, &QUERY_ENCODE_SET).to_string(),
                );
                ctx.query_push(
                    "authorization",
                    utf8_percent_encode(&authorization, &QUERY_ENCODE_SET).to_string(),
                );
            }
        }

        ctx.apply(parts)
    }
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// Path
/// ```
///
/// All five slots are always present; an absent field leaves its slot
/// empty. The path excludes the query string, so parameters appended
/// after signing do not disturb the signature.
fn string_to_sign(ctx: &SigningRequest, date: &str) -> Result<String> {
    let mut s = String::new();
    s.write_str(ctx.method.as_str())?;
    s.write_str("\n")?;
    s.write_str(ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?)?;
    s.write_str("\n")?;
    s.write_str(ctx.header_get_or_default(&CONTENT_TYPE)?)?;
    s.write_str("\n")?;
    s.write_str(date)?;
    s.write_str("\n")?;
    s.write_str(&ctx.path)?;

    debug!("string to sign: {}", &s);
    Ok(s)
}
