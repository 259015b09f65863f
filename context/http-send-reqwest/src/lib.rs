//! Reqwest-based HTTP transport for licsign.
//!
//! This crate provides [`ReqwestHttpSend`], an implementation of the
//! `HttpSend` trait from `licsign_core` over [`reqwest`], together with
//! [`TransportOptions`], the immutable per-transport configuration
//! template.
//!
//! Built with [`ReqwestHttpSend::from_options`], the transport keeps two
//! clients: the primary dual-stack one and a sibling bound to an IPv4
//! local address. A shared [`ForceIpv4`] toggle selects between them on
//! every send, so a dispatcher that flips the toggle after an
//! IPv6-unreachable failure transparently retries (and keeps going) over
//! IPv4.
//!
//! ## Example
//!
//! ```no_run
//! use licsign_core::{Context, ForceIpv4};
//! use licsign_http_send_reqwest::{ReqwestHttpSend, TransportOptions};
//!
//! # fn main() -> licsign_core::Result<()> {
//! let force_ipv4 = ForceIpv4::new();
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::from_options(TransportOptions::default(), force_ipv4)?);
//! # Ok(())
//! # }
//! ```

use std::error::Error as _;
use std::fmt::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use licsign_core::{Error, ForceIpv4, HttpSend, Result};
use reqwest::{Client, ClientBuilder, Request};

/// Configuration template for one transport.
///
/// Consumed once when the transport is built; per-call requests never
/// mutate it.
#[derive(Clone, Debug)]
pub struct TransportOptions {
    /// Maximum time allowed for establishing a connection.
    pub connect_timeout: Duration,
    /// Maximum time allowed for the whole exchange.
    pub timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Skip TLS certificate verification.
    ///
    /// Defaults to `true` for parity with the service's legacy clients.
    /// Set to `false` in deployments that require verified TLS.
    pub accept_invalid_certs: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
            user_agent: format!("licsign/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: true,
        }
    }
}

impl TransportOptions {
    fn builder(&self) -> ClientBuilder {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .danger_accept_invalid_certs(self.accept_invalid_certs)
    }
}

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug)]
pub struct ReqwestHttpSend {
    client: Client,
    ipv4_client: Option<Client>,
    force_ipv4: ForceIpv4,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl ReqwestHttpSend {
    /// Wrap a caller-built `reqwest::Client`.
    ///
    /// A transport built this way has no IPv4-bound sibling: the
    /// [`ForceIpv4`] toggle has no effect on it.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            ipv4_client: None,
            force_ipv4: ForceIpv4::new(),
        }
    }

    /// Build a dual-stack transport from options.
    ///
    /// The returned transport honors `force_ipv4`: while the toggle is
    /// set, exchanges go through a client bound to an IPv4 local address,
    /// which keeps the resolver off unreachable IPv6 routes.
    pub fn from_options(options: TransportOptions, force_ipv4: ForceIpv4) -> Result<Self> {
        let client = options
            .builder()
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;
        let ipv4_client = options
            .builder()
            .local_address(IpAddr::from(Ipv4Addr::UNSPECIFIED))
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;

        Ok(Self {
            client,
            ipv4_client: Some(ipv4_client),
            force_ipv4,
        })
    }

    fn pick_client(&self) -> &Client {
        if self.force_ipv4.enabled() {
            self.ipv4_client.as_ref().unwrap_or(&self.client)
        } else {
            &self.client
        }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("invalid request for transport").with_source(e))?;

        let resp: http::Response<_> = self
            .pick_client()
            .execute(req)
            .await
            .map_err(into_transport_error)?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(into_transport_error)?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

/// Flatten a reqwest error into a transport failure.
///
/// The whole source chain is folded into the message so that dispatchers
/// can inspect the underlying connect failure text, and the deepest OS
/// error code is surfaced as the numeric transport code.
fn into_transport_error(e: reqwest::Error) -> Error {
    let mut message = e.to_string();
    let mut code = None;

    let mut source = e.source();
    while let Some(s) = source {
        let _ = write!(message, ": {s}");
        if code.is_none() {
            if let Some(io) = s.downcast_ref::<std::io::Error>() {
                code = io.raw_os_error();
            }
        }
        source = s.source();
    }

    let mut err = Error::transport_failed(message).with_source(e);
    if let Some(code) = code {
        err = err.with_code(code);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = TransportOptions::default();
        assert_eq!(opts.connect_timeout, Duration::from_secs(10));
        assert_eq!(opts.timeout, Duration::from_secs(60));
        assert!(opts.user_agent.starts_with("licsign/"));
        assert!(opts.accept_invalid_certs);
    }

    #[tokio::test]
    async fn test_from_options_builds_dual_stack() {
        let transport =
            ReqwestHttpSend::from_options(TransportOptions::default(), ForceIpv4::new()).unwrap();
        assert!(transport.ipv4_client.is_some());
    }

    #[tokio::test]
    async fn test_custom_client_ignores_toggle() {
        let transport = ReqwestHttpSend::default();
        transport.force_ipv4.set();
        // Without an IPv4 sibling the primary client keeps serving.
        assert!(std::ptr::eq(transport.pick_client(), &transport.client));
    }
}
