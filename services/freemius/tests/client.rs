//! Client dispatch behavior against a recording transport.

use std::collections::VecDeque;
use std::io::Write as _;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use licsign_core::hash::hex_md5;
use licsign_core::{Context, Error, ErrorKind, ForceIpv4, HttpSend, Result};
use licsign_file_read_tokio::TokioFileRead;
use licsign_freemius::{Client, Config, Scope};
use serde_json::json;

/// Transport double that records every request and can be primed with
/// failures, consumed one per send.
#[derive(Debug)]
struct RecordingHttpSend {
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    failures: Arc<Mutex<VecDeque<String>>>,
    status: Arc<Mutex<u16>>,
}

impl RecordingHttpSend {
    fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            status: Arc::new(Mutex::new(200)),
        }
    }

    fn requests(&self) -> Arc<Mutex<Vec<http::Request<Bytes>>>> {
        self.requests.clone()
    }

    fn fail_next(&self, message: &str) {
        self.failures.lock().unwrap().push_back(message.to_string());
    }

    fn respond_with_status(&self, status: u16) {
        *self.status.lock().unwrap() = status;
    }
}

#[async_trait]
impl HttpSend for RecordingHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);

        if let Some(message) = self.failures.lock().unwrap().pop_front() {
            return Err(Error::transport_failed(message).with_code(101));
        }

        let status = *self.status.lock().unwrap();
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::from_static(b"{\"id\":115}"))
            .unwrap())
    }
}

fn config() -> Config {
    Config::new()
        .with_scope(Scope::Developer)
        .with_id(1234)
        .with_public_key("pk_test")
        .with_secret_key("sk_test")
}

fn client_with(transport: RecordingHttpSend) -> Client {
    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(transport);
    Client::new(ctx, config())
}

fn zip_fixture() -> (tempfile::NamedTempFile, String) {
    let mut file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
    file.write_all(b"zip bytes").unwrap();
    let path = file.path().to_str().unwrap().to_string();
    (file, path)
}

#[tokio::test]
async fn test_get_signs_headers() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    let resp = client
        .get("/v1/developers/1234/plugins.json")
        .await
        .unwrap();
    assert_eq!(resp, Bytes::from_static(b"{\"id\":115}"));

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);

    let req = &requests[0];
    assert_eq!(req.method(), Method::GET);
    assert_eq!(
        req.uri().to_string(),
        "https://api.freemius.com/v1/developers/1234/plugins.json"
    );
    assert_eq!(req.headers().get("Content-Type").unwrap(), "application/json");
    assert!(req.headers().contains_key("Date"));
    assert!(req
        .headers()
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("FS 1234:pk_test:"));
    assert!(!req.headers().contains_key("Content-MD5"));
    assert!(req.body().is_empty());
}

#[tokio::test]
async fn test_post_json_sets_content_md5() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    let params = json!({ "add_contributor": true });
    client
        .post("/v1/developers/1234/plugins/115/tags.json", Some(&params))
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let req = &requests[0];
    let body = r#"{"add_contributor":true}"#;

    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.body(), &Bytes::from_static(body.as_bytes()));
    assert_eq!(
        req.headers().get("Content-MD5").unwrap(),
        hex_md5(body.as_bytes()).as_str()
    );
}

#[tokio::test]
async fn test_post_without_params_sends_empty_body() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    client
        .post("/v1/developers/1234/plugins/115/tags.json", Some(&json!({})))
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let req = &requests[0];
    assert!(req.body().is_empty());
    assert!(!req.headers().contains_key("Content-MD5"));
}

#[tokio::test]
async fn test_post_with_file_builds_multipart() {
    let (_file, path) = zip_fixture();
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    let params = json!({ "add_contributor": true });
    client
        .call(
            Method::POST,
            "/v1/developers/1234/plugins/115/tags.json",
            Some(&params),
            &[("file", path.as_str())],
        )
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let req = &requests[0];

    // POST with files keeps its wire method; no override marker.
    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.uri().query(), None);

    let content_type = req.headers().get("Content-Type").unwrap().to_str().unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();

    let body = String::from_utf8(req.body().to_vec()).unwrap();
    assert!(body.contains("Content-Disposition: form-data; name=\"data\""));
    assert!(body.contains(r#"{"add_contributor":true}"#));
    assert!(body.contains("Content-Disposition: form-data; name=\"file\"; filename="));
    assert!(body.contains("Content-Type: application/zip"));
    assert!(body.ends_with(&format!("--{boundary}--")));

    // Multipart bodies carry no Content-MD5.
    assert!(!req.headers().contains_key("Content-MD5"));
}

#[tokio::test]
async fn test_put_with_file_overrides_wire_method() {
    let (_file, path) = zip_fixture();
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    client
        .call(
            Method::PUT,
            "/v1/developers/1234/plugins/115/tags/7.json",
            Some(&json!({ "release_mode": "pending" })),
            &[("file", path.as_str())],
        )
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let req = &requests[0];

    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.uri().query(), Some("method=PUT"));
    assert!(req
        .headers()
        .get("Content-Type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    assert!(req.headers().contains_key("Authorization"));
}

#[tokio::test]
async fn test_unknown_extension_aborts_before_dispatch() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    let err = client
        .call(
            Method::POST,
            "/v1/developers/1234/plugins/115/tags.json",
            None,
            &[("file", "installer.exe")],
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EncodingInvalid);
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ipv6_unreachable_retries_once() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    transport.fail_next("Failed to connect to 2001:db8::1: Network is unreachable");

    let force_ipv4 = ForceIpv4::new();
    let client = client_with(transport).with_force_ipv4(force_ipv4.clone());

    let resp = client
        .get("/v1/developers/1234/plugins.json")
        .await
        .unwrap();

    assert_eq!(resp, Bytes::from_static(b"{\"id\":115}"));
    assert_eq!(requests.lock().unwrap().len(), 2);
    assert!(force_ipv4.enabled());
}

#[tokio::test]
async fn test_ipv6_unreachable_retries_exactly_once() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    transport.fail_next("Failed to connect to 2001:db8::1: Network is unreachable");
    transport.fail_next("Failed to connect to 2001:db8::1: Network is unreachable");

    let client = client_with(transport).with_force_ipv4(ForceIpv4::new());

    let err = client
        .get("/v1/developers/1234/plugins.json")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportFailed);
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreachable_hostname_is_terminal() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    transport.fail_next("Failed to connect to example.com: Network is unreachable");

    let force_ipv4 = ForceIpv4::new();
    let client = client_with(transport).with_force_ipv4(force_ipv4.clone());

    let err = client
        .get("/v1/developers/1234/plugins.json")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportFailed);
    assert_eq!(err.code(), Some(101));
    assert_eq!(requests.lock().unwrap().len(), 1);
    assert!(!force_ipv4.enabled());
}

#[tokio::test]
async fn test_error_status_body_is_passed_through() {
    let transport = RecordingHttpSend::new();
    transport.respond_with_status(404);
    let client = client_with(transport);

    // Transport-level success is a call-level success whatever the HTTP
    // status; decoding is the caller's business.
    let resp = client
        .get("/v1/developers/1234/plugins/999.json")
        .await
        .unwrap();
    assert_eq!(resp, Bytes::from_static(b"{\"id\":115}"));
}

#[tokio::test]
async fn test_signed_url_carries_auth_query() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    let url = client
        .signed_url("/v1/developers/1234/plugins.json?fields=id")
        .await
        .unwrap();

    assert!(url.starts_with(
        "https://api.freemius.com/v1/developers/1234/plugins.json?fields=id&auth_date="
    ));
    assert!(url.contains("&authorization=FS%201234%3Apk_test%3A"));
    // Producing a signed URL performs no exchange.
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sandbox_targets_sandbox_address() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let ctx = Context::new().with_http_send(transport);
    let client = Client::new(ctx, config().with_sandbox(true));

    client.get("/v1/developers/1234/plugins.json").await.unwrap();

    let requests = requests.lock().unwrap();
    assert!(requests[0]
        .uri()
        .to_string()
        .starts_with("https://sandbox-api.freemius.com/"));
}

#[tokio::test]
async fn test_delete_signs_without_body() {
    let transport = RecordingHttpSend::new();
    let requests = transport.requests();
    let client = client_with(transport);

    client
        .delete("/v1/developers/1234/plugins/115/tags/7.json")
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let req = &requests[0];
    assert_eq!(req.method(), Method::DELETE);
    assert!(req.body().is_empty());
    assert!(req.headers().contains_key("Authorization"));
    assert!(!req.headers().contains_key("Content-MD5"));
}
