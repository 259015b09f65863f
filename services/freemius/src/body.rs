//! Request body encoding.
//!
//! Calls without attachments travel as a JSON document; calls with
//! attachments become a multipart body in which scalar parameters ride as
//! a single JSON-encoded `data` field and each file gets its own part.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;

use bytes::Bytes;
use once_cell::sync::Lazy;

use licsign_core::{Context, Error, Result};

/// Content type used for JSON request bodies.
pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// An encoded request body plus the content type describing it.
#[derive(Debug)]
pub(crate) enum RequestBody {
    Empty,
    Json(String),
    Multipart { body: Bytes, boundary: String },
}

impl RequestBody {
    pub(crate) fn content_type(&self) -> String {
        match self {
            RequestBody::Empty | RequestBody::Json(_) => JSON_CONTENT_TYPE.to_string(),
            RequestBody::Multipart { boundary, .. } => {
                format!("multipart/form-data; boundary={boundary}")
            }
        }
    }

    /// The JSON document, when this body is one.
    pub(crate) fn json(&self) -> Option<&str> {
        match self {
            RequestBody::Json(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Json(s) => Bytes::from(s),
            RequestBody::Multipart { body, .. } => body,
        }
    }
}

/// Resolves the `Content-Type` for a file attachment.
///
/// The default [`ExtensionMimeResolver`] uses a fixed extension table;
/// deployments with a system MIME database can substitute their own
/// implementation.
pub trait MimeResolver: Debug + Send + Sync + 'static {
    /// Resolve the MIME type for `path`.
    ///
    /// Returning an error aborts the call before anything is dispatched.
    fn resolve(&self, path: &Path) -> Result<String>;
}

static MIME_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("zip", "application/zip"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("gif", "image/gif"),
    ])
});

/// Fixed-table MIME resolver keyed by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionMimeResolver;

impl MimeResolver for ExtensionMimeResolver {
    fn resolve(&self, path: &Path) -> Result<String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        MIME_TYPES
            .get(ext.as_str())
            .map(|v| v.to_string())
            .ok_or_else(|| Error::encoding_invalid(format!("unknown file type: {}", path.display())))
    }
}

/// Generate a fresh multipart boundary.
pub(crate) fn generate_boundary() -> String {
    format!("----{:016x}", rand::random::<u64>())
}

/// Assemble a multipart body.
///
/// `data`, when present, becomes a single `data` field holding the
/// JSON-encoded scalar parameters. Each `(field, path)` pair becomes a
/// file part whose filename is the path's basename and whose content type
/// comes from `mime`. The body ends with the closing `--<boundary>--`
/// marker.
///
/// The boundary must not occur inside field values or file contents; no
/// escaping is applied.
pub(crate) async fn multipart_body(
    ctx: &Context,
    data: Option<&str>,
    files: &[(&str, &str)],
    boundary: &str,
    mime: &dyn MimeResolver,
) -> Result<Bytes> {
    let mut body: Vec<u8> = Vec::new();

    if let Some(data) = data {
        body.extend_from_slice(format!("--{boundary}\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"data\"\n\n");
        body.extend_from_slice(data.as_bytes());
        body.push(b'\n');
    }

    for &(name, path) in files {
        let path_ref = Path::new(path);
        let filename = path_ref
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::encoding_invalid(format!("file path has no basename: {path}")))?;
        let content_type = mime.resolve(path_ref)?;
        let content = ctx.file_read(path).await?;

        body.extend_from_slice(format!("--{boundary}\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\n\n").as_bytes());
        body.extend_from_slice(&content);
        body.push(b'\n');
    }

    body.extend_from_slice(format!("--{boundary}--").as_bytes());

    Ok(Bytes::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use licsign_core::ErrorKind;
    use licsign_file_read_tokio::TokioFileRead;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn test_mime_table() {
        let resolver = ExtensionMimeResolver;
        assert_eq!(
            resolver.resolve(Path::new("my-plugin.zip")).unwrap(),
            "application/zip"
        );
        assert_eq!(
            resolver.resolve(Path::new("shot.JPG")).unwrap(),
            "image/jpeg"
        );
        assert_eq!(resolver.resolve(Path::new("icon.png")).unwrap(), "image/png");
    }

    #[test]
    fn test_mime_unknown_extension() {
        let err = ExtensionMimeResolver
            .resolve(Path::new("installer.exe"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingInvalid);

        assert!(ExtensionMimeResolver.resolve(Path::new("Makefile")).is_err());
    }

    #[test]
    fn test_boundaries_are_unique() {
        let a = generate_boundary();
        let b = generate_boundary();
        assert!(a.starts_with("----"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_multipart_layout() {
        let mut file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
        file.write_all(b"zip bytes").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let filename = file.path().file_name().unwrap().to_str().unwrap();

        let ctx = Context::new().with_file_read(TokioFileRead);
        let body = multipart_body(
            &ctx,
            Some(r#"{"add_contributor":true}"#),
            &[("file", path.as_str())],
            "----testboundary",
            &ExtensionMimeResolver,
        )
        .await
        .unwrap();

        let body = String::from_utf8(body.to_vec()).unwrap();
        let expected = format!(
            "------testboundary\n\
             Content-Disposition: form-data; name=\"data\"\n\
             \n\
             {{\"add_contributor\":true}}\n\
             ------testboundary\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\n\
             Content-Type: application/zip\n\
             \n\
             zip bytes\n\
             ------testboundary--"
        );
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn test_multipart_without_params_has_no_data_part() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"png bytes").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let ctx = Context::new().with_file_read(TokioFileRead);
        let body = multipart_body(
            &ctx,
            None,
            &[("icon", path.as_str())],
            "----b",
            &ExtensionMimeResolver,
        )
        .await
        .unwrap();

        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("name=\"data\""));
        assert!(body.contains("name=\"icon\""));
        assert!(body.ends_with("------b--"));
    }

    #[tokio::test]
    async fn test_multipart_unknown_extension_fails() {
        let ctx = Context::new().with_file_read(TokioFileRead);
        let err = multipart_body(
            &ctx,
            None,
            &[("file", "installer.exe")],
            "----b",
            &ExtensionMimeResolver,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EncodingInvalid);
    }
}
