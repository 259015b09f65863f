//! Tokio-based file reading implementation for licsign.
//!
//! This crate provides [`TokioFileRead`], an async file reader that
//! implements the `FileRead` trait from `licsign_core` using Tokio's file
//! system operations. The multipart body encoder uses it to read upload
//! attachments; credential providers may use it to load keys from disk.
//!
//! ## Example
//!
//! ```no_run
//! use licsign_core::{Context, OsEnv};
//! use licsign_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead::default())
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("/path/to/my-plugin.zip").await {
//!         Ok(content) => println!("Read {} bytes", content.len()),
//!         Err(e) => eprintln!("Failed to read file: {}", e),
//!     }
//! }
//! ```

use async_trait::async_trait;
use licsign_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected("failed to read file").with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_existing_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"package bytes").unwrap();

        let content = TokioFileRead
            .file_read(f.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(content, b"package bytes");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let res = TokioFileRead.file_read("/definitely/not/here.zip").await;
        assert!(res.is_err());
    }
}
