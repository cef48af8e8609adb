//! Upload sink handling for `/sendfile` transfers.
//!
//! Client-supplied filenames touch the filesystem, so they are reduced to a
//! single plain file name before any path is built: no separators, no
//! leading dot, no control characters.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Maximum accepted filename length.
const MAX_FILENAME_LEN: usize = 128;

/// Validate a client-supplied filename. Returns `None` for anything that
/// could name a path outside the upload directory.
pub fn sanitize_filename(name: &str) -> Option<&str> {
    if name.is_empty() || name.len() > MAX_FILENAME_LEN {
        return None;
    }
    if name.starts_with('.') {
        return None;
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return None;
    }
    Some(name)
}

/// An upload in progress: an open file plus transfer accounting.
pub struct UploadSink {
    file: fs::File,
    path: PathBuf,
    received: u64,
    expected: u64,
}

impl UploadSink {
    /// Open the destination file under `dir`. The directory is created on
    /// demand; `name` must already be sanitized.
    pub async fn create(dir: &Path, name: &str, expected: u64) -> std::io::Result<Self> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(name);
        let file = fs::File::create(&path).await?;
        Ok(Self {
            file,
            path,
            received: 0,
            expected,
        })
    }

    /// Bytes still owed by the client.
    pub fn remaining(&self) -> u64 {
        self.expected - self.received
    }

    pub async fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.file.write_all(chunk).await?;
        self.received += chunk.len() as u64;
        Ok(())
    }

    /// Flush the completed transfer to disk.
    pub async fn finish(mut self) -> std::io::Result<()> {
        self.file.flush().await
    }

    /// Abandon the transfer and remove the partial file.
    pub async fn discard(self) {
        drop(self.file);
        let _ = fs::remove_file(&self.path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_plain_names() {
        assert_eq!(sanitize_filename("report.txt"), Some("report.txt"));
        assert_eq!(sanitize_filename("data-2024_v2.bin"), Some("data-2024_v2.bin"));
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("../etc/passwd"), None);
        assert_eq!(sanitize_filename("a/b.txt"), None);
        assert_eq!(sanitize_filename("a\\b.txt"), None);
    }

    #[test]
    fn test_sanitize_rejects_oddities() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".hidden"), None);
        assert_eq!(sanitize_filename("a\nb"), None);
        assert_eq!(sanitize_filename(&"x".repeat(129)), None);
    }

    #[tokio::test]
    async fn test_sink_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = UploadSink::create(dir.path(), "out.bin", 5).await.unwrap();
        assert_eq!(sink.remaining(), 5);

        sink.write(b"he").await.unwrap();
        sink.write(b"llo").await.unwrap();
        assert_eq!(sink.remaining(), 0);
        sink.finish().await.unwrap();

        let stored = std::fs::read(dir.path().join("out.bin")).unwrap();
        assert_eq!(stored, b"hello");
    }

    #[tokio::test]
    async fn test_sink_discard_removes_partial() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = UploadSink::create(dir.path(), "partial.bin", 10).await.unwrap();
        sink.write(b"abc").await.unwrap();
        sink.discard().await;

        assert!(!dir.path().join("partial.bin").exists());
    }
}
