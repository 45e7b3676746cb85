use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::resolver::{resolve_path, TraversalError};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error("file type '{0}' is not served from this directory")]
    ExtensionNotAllowed(String),

    #[error("not a regular file")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AssetResult<T> = Result<T, AssetError>;

/// A file read from an [`AssetRoot`].
#[derive(Debug, Clone)]
pub struct Asset {
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// A served directory: a base path plus the extensions it may serve.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    base: PathBuf,
    allowed_extensions: Vec<String>,
}

impl AssetRoot {
    /// Create a new AssetRoot
    ///
    /// # Arguments
    /// * `base` - Directory files are confined to (e.g., "./record")
    /// * `allowed_extensions` - Lowercase extensions without the dot (e.g., `["ts", "m3u8"]`)
    pub fn new(base: impl Into<PathBuf>, allowed_extensions: &[&str]) -> Self {
        Self {
            base: base.into(),
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Canonical, contained path for `segment` with an allowed extension. The
    /// extension is taken from the canonical path, so a symlink named `*.aac`
    /// pointing at a config file is refused.
    fn checked_path(&self, segment: &str) -> AssetResult<PathBuf> {
        let path = resolve_path(&self.base, segment)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            tracing::warn!(segment = %segment, extension = %extension, "Refusing disallowed file type");
            return Err(AssetError::ExtensionNotAllowed(extension));
        }

        Ok(path)
    }

    /// Resolve `segment` to a canonical, contained, regular file with an
    /// allowed extension.
    pub fn locate(&self, segment: &str) -> AssetResult<PathBuf> {
        let path = self.checked_path(segment)?;
        if !path.is_file() {
            return Err(AssetError::NotFound);
        }
        Ok(path)
    }

    /// Read a served file. The canonical path is opened once and the
    /// regular-file check and the read both go through that handle.
    pub async fn read(&self, segment: &str) -> AssetResult<Asset> {
        let path = self.checked_path(segment)?;

        let mut file = fs::File::open(&path).await?;
        if !file.metadata().await?.is_file() {
            return Err(AssetError::NotFound);
        }
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await?;

        Ok(Asset {
            content_type: content_type_for(&path),
            bytes: Bytes::from(bytes),
        })
    }
}

/// Content type derived from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("ts") => "video/mp2t",
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("m4s") => "video/iso.segment",
        Some("mp4") => "video/mp4",
        Some("aac") => "audio/aac",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("opus") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const AUDIO: &[&str] = &["aac", "mp3"];

    fn voices() -> (tempfile::TempDir, AssetRoot) {
        let dir = tempdir().unwrap();
        let base = dir.path().join("conf");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("hello-english.aac"), b"AAC").unwrap();
        std::fs::write(base.join("nginx.conf"), b"server {}").unwrap();
        std::fs::create_dir_all(base.join("dir.aac")).unwrap();
        let root = AssetRoot::new(&base, AUDIO);
        (dir, root)
    }

    #[tokio::test]
    async fn test_reads_allowed_file() {
        let (_dir, root) = voices();
        let asset = root.read("hello-english.aac").await.unwrap();
        assert_eq!(asset.bytes.as_ref(), b"AAC");
        assert_eq!(asset.content_type, "audio/aac");
    }

    #[tokio::test]
    async fn test_refuses_contained_config_file() {
        let (_dir, root) = voices();
        let err = root.read("nginx.conf").await.unwrap_err();
        assert!(matches!(err, AssetError::ExtensionNotAllowed(ext) if ext == "conf"));
    }

    #[tokio::test]
    async fn test_refuses_directory() {
        let (_dir, root) = voices();
        assert!(matches!(root.read("dir.aac").await, Err(AssetError::NotFound)));
    }

    #[tokio::test]
    async fn test_locate_and_read_agree() {
        let (_dir, root) = voices();
        let located = root.locate("hello-english.aac").unwrap();
        assert!(located.is_absolute());
        assert!(matches!(root.locate("dir.aac"), Err(AssetError::NotFound)));
        assert!(matches!(root.read("missing.aac").await, Err(AssetError::Traversal(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_contained_symlink_served_from_target() {
        let (dir, root) = voices();
        std::os::unix::fs::symlink(
            dir.path().join("conf/hello-english.aac"),
            dir.path().join("conf/alias.aac"),
        )
        .unwrap();
        let asset = root.read("alias.aac").await.unwrap();
        assert_eq!(asset.bytes.as_ref(), b"AAC");
    }

    #[tokio::test]
    async fn test_traversal_is_reported() {
        let (dir, root) = voices();
        std::fs::write(dir.path().join("outside.aac"), b"x").unwrap();
        let err = root.read("../outside.aac").await.unwrap_err();
        assert!(matches!(err, AssetError::Traversal(TraversalError::Escapes)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_with_allowed_name_is_refused() {
        let (dir, root) = voices();
        std::os::unix::fs::symlink(
            dir.path().join("conf/nginx.conf"),
            dir.path().join("conf/sneaky.aac"),
        )
        .unwrap();
        let err = root.read("sneaky.aac").await.unwrap_err();
        assert!(matches!(err, AssetError::ExtensionNotAllowed(_)));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("a/b.TS")), "video/mp2t");
        assert_eq!(content_type_for(Path::new("index.m3u8")), "application/vnd.apple.mpegurl");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }
}
