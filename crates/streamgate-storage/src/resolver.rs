//! Confines caller-supplied file references to a base directory.
//!
//! Containment is judged on canonical paths only: the joined path is collapsed,
//! canonicalized (symlinks resolved) and must then sit at or below the
//! canonical base. Any failure along the way is a refusal.

use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    #[error("base directory {path} is unavailable")]
    BaseUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("requested path could not be resolved")]
    Unresolvable(#[source] io::Error),

    #[error("requested path escapes the base directory")]
    Escapes,
}

/// Lexically remove `.` and `..` components. `..` never climbs above the root.
fn collapse(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `segment` beneath `base`.
///
/// Returns the canonical absolute path on success. The result is either the
/// canonical base itself or a component-wise descendant of it, so a sibling
/// such as `record-secret` never passes for `record`.
pub fn resolve_path(base: &Path, segment: &str) -> Result<PathBuf, TraversalError> {
    let canonical_base = base
        .canonicalize()
        .map_err(|source| TraversalError::BaseUnavailable {
            path: base.to_path_buf(),
            source,
        })?;

    let joined = collapse(&canonical_base.join(segment));
    let canonical = joined
        .canonicalize()
        .map_err(TraversalError::Unresolvable)?;

    if !canonical.starts_with(&canonical_base) {
        tracing::warn!(segment = %segment, "Path escapes base directory");
        return Err(TraversalError::Escapes);
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let record = dir.path().join("record/valid-uuid");
        fs::create_dir_all(&record).unwrap();
        fs::write(record.join("valid-uuid.ts"), b"segment").unwrap();

        let secret = dir.path().join("secret/data");
        fs::create_dir_all(&secret).unwrap();
        fs::write(secret.join("secret.ts"), b"secret").unwrap();

        let prefixed = dir.path().join("record-secret");
        fs::create_dir_all(&prefixed).unwrap();
        fs::write(prefixed.join("leak.ts"), b"leak").unwrap();
        dir
    }

    #[test]
    fn test_resolves_contained_file() {
        let dir = fixture();
        let base = dir.path().join("record");
        let resolved = resolve_path(&base, "valid-uuid/valid-uuid.ts").unwrap();
        assert!(resolved.starts_with(base.canonicalize().unwrap()));
        assert_eq!(fs::read(resolved).unwrap(), b"segment");
    }

    #[test]
    fn test_dot_segments_inside_base_are_fine() {
        let dir = fixture();
        let base = dir.path().join("record");
        assert!(resolve_path(&base, "./valid-uuid/../valid-uuid/valid-uuid.ts").is_ok());
    }

    #[test]
    fn test_rejects_sibling_directory() {
        let dir = fixture();
        let base = dir.path().join("record");
        let err = resolve_path(&base, "../secret/data/secret.ts").unwrap_err();
        assert!(matches!(err, TraversalError::Escapes));
    }

    #[test]
    fn test_rejects_prefix_named_sibling() {
        let dir = fixture();
        let base = dir.path().join("record");
        let err = resolve_path(&base, "../record-secret/leak.ts").unwrap_err();
        assert!(matches!(err, TraversalError::Escapes));
    }

    #[test]
    fn test_rejects_absolute_segment() {
        let dir = fixture();
        let base = dir.path().join("record");
        let outside = dir.path().join("secret/data/secret.ts");
        let err = resolve_path(&base, outside.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, TraversalError::Escapes));
    }

    #[test]
    fn test_missing_file_fails_closed() {
        let dir = fixture();
        let base = dir.path().join("record");
        let err = resolve_path(&base, "valid-uuid/missing.ts").unwrap_err();
        assert!(matches!(err, TraversalError::Unresolvable(_)));
    }

    #[test]
    fn test_missing_base_fails_closed() {
        let dir = fixture();
        let err = resolve_path(&dir.path().join("nope"), "a.ts").unwrap_err();
        assert!(matches!(err, TraversalError::BaseUnavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_escape() {
        let dir = fixture();
        let base = dir.path().join("record");
        std::os::unix::fs::symlink(
            dir.path().join("secret/data/secret.ts"),
            base.join("valid-uuid/link.ts"),
        )
        .unwrap();
        let err = resolve_path(&base, "valid-uuid/link.ts").unwrap_err();
        assert!(matches!(err, TraversalError::Escapes));
    }

    #[test]
    fn test_collapse() {
        assert_eq!(collapse(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(collapse(Path::new("/a/../../b")), PathBuf::from("/b"));
    }
}
