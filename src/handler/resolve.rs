//! Path resolution module
//!
//! Maps a request path onto the served root. Two checks guard the root:
//! a lexical one on the decoded path and a canonical one after symlinks are
//! resolved. Either failing yields [`ResolveError::Forbidden`].

use crate::error::ResolveError;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

/// A request path resolved to an existing filesystem entry inside the root
#[derive(Debug)]
pub struct Resolved {
    /// Canonical path, guaranteed to start with the canonical root
    pub path: PathBuf,
    /// Path as requested under the root, before symlinks are followed
    pub requested: PathBuf,
    pub metadata: Metadata,
}

/// Decode and normalize a URI path into root-relative segments
///
/// Empty and `.` segments are dropped and `..` removes the previous segment.
/// A `..` with nothing left to remove escapes the root.
///
/// # Examples
/// ```
/// use ota_devserver::handler::resolve::normalize_path;
/// assert_eq!(normalize_path("/apps/./x/../app1.bin").unwrap(), vec!["apps", "app1.bin"]);
/// assert!(normalize_path("/../etc/passwd").is_err());
/// ```
pub fn normalize_path(raw: &str) -> Result<Vec<String>, ResolveError> {
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    // Non UTF-8 names cannot be represented portably; treat as absent
    let decoded = std::str::from_utf8(&decoded).map_err(|_| ResolveError::NotFound)?;

    let mut segments: Vec<String> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ResolveError::Forbidden);
                }
            }
            name => {
                if !is_plain_name(name) {
                    return Err(ResolveError::Forbidden);
                }
                segments.push(name.to_string());
            }
        }
    }
    Ok(segments)
}

/// A single normal path component with no separators or NUL bytes
fn is_plain_name(name: &str) -> bool {
    if name.contains(['\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Resolve normalized segments against the canonical root
pub async fn resolve(root: &Path, segments: &[String]) -> Result<Resolved, ResolveError> {
    let joined = segments
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment));
    contain(root, &joined).await
}

/// Canonicalize `candidate` and check it stays inside `root`
///
/// `root` must itself be canonical.
pub async fn contain(root: &Path, candidate: &Path) -> Result<Resolved, ResolveError> {
    let canonical = tokio::fs::canonicalize(candidate).await?;
    if !canonical.starts_with(root) {
        return Err(ResolveError::Forbidden);
    }
    let metadata = tokio::fs::metadata(&canonical).await?;
    Ok(Resolved {
        path: canonical,
        requested: candidate.to_path_buf(),
        metadata,
    })
}
