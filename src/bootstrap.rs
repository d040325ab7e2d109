//! Directory bootstrap
//!
//! Creates the example layout on first run:
//!
//! ```text
//! <root>/
//!   manifest.json
//!   apps/
//! ```
//!
//! An existing root is left untouched, so running it again is a no-op.

use crate::error::BootstrapError;
use crate::manifest::Manifest;
use std::fs;
use std::path::Path;

/// Name of the manifest file inside the root
pub const MANIFEST_FILE: &str = "manifest.json";

/// Name of the binaries directory inside the root
pub const APPS_DIR: &str = "apps";

/// What `ensure_layout` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The root already existed and was not modified
    Existing,
    /// The root, `apps/` and an example manifest were created
    Created,
}

/// Make sure `root` exists, creating the example layout if it does not
///
/// `port` is used for the URLs in the example manifest.
pub fn ensure_layout(root: &Path, port: u16) -> Result<Layout, BootstrapError> {
    if root.exists() {
        return Ok(Layout::Existing);
    }

    let apps = root.join(APPS_DIR);
    fs::create_dir_all(&apps).map_err(|source| BootstrapError::CreateDir {
        path: apps.clone(),
        source,
    })?;

    let manifest_path = root.join(MANIFEST_FILE);
    let text = Manifest::example(&format!("http://localhost:{port}")).to_json_pretty()?;
    fs::write(&manifest_path, text).map_err(|source| BootstrapError::WriteFile {
        path: manifest_path,
        source,
    })?;

    Ok(Layout::Created)
}
