//! OTA manifest document
//!
//! The server never validates manifests; these types exist so the example
//! manifest is written through serde and consumers can parse what is served.

use serde::{Deserialize, Serialize};

/// Top-level manifest: the apps a device may install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub apps: Vec<AppEntry>,
}

/// One downloadable app or firmware image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl Manifest {
    /// Two sample entries pointing at `apps/app1.bin` and `apps/app2.bin`
    pub fn example(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            apps: vec![
                AppEntry {
                    name: "Example App 1".to_string(),
                    version: "1.0.0".to_string(),
                    url: format!("{base}/apps/app1.bin"),
                },
                AppEntry {
                    name: "Example App 2".to_string(),
                    version: "2.0.0".to_string(),
                    url: format!("{base}/apps/app2.bin"),
                },
            ],
        }
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}
