//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

use std::path::Path;

/// Get MIME Content-Type based on file extension (case-insensitive)
///
/// # Examples
/// ```
/// use ota_devserver::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("json")), "application/json");
/// assert_eq!(get_content_type(Some("BIN")), "application/octet-stream");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return "application/octet-stream";
    };
    match ext.to_ascii_lowercase().as_str() {
        // Manifests and metadata
        "json" => "application/json",
        "xml" => "application/xml",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "txt" | "md" | "log" => "text/plain; charset=utf-8",
        "csv" => "text/csv",

        // Firmware images and signatures
        "bin" | "img" | "elf" | "fw" | "ota" => "application/octet-stream",
        "hex" | "ihex" => "text/plain; charset=us-ascii",
        "sig" | "p7s" => "application/pkcs7-signature",
        "pem" | "crt" => "application/x-pem-file",
        "der" => "application/x-x509-ca-cert",

        // Web (browser based flashing tools)
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",

        // Archives
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",

        // Default
        _ => "application/octet-stream",
    }
}

/// Content-Type for a filesystem path
pub fn content_type_for(path: &Path) -> &'static str {
    get_content_type(path.extension().and_then(|e| e.to_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("json")), "application/json");
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("bin")), "application/octet-stream");
        assert_eq!(get_content_type(Some("sig")), "application/pkcs7-signature");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }

    #[test]
    fn test_path_lookup() {
        assert_eq!(content_type_for(Path::new("ota/manifest.JSON")), "application/json");
        assert_eq!(content_type_for(Path::new("apps/app1")), "application/octet-stream");
    }
}
