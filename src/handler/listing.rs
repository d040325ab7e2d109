//! Directory listing module
//!
//! Renders an HTML index for directories that have no index file.

use std::io;
use std::path::Path;

/// One entry in a rendered listing
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListingEntry {
    name: String,
    is_dir: bool,
}

/// Render the listing page for `dir`, titled with the decoded request path
pub async fn render(dir: &Path, request_path: &str) -> io::Result<String> {
    let entries = read_entries(dir).await?;
    let title = format!(
        "Directory listing for {}",
        escape_html(&urlencoding::decode(request_path).unwrap_or_else(|_| request_path.into()))
    );

    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for entry in &entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<li><a href=\"{}{suffix}\">{}{suffix}</a></li>\n",
            urlencoding::encode(&entry.name),
            escape_html(&entry.name),
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

/// Read directory entries sorted case-insensitively
async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        // Follow symlinks so linked directories list as directories
        let is_dir = match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => meta.is_dir(),
            Err(_) => entry.file_type().await.is_ok_and(|t| t.is_dir()),
        };
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    entries.sort_by_cached_key(|e| e.name.to_lowercase());
    Ok(entries)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
