//! Static file serving module
//!
//! Resolves a request against the root and builds the file, directory or
//! error response. Directories without a trailing slash redirect, then the
//! first index file is served, then a listing is rendered.

use crate::error::ResolveError;
use crate::handler::listing;
use crate::handler::resolve::{self, Resolved};
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, ResponseBody};
use crate::logger::LogSink;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Settings the file serving path needs from the responder
pub struct ServeOptions<'a> {
    pub root: &'a Path,
    pub index_files: &'a [String],
    pub directory_listing: bool,
    pub log: &'a dyn LogSink,
}

/// Serve a GET or HEAD request from the root directory
pub async fn serve(ctx: &RequestContext<'_>, opts: &ServeOptions<'_>) -> Response<ResponseBody> {
    let segments = match resolve::normalize_path(ctx.path) {
        Ok(segments) => segments,
        Err(err) => return error_response(&err, ctx.path, opts.log),
    };
    let target = match resolve::resolve(opts.root, &segments).await {
        Ok(target) => target,
        Err(err) => return error_response(&err, ctx.path, opts.log),
    };

    if target.metadata.is_dir() {
        serve_directory(ctx, opts, &segments, &target).await
    } else if target.metadata.is_file() {
        serve_file(ctx, &target, opts.log).await
    } else {
        // Sockets, FIFOs and devices are never served
        http::build_404_response()
    }
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    opts: &ServeOptions<'_>,
    segments: &[String],
    dir: &Resolved,
) -> Response<ResponseBody> {
    if !ctx.path.ends_with('/') {
        let slashed = directory_location(segments);
        let location = match ctx.query {
            Some(q) => format!("{slashed}?{q}"),
            None => slashed,
        };
        return http::build_redirect_response(&location);
    }

    for index in opts.index_files {
        match resolve::contain(opts.root, &dir.path.join(index)).await {
            Ok(found) if found.metadata.is_file() => return serve_file(ctx, &found, opts.log).await,
            Ok(_) | Err(ResolveError::NotFound) => {}
            Err(err) => return error_response(&err, ctx.path, opts.log),
        }
    }

    if !opts.directory_listing {
        return http::build_404_response();
    }

    match listing::render(&dir.path, ctx.path).await {
        Ok(html) => http::build_html_response(html),
        Err(err) => error_response(&ResolveError::from(err), ctx.path, opts.log),
    }
}

/// Absolute, slash-terminated location built from normalized segments
///
/// Always starts with exactly one `/`, so it can never be read as a
/// protocol-relative URL.
fn directory_location(segments: &[String]) -> String {
    segments.iter().fold(String::from("/"), |mut location, segment| {
        location.push_str(&urlencoding::encode(segment));
        location.push('/');
        location
    })
}

async fn serve_file(
    ctx: &RequestContext<'_>,
    file: &Resolved,
    log: &dyn LogSink,
) -> Response<ResponseBody> {
    let last_modified = file.metadata.modified().ok();
    let last_modified_header = last_modified.map(cache::format_http_date);

    if let Some(modified) = last_modified {
        if cache::is_not_modified(ctx.if_modified_since.as_deref(), ctx.has_if_none_match, modified) {
            return http::build_304_response(last_modified_header.as_deref().unwrap_or_default());
        }
    }

    // HEAD never touches file contents
    let body = if ctx.is_head {
        http::response::empty()
    } else {
        match fs::File::open(&file.path).await {
            Ok(handle) => http::response::file_body(handle),
            Err(err) => return error_response(&ResolveError::from(err), ctx.path, log),
        }
    };

    http::build_file_response(
        body,
        mime::content_type_for(&file.requested),
        file.metadata.len(),
        last_modified_header.as_deref(),
    )
}

/// Convert a resolution failure into its response, logging the unexpected ones
fn error_response(err: &ResolveError, path: &str, log: &dyn LogSink) -> Response<ResponseBody> {
    match err {
        ResolveError::Forbidden => {
            log.write_error(&format!("[WARN] Path traversal attempt blocked: {path}"));
            http::build_403_response()
        }
        ResolveError::NotFound => http::build_404_response(),
        ResolveError::Io(source) => {
            log.write_error(&format!("[ERROR] Failed to read '{path}': {source}"));
            http::build_500_response()
        }
    }
}
