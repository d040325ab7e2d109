//! HTTP response building module
//!
//! Provides builders for the status codes the file server emits and the
//! permissive CORS header set attached to every response.

use futures_util::TryStreamExt;
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, LOCATION,
};
use hyper::{Response, StatusCode};
use tokio_util::io::ReaderStream;

/// Body type for every response: either buffered bytes or a file stream
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Fixed CORS headers sent with every response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, OPTIONS"),
    ("access-control-allow-headers", "Content-Type"),
];

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Buffered body
pub fn full<T: Into<Bytes>>(chunk: T) -> ResponseBody {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty body
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body streamed from an open file in chunks
///
/// A read error mid-stream aborts the connection instead of truncating silently.
pub fn file_body(file: tokio::fs::File) -> ResponseBody {
    let frames = ReaderStream::new(file).map_ok(Frame::data);
    StreamBody::new(frames).boxed_unsync()
}

/// Append the CORS header set, replacing any existing values
pub fn apply_cors_headers(response: &mut Response<ResponseBody>) {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(CORS_HEADERS[0].1));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(CORS_HEADERS[1].1));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(CORS_HEADERS[2].1));
}

/// Build a plain-text response whose body is the status line, e.g. `404 Not Found`
pub fn build_status_response(status: StatusCode) -> Response<ResponseBody> {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    build_text_response(status, text)
}

fn build_text_response(status: StatusCode, text: String) -> Response<ResponseBody> {
    let len = text.len();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, len)
        .body(full(text))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<ResponseBody> {
    build_status_response(StatusCode::FORBIDDEN)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_status_response(StatusCode::NOT_FOUND)
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_status_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response = build_status_response(StatusCode::METHOD_NOT_ALLOWED);
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(empty())
        .unwrap_or_else(|e| fallback(StatusCode::NO_CONTENT, &e))
}

/// Build 301 redirect response
pub fn build_redirect_response(target: &str) -> Response<ResponseBody> {
    let text = format!("Moved to {target}");
    let len = text.len();
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, len)
        .body(full(text))
        .unwrap_or_else(|e| fallback(StatusCode::MOVED_PERMANENTLY, &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(LAST_MODIFIED, last_modified)
        .body(empty())
        .unwrap_or_else(|e| fallback(StatusCode::NOT_MODIFIED, &e))
}

/// Build generic HTML response
pub fn build_html_response(content: String) -> Response<ResponseBody> {
    let len = content.len();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, len)
        .body(full(content))
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Build 200 response for a file; the body is streamed, its length known up front
pub fn build_file_response(
    body: ResponseBody,
    content_type: &str,
    content_length: u64,
    last_modified: Option<&str>,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length);
    if let Some(date) = last_modified {
        builder = builder.header(LAST_MODIFIED, date);
    }
    builder
        .body(body)
        .unwrap_or_else(|e| fallback(StatusCode::INTERNAL_SERVER_ERROR, &e))
}

/// Drop the body while keeping status and headers (HEAD responses)
pub fn strip_body(response: Response<ResponseBody>) -> Response<ResponseBody> {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, empty())
}

/// Response used when a builder rejects its input; logs and keeps the status
fn fallback(status: StatusCode, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(empty());
    *response.status_mut() = status;
    response
}
