//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to
//! static file serving, CORS headers and the access log line.

use crate::config::Config;
use crate::handler::static_files::{self, ServeOptions};
use crate::handler::RequestHandler;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry, LogSink};
use hyper::header::{CONTENT_LENGTH, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, StatusCode, Version};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URI path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub has_if_none_match: bool,
}

/// Responder behaviour that is not tied to the root directory
#[derive(Debug, Clone)]
pub struct ResponderOptions {
    pub index_files: Vec<String>,
    pub directory_listing: bool,
    pub access_log: bool,
    pub access_log_format: String,
}

impl Default for ResponderOptions {
    fn default() -> Self {
        Self {
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            directory_listing: true,
            access_log: true,
            access_log_format: "ota".to_string(),
        }
    }
}

impl From<&Config> for ResponderOptions {
    fn from(config: &Config) -> Self {
        Self {
            index_files: config.files.index_files.clone(),
            directory_listing: config.files.directory_listing,
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        }
    }
}

/// Serves a single root directory read-only
///
/// Every response carries the CORS header set and produces one access log
/// line on the injected sink. No state is kept between requests.
pub struct StaticResponder {
    root: PathBuf,
    options: ResponderOptions,
    log: Arc<dyn LogSink>,
}

impl StaticResponder {
    /// Create a responder for `root`, which must already exist as a directory
    pub fn new(root: &Path, options: ResponderOptions, log: Arc<dyn LogSink>) -> io::Result<Self> {
        let root = root.canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root, options, log })
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Produce the response for one request; never fails
    pub async fn respond<B>(&self, req: Request<B>, peer: SocketAddr) -> Response<ResponseBody> {
        let started = Instant::now();
        let (parts, _) = req.into_parts();
        let method = parts.method;
        let is_head = method == Method::HEAD;

        let ctx = RequestContext {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head,
            if_modified_since: header_string(&parts.headers, IF_MODIFIED_SINCE),
            has_if_none_match: parts.headers.contains_key(IF_NONE_MATCH),
        };

        let mut response = match method {
            Method::GET | Method::HEAD => {
                let opts = ServeOptions {
                    root: &self.root,
                    index_files: &self.options.index_files,
                    directory_listing: self.options.directory_listing,
                    log: self.log.as_ref(),
                };
                static_files::serve(&ctx, &opts).await
            }
            Method::OPTIONS => http::build_options_response(),
            _ => http::build_405_response(),
        };

        if is_head {
            response = http::response::strip_body(response);
        }
        http::apply_cors_headers(&mut response);

        if self.options.access_log {
            let mut entry = AccessLogEntry::new(peer.ip().to_string(), method.to_string(), ctx.path.to_string());
            entry.query = ctx.query.map(ToString::to_string);
            entry.http_version = version_label(parts.version).to_string();
            entry.status = response.status().as_u16();
            entry.body_bytes = sent_body_bytes(&response, is_head);
            entry.referer = header_string(&parts.headers, REFERER);
            entry.user_agent = header_string(&parts.headers, USER_AGENT);
            entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            logger::log_access(self.log.as_ref(), &entry, &self.options.access_log_format);
        }

        response
    }
}

impl RequestHandler for StaticResponder {
    fn handle<B: Send>(
        &self,
        req: Request<B>,
        peer: SocketAddr,
    ) -> impl Future<Output = Response<ResponseBody>> + Send {
        self.respond(req, peer)
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Body size as it goes on the wire, `None` when nothing is sent
fn sent_body_bytes(response: &Response<ResponseBody>, is_head: bool) -> Option<u64> {
    if is_head
        || response.status() == StatusCode::NO_CONTENT
        || response.status() == StatusCode::NOT_MODIFIED
    {
        return None;
    }
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::CORS_HEADERS;
    use crate::logger::MemorySink;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_TYPE, LAST_MODIFIED, LOCATION};
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "apps": [
    { "name": "Example App 1", "version": "1.0.0", "url": "http://localhost:8080/apps/app1.bin" },
    { "name": "Example App 2", "version": "2.0.0", "url": "http://localhost:8080/apps/app2.bin" }
  ]
}
"#;

    struct Fixture {
        _dir: TempDir,
        sink: Arc<MemorySink>,
        responder: StaticResponder,
    }

    fn fixture_with(options: ResponderOptions) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("apps")).unwrap();
        std::fs::write(dir.path().join("manifest.json"), MANIFEST).unwrap();
        std::fs::write(dir.path().join("apps/app1.bin"), [0u8, 1, 2, 255, 254, 7]).unwrap();
        let sink = Arc::new(MemorySink::new());
        let responder = StaticResponder::new(dir.path(), options, sink.clone()).unwrap();
        Fixture {
            _dir: dir,
            sink,
            responder,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(ResponderOptions::default())
    }

    fn peer() -> SocketAddr {
        "192.168.4.2:50123".parse().unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    async fn get(fx: &Fixture, uri: &str) -> Response<ResponseBody> {
        fx.responder.respond(request(Method::GET, uri), peer()).await
    }

    async fn body_bytes(response: Response<ResponseBody>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    fn assert_cors(response: &Response<ResponseBody>) {
        for (name, value) in CORS_HEADERS {
            assert_eq!(response.headers()[name], value, "header {name}");
        }
    }

    #[tokio::test]
    async fn test_manifest_served_as_json() {
        let fx = fixture();
        let response = get(&fx, "/manifest.json").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[CONTENT_LENGTH], MANIFEST.len().to_string().as_str());
        assert!(response.headers().contains_key(LAST_MODIFIED));
        assert_cors(&response);

        let value: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(value["apps"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_binary_identical_bytes() {
        let fx = fixture();
        let response = get(&fx, "/apps/app1.bin").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(body_bytes(response).await, vec![0u8, 1, 2, 255, 254, 7]);
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let fx = fixture();
        let response = get(&fx, "/apps/missing.bin").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_cors(&response);
        assert_eq!(body_bytes(response).await, b"404 Not Found");
    }

    #[tokio::test]
    async fn test_traversal_is_403_without_content() {
        let fx = fixture();
        for uri in ["/../etc/passwd", "/apps/../../etc/passwd", "/%2e%2e/%2e%2e/etc/passwd"] {
            let response = get(&fx, uri).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
            assert_cors(&response);
            assert_eq!(body_bytes(response).await, b"403 Forbidden");
        }
        assert_eq!(fx.sink.error_lines().len(), 3);
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let fx = fixture();
        let response = fx
            .responder
            .respond(request(Method::HEAD, "/apps/app1.bin"), peer())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "6");
        assert_cors(&response);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let fx = fixture();
        let response = fx
            .responder
            .respond(request(Method::OPTIONS, "/manifest.json"), peer())
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let fx = fixture();
        let response = fx
            .responder
            .respond(request(Method::POST, "/manifest.json"), peer())
            .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_directory_redirects_to_slash() {
        let fx = fixture();
        let response = get(&fx, "/apps?x=1").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/apps/?x=1");
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_redirect_location_has_single_leading_slash() {
        let fx = fixture();
        for uri in ["//apps", "///apps", "//./apps"] {
            let response = get(&fx, uri).await;
            assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY, "{uri}");
            assert_eq!(response.headers()[LOCATION], "/apps/", "{uri}");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_file_typed_by_requested_name() {
        let fx = fixture();
        let root = fx.responder.root();
        std::fs::write(root.join("manifest-v3"), MANIFEST).unwrap();
        std::fs::remove_file(root.join("manifest.json")).unwrap();
        std::os::unix::fs::symlink(root.join("manifest-v3"), root.join("manifest.json")).unwrap();

        let response = get(&fx, "/manifest.json").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_bytes(response).await, MANIFEST.as_bytes());
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let fx = fixture();
        let response = get(&fx, "/apps/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<a href=\"app1.bin\">app1.bin</a>"));
    }

    #[tokio::test]
    async fn test_index_file_preferred() {
        let fx = fixture();
        std::fs::write(fx.responder.root().join("index.html"), "<h1>ota</h1>").unwrap();
        let response = get(&fx, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<h1>ota</h1>");
    }

    #[tokio::test]
    async fn test_listing_disabled_is_404() {
        let fx = fixture_with(ResponderOptions {
            directory_listing: false,
            ..ResponderOptions::default()
        });
        assert_eq!(get(&fx, "/apps/").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_if_modified_since_yields_304() {
        let fx = fixture();
        let first = get(&fx, "/manifest.json").await;
        let stamp = first.headers()[LAST_MODIFIED].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/manifest.json")
            .header(IF_MODIFIED_SINCE, stamp)
            .body(())
            .unwrap();
        let response = fx.responder.respond(req, peer()).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_cors(&response);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_access_line_per_request() {
        let fx = fixture();
        get(&fx, "/manifest.json").await;
        get(&fx, "/apps/missing.bin").await;

        let lines = fx.sink.access_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[OTA Server] 192.168.4.2 - ["));
        assert!(lines[0].contains("\"GET /manifest.json HTTP/1.1\" 200"));
        assert!(lines[1].contains("\"GET /apps/missing.bin HTTP/1.1\" 404 13"));
    }

    #[tokio::test]
    async fn test_access_log_can_be_disabled() {
        let fx = fixture_with(ResponderOptions {
            access_log: false,
            ..ResponderOptions::default()
        });
        get(&fx, "/manifest.json").await;
        assert!(fx.sink.access_lines().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_500() {
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture();
        let locked = fx.responder.root().join("apps/locked.bin");
        std::fs::write(&locked, b"secret").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        // Root ignores permission bits, nothing to assert there
        if std::fs::read(&locked).is_ok() {
            return;
        }

        let response = get(&fx, "/apps/locked.bin").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        assert_eq!(fx.sink.error_lines().len(), 1);
    }

    #[test]
    fn test_missing_root_fails_loudly() {
        let sink = Arc::new(MemorySink::new());
        let result = StaticResponder::new(
            Path::new("/definitely/not/here"),
            ResponderOptions::default(),
            sink,
        );
        assert!(result.is_err());
    }
}
