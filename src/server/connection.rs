// Connection handling module
// Serves one accepted TCP connection on its own task

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};

use crate::config::PerformanceConfig;
use crate::handler::RequestHandler;
use crate::logger;

/// Per-connection HTTP/1 settings
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub keep_alive: bool,
    pub header_read_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            keep_alive: true,
            header_read_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&PerformanceConfig> for ConnectionSettings {
    fn from(config: &PerformanceConfig) -> Self {
        Self {
            keep_alive: config.keep_alive,
            header_read_timeout: Duration::from_secs(config.header_read_timeout),
        }
    }
}

/// Handle a single connection in a spawned task.
///
/// A slow or vanished client only stalls its own task. A client that
/// disconnects mid-download ends the task; other connections are unaffected.
pub fn spawn_connection<H: RequestHandler>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    handler: Arc<H>,
    settings: &ConnectionSettings,
) {
    let settings = settings.clone();
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(settings.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(settings.header_read_timeout);

        let service = service_fn(move |req| {
            let handler = Arc::clone(&handler);
            async move { Ok::<_, Infallible>(handler.handle(req, peer_addr).await) }
        });

        if let Err(err) = builder.serve_connection(io, service).await {
            // Clients closing idle keep-alive connections are routine
            if !err.is_incomplete_message() {
                logger::log_connection_error(&format!("{peer_addr}: {err}"));
            }
        }
    });
}
