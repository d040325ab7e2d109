// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::{spawn_connection, ConnectionSettings};
use crate::handler::RequestHandler;
use crate::logger;

/// Pause after a failed accept (e.g. file descriptor exhaustion)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accept connections and hand each to `handler` on its own task
///
/// Returns `Ok(())` once `shutdown` resolves. In-flight connections are not
/// drained; they end with the runtime.
pub async fn run<H, F>(
    listener: TcpListener,
    handler: Arc<H>,
    settings: ConnectionSettings,
    shutdown: F,
) -> std::io::Result<()>
where
    H: RequestHandler,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        spawn_connection(stream, peer_addr, Arc::clone(&handler), &settings);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }

            () = &mut shutdown => {
                return Ok(());
            }
        }
    }
}
