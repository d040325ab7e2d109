//! Request handler module
//!
//! Responsible for turning requests into responses. The server layer only
//! knows the [`RequestHandler`] capability; [`StaticResponder`] provides it
//! for a read-only root directory.

pub mod listing;
pub mod resolve;
pub mod router;
pub mod static_files;

use crate::http::ResponseBody;
use hyper::{Request, Response};
use std::future::Future;
use std::net::SocketAddr;

// Re-export main entry point
pub use router::{ResponderOptions, StaticResponder};

/// Anything that can answer an HTTP request
///
/// Implementations must not fail: every error becomes a response.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle<B: Send>(
        &self,
        req: Request<B>,
        peer: SocketAddr,
    ) -> impl Future<Output = Response<ResponseBody>> + Send;
}
