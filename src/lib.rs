//! Development HTTP file server for OTA updates
//!
//! Serves a root directory holding `manifest.json` and `apps/` read-only,
//! with permissive CORS headers and one access log line per request.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod manifest;
pub mod netinfo;
pub mod server;
