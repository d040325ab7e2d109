//! Logger module
//!
//! Provides logging utilities for the OTA server including:
//! - Startup banner and bootstrap messages
//! - Access logging with multiple formats through an injectable [`LogSink`]
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::{LogSink, LogWriter, MemorySink};

use crate::config::Config;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

/// Build the process-wide writer from configuration and register it globally
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<Arc<LogWriter>> {
    let writer = Arc::new(LogWriter::new(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )?);
    writer::init(Arc::clone(&writer))?;
    Ok(writer)
}

/// Write to info log (stdout unless an access log file is configured)
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, root: &Path, network_ip: IpAddr, config: &Config) {
    let port = addr.port();
    let rule = "=".repeat(60);
    write_info(&rule);
    write_info("OTA Development Server");
    write_info(&rule);
    write_info(&format!("Serving OTA files from: {}", root.display()));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Port: {port}"));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("");
    write_info("Access URLs:");
    write_info(&format!("  Local:   http://127.0.0.1:{port}/manifest.json"));
    write_info(&format!("  Network: http://{}/manifest.json", SocketAddr::new(network_ip, port)));
    write_info("");
    write_info("Point the device firmware at:");
    write_info(&format!("  MANIFEST_URL = http://{}/manifest.json", SocketAddr::new(network_ip, port)));
    write_info("");
    write_info("Press Ctrl+C to stop");
    write_info(&rule);
    write_info("");
}

pub fn log_layout_created(root: &Path) {
    write_info(&format!("Created {} directory structure", root.display()));
    write_info("  Created example manifest.json");
    write_info(&format!(
        "  Place your app .bin files in {}/",
        root.join("apps").display()
    ));
    write_info("");
}

pub fn log_server_stopped() {
    write_info("\nServer stopped.");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry to the given sink
pub fn log_access(sink: &dyn LogSink, entry: &AccessLogEntry, format: &str) {
    sink.write_access(&entry.format(format));
}
