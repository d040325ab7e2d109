//! Log writer module
//!
//! Provides thread-safe, line-atomic log writing to files or stdout/stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Global log writer instance, used by the startup helpers
static LOG_WRITER: OnceLock<std::sync::Arc<LogWriter>> = OnceLock::new();

/// Destination for access and error lines
///
/// Implementations must write each line as a unit: concurrent callers may
/// never interleave within a line.
pub trait LogSink: Send + Sync {
    /// Write one access log line
    fn write_access(&self, line: &str);

    /// Write one error or warning line
    fn write_error(&self, line: &str);
}

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(File),
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access log target
    access: Mutex<LogTarget>,
    /// Error log target
    error: Mutex<LogTarget>,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    pub fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stdout,
        };

        let error = match error_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stderr,
        };

        Ok(Self {
            access: Mutex::new(access),
            error: Mutex::new(error),
        })
    }
}

impl LogSink for LogWriter {
    fn write_access(&self, line: &str) {
        let mut target = lock(&self.access);
        write_to_target(&mut target, line);
    }

    fn write_error(&self, line: &str) {
        let mut target = lock(&self.error);
        write_to_target(&mut target, line);
    }
}

/// A poisoned lock only means another writer panicked mid-line
fn lock(target: &Mutex<LogTarget>) -> MutexGuard<'_, LogTarget> {
    target.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Write message to log target
fn write_to_target(target: &mut LogTarget, message: &str) {
    // Single write call per line so the line reaches the target in one piece
    let line = format!("{message}\n");
    let _ = match target {
        LogTarget::Stdout => io::stdout().lock().write_all(line.as_bytes()),
        LogTarget::Stderr => io::stderr().lock().write_all(line.as_bytes()),
        LogTarget::File(file) => file.write_all(line.as_bytes()),
    };
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if already initialized.
pub fn init(writer: std::sync::Arc<LogWriter>) -> io::Result<()> {
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if `init()` has been called
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get().map(std::sync::Arc::as_ref)
}

/// In-memory sink capturing lines, for tests and embedding
#[derive(Default)]
pub struct MemorySink {
    access: Mutex<Vec<String>>,
    error: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access lines captured so far
    pub fn access_lines(&self) -> Vec<String> {
        self.access
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Error lines captured so far
    pub fn error_lines(&self) -> Vec<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemorySink {
    fn write_access(&self, line: &str) {
        self.access
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }

    fn write_error(&self, line: &str) {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_file_targets_append_lines() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("logs/access.log");
        let error = dir.path().join("logs/error.log");
        let writer = LogWriter::new(access.to_str(), error.to_str()).unwrap();

        writer.write_access("first");
        writer.write_access("second");
        writer.write_error("broken");

        let access_text = std::fs::read_to_string(&access).unwrap();
        assert_eq!(access_text, "first\nsecond\n");
        assert_eq!(std::fs::read_to_string(&error).unwrap(), "broken\n");
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("access.log");
        let writer = Arc::new(LogWriter::new(access.to_str(), None).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let writer = Arc::clone(&writer);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        writer.write_access(&format!("thread-{t} line-{i} {}", "x".repeat(64)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let text = std::fs::read_to_string(&access).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert!(line.starts_with("thread-"), "torn line: {line}");
            assert!(line.ends_with(&"x".repeat(64)), "torn line: {line}");
        }
    }

    #[test]
    fn test_memory_sink_captures() {
        let sink = MemorySink::new();
        sink.write_access("a");
        sink.write_error("b");
        assert_eq!(sink.access_lines(), vec!["a"]);
        assert_eq!(sink.error_lines(), vec!["b"]);
    }
}
