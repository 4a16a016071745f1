use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Maximum size per log file before rotation (~5 MB)
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// Number of rotated log files to keep
const MAX_LOG_FILES: usize = 5;
/// In-memory log buffer cap (exposed to the shell's log view)
const MAX_MEMORY_LOGS: usize = 2000;

const LOG_FILE_NAME: &str = "spinwheel.log";

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

struct LogInner {
    logs: Mutex<Vec<LogEntry>>,
    log_dir: Option<PathBuf>,
    debug_mode: AtomicBool,
}

/// Cheaply cloneable logging handle shared by the reconciler, watcher, and
/// playlist manager. Writes to a rotating file under `log_dir` and keeps a
/// bounded in-memory buffer of recent entries for the (out-of-scope) shell.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LogInner>,
}

impl Logger {
    pub fn new(log_dir: PathBuf) -> Self {
        let log_dir = match fs::create_dir_all(&log_dir) {
            Ok(()) => Some(log_dir),
            Err(e) => {
                eprintln!("[logger] failed to create log directory {:?}: {}", log_dir, e);
                None
            }
        };

        let logger = Self {
            inner: Arc::new(LogInner {
                logs: Mutex::new(Vec::new()),
                log_dir,
                debug_mode: AtomicBool::new(false),
            }),
        };

        logger.write_to_file(
            "INFO",
            &format!(
                "=== session started at {} ===",
                Local::now().format("%Y-%m-%d %H:%M:%S %Z")
            ),
        );
        logger
    }

    /// Logger with no backing file. Entries still land in the memory buffer.
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(LogInner {
                logs: Mutex::new(Vec::new()),
                log_dir: None,
                debug_mode: AtomicBool::new(false),
            }),
        }
    }

    pub fn info(&self, message: &str) {
        self.add_log("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        self.add_log("WARN", message);
    }

    pub fn error(&self, message: &str) {
        self.add_log("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        self.add_log("DEBUG", message);
    }

    /// Recent entries, oldest first.
    pub fn recent(&self) -> Vec<LogEntry> {
        self.inner
            .logs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_debug(&self) -> bool {
        self.inner.debug_mode.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) {
        self.inner.debug_mode.store(enabled, Ordering::Relaxed);
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.inner.log_dir.as_ref().map(|d| d.join(LOG_FILE_NAME))
    }

    fn add_log(&self, level: &str, message: &str) {
        if level == "DEBUG" && !self.is_debug() {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            level: level.to_string(),
            message: message.to_string(),
        };

        if let Ok(mut logs) = self.inner.logs.lock() {
            logs.push(entry);
            if logs.len() > MAX_MEMORY_LOGS {
                let drain_count = MAX_MEMORY_LOGS / 5;
                logs.drain(..drain_count);
            }
        }

        self.write_to_file(level, message);
    }

    /// Rotate log files: spinwheel.log → spinwheel.1.log → spinwheel.2.log → …
    fn rotate_if_needed(&self) {
        let Some(current) = self.log_file_path() else { return };
        let file_size = fs::metadata(&current).map(|m| m.len()).unwrap_or(0);
        if file_size < MAX_LOG_FILE_SIZE {
            return;
        }

        let Some(dir) = self.inner.log_dir.as_ref() else { return };

        for i in (1..MAX_LOG_FILES).rev() {
            let from = dir.join(format!("spinwheel.{}.log", i));
            let to = dir.join(format!("spinwheel.{}.log", i + 1));
            let _ = fs::rename(&from, &to);
        }
        let _ = fs::rename(&current, dir.join("spinwheel.1.log"));
    }

    fn write_to_file(&self, level: &str, message: &str) {
        self.rotate_if_needed();
        let Some(path) = self.log_file_path() else { return };

        let line = format!(
            "[{}] [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            message
        );

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn debug_entries_are_dropped_unless_enabled() {
        let logger = Logger::disabled();
        logger.debug("invisible");
        logger.info("visible");
        assert_eq!(logger.recent().len(), 1);

        logger.set_debug(true);
        logger.debug("now visible");
        assert_eq!(logger.recent().len(), 2);
    }

    #[test]
    fn writes_lines_to_the_log_file() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new(dir.path().join("logs"));
        logger.info("hello from the test");

        let contents = std::fs::read_to_string(logger.log_file_path().unwrap()).unwrap();
        assert!(contents.contains("hello from the test"));
        assert!(contents.contains("[INFO]"));
    }
}
