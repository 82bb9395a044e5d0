//! Decoupled logging pipeline.
//!
//! Every `log::*!` call in the process is formatted on the calling thread and
//! pushed down an unbounded crossbeam channel; a single writer thread owns
//! stderr and the optional log file. The sampling thread therefore never
//! blocks on terminal or disk I/O.
//!
//! # Architecture
//!
//! ```text
//! log::info!() ... (any thread)
//!     |
//! [LogCollector] (log::Log, non-blocking)
//!     | (crossbeam unbounded)
//!     v
//! [writer thread] ──► stderr
//!                 └─► <log file> (append, optional)
//! ```

use chrono::Local;
use crossbeam_channel::{bounded, unbounded, Sender};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Internal log line or flush marker
enum LogMessage {
    Line(LogLine),
    /// Writer acknowledges on the enclosed sender once everything before it is written
    Flush(Sender<()>),
}

/// A formatted log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: String,
    pub message: String,
}

impl LogLine {
    pub fn new(message: impl Into<String>) -> Self {
        LogLine {
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
            message: message.into(),
        }
    }

    fn render(&self) -> String {
        format!("[{}] {}\n", self.timestamp, self.message)
    }
}

/// Process-wide logger feeding a background writer thread
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    level: LevelFilter,
    log_file: Option<PathBuf>,
}

impl LogCollector {
    /// Start the writer thread. With `log_file` set, lines are also appended
    /// to that file (parent directories are created).
    pub fn new(log_file: Option<PathBuf>, level: LevelFilter) -> io::Result<Self> {
        let file = match &log_file {
            Some(path) => Some(open_log_file(path)?),
            None => None,
        };

        let (tx, rx) = unbounded::<LogMessage>();

        std::thread::Builder::new()
            .name("xops-log-writer".to_string())
            .spawn(move || {
                let mut file = file;
                let stderr = io::stderr();

                while let Ok(msg) = rx.recv() {
                    match msg {
                        LogMessage::Line(line) => {
                            let rendered = line.render();
                            let _ = stderr.lock().write_all(rendered.as_bytes());
                            if let Some(f) = file.as_mut() {
                                if f.write_all(rendered.as_bytes()).is_err() {
                                    eprintln!(
                                        "[Log] Log file write failed, continuing on stderr only"
                                    );
                                    file = None;
                                }
                            }
                        }
                        LogMessage::Flush(ack) => {
                            let _ = stderr.lock().flush();
                            if let Some(f) = file.as_mut() {
                                let _ = f.flush();
                            }
                            let _ = ack.send(());
                        }
                    }
                }
            })?;

        Ok(LogCollector { tx, level, log_file })
    }

    /// Create a collector and register it as the global `log` backend
    pub fn install(log_file: Option<PathBuf>, level: LevelFilter) -> Result<Self, String> {
        let collector =
            Self::new(log_file, level).map_err(|e| format!("Failed to start log writer: {}", e))?;

        log::set_boxed_logger(Box::new(collector.clone()))
            .map(|()| log::set_max_level(level))
            .map_err(|e| format!("Failed to register global logger: {}", e))?;

        Ok(collector)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Queue a line (never blocks)
    pub fn log_line(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    pub fn log_str(&self, message: impl Into<String>) {
        self.log_line(LogLine::new(message));
    }

    /// Block until every line queued before this call has been written
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (ack_tx, ack_rx) = bounded(1);
        self.tx
            .send(LogMessage::Flush(ack_tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        ack_rx
            .recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.log_str(format!("[{}] {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
