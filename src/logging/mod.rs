// Logging module - in-memory log capture and subscriber setup
//
// While the dashboard owns the terminal, nothing may write to stdout. Events
// are captured by a custom tracing layer into a bounded buffer, which the
// optional "logs" pane displays. File logging (JSON lines, rotated) can be
// enabled alongside.

use crate::config::{LogRotation, LoggingConfig};
use crate::pane::ContentHandle;
use chrono::{DateTime, Local, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Level, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// A single log entry captured from tracing
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    /// One-line rendering for the logs pane, with the crate prefix trimmed
    /// from the target
    pub fn display_line(&self) -> String {
        let target = self
            .target
            .strip_prefix("paneboard::")
            .unwrap_or(&self.target);
        format!(
            "{} {:<5} {}: {}",
            self.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            self.level.as_str(),
            target,
            self.message
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            Level::TRACE => LogLevel::Trace,
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    items: VecDeque<LogEntry>,
    /// Entries ever added; lets readers skip unchanged buffers
    total: u64,
}

/// In-memory log buffer with bounded size (ring buffer)
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<Entries>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a log entry, dropping the oldest when full
    pub fn add(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.items.len() >= MAX_LOG_ENTRIES {
            entries.items.pop_front();
        }
        entries.items.push_back(entry);
        entries.total += 1;
    }

    /// All log entries (most recent last)
    pub fn get_all(&self) -> Vec<LogEntry> {
        self.lock().items.iter().cloned().collect()
    }

    pub fn total(&self) -> u64 {
        self.lock().total
    }
}

/// Tracing layer that captures events into a [`LogBuffer`]
pub struct TuiLogLayer {
    buffer: LogBuffer,
}

impl TuiLogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut message = String::new();
        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        self.buffer.add(LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::from(metadata.level()),
            target: metadata.target().to_string(),
            message,
        });
    }

    fn enabled(&self, _metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        // Filtering happens at subscriber level
        true
    }
}

/// Visitor to extract the message from a tracing event
struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }
}

/// Install the global subscriber.
///
/// Precedence for the filter: `RUST_LOG` > configured level. Returns the file
/// writer guard, which must live until exit so buffered lines are flushed.
pub fn init(config: &LoggingConfig, buffer: &LogBuffer) -> Option<WorkerGuard> {
    let default_filter = format!("paneboard={}", config.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let file_writer = if config.file_enabled {
        match std::fs::create_dir_all(&config.file_dir) {
            Ok(()) => {
                let appender = match config.file_rotation {
                    LogRotation::Hourly => {
                        tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Daily => {
                        tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Never => {
                        tracing_appender::rolling::never(&config.file_dir, &config.file_prefix)
                    }
                };
                Some(tracing_appender::non_blocking(appender))
            }
            Err(e) => {
                // The terminal is still ours to print to at this point
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.file_dir, e
                );
                None
            }
        }
    } else {
        None
    };

    let (file_layer, guard) = match file_writer {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(TuiLogLayer::new(buffer.clone()))
        .with(file_layer)
        .init();

    guard
}

/// Copy the buffer into a pane whenever new entries arrive
pub fn spawn_log_feed(
    runtime: &Handle,
    buffer: LogBuffer,
    target: ContentHandle,
    interval: Duration,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut published = None;

        loop {
            ticker.tick().await;
            if !running.load(Ordering::SeqCst) {
                break;
            }
            let total = buffer.total();
            if published == Some(total) {
                continue;
            }
            let lines: Vec<String> = buffer.get_all().iter().map(LogEntry::display_line).collect();
            target.set(lines);
            published = Some(total);
        }
    })
}
