// ─── Events ───
// Background tasks never touch presentation state. They post events through
// an `EventSink`; whoever owns the receiving end (the CLI, a GUI shell)
// applies them on its own context.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::core::acquisition::Stage;
use crate::core::catalog::VersionCatalog;
use crate::core::downloader::TransferProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One timestamped line of the user-visible log.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Byte progress of the current stage of an acquisition job.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub version_id: String,
    pub stage: Stage,
    pub progress: TransferProgress,
}

#[derive(Debug, Clone)]
pub enum LauncherEvent {
    Log(LogLine),
    Progress(ProgressEvent),
    Stage { version_id: String, stage: Stage },
    CatalogUpdated(Arc<VersionCatalog>),
}

/// Create a connected sink/receiver pair.
pub fn channel() -> (EventSink, mpsc::UnboundedReceiver<LauncherEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink { tx }, rx)
}

/// Cloneable posting handle. Posting never blocks and never fails: once the
/// receiver is gone events are dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<LauncherEvent>,
}

impl EventSink {
    /// A sink whose events go nowhere.
    pub fn detached() -> Self {
        channel().0
    }

    pub fn post(&self, event: LauncherEvent) {
        let _ = self.tx.send(event);
    }

    /// Append a line to the user-visible log and mirror it to tracing.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => info!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        }
        self.post(LauncherEvent::Log(LogLine {
            at: Local::now(),
            level,
            message,
        }));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }
}

/// Everything currently queued on `rx`, without waiting.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<LauncherEvent>) -> Vec<LauncherEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Messages of the log lines among `events`.
pub fn log_messages(events: &[LauncherEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            LauncherEvent::Log(line) => Some(line.message.as_str()),
            _ => None,
        })
        .collect()
}
