//! Progress and log reporting for front ends
//!
//! Core operations never talk to a UI directly. They report through a
//! `ProgressSink` and a `LogSink`, both invoked from the worker. A front end
//! that must handle updates on its own execution context uses `ChannelSink`
//! and drains the receiver there.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Receives progress fractions in [0, 1]
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, fraction: f64);
}

/// Receives one human-readable lifecycle line per call
pub trait LogSink: Send + Sync {
    fn on_log(&self, message: &str);
}

/// One update delivered to a front end
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    Progress { fraction: f64 },
    Log { message: String },
}

/// Forwards every update over an unbounded channel, preserving order
#[derive(Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<BatchEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the front end drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BatchEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, fraction: f64) {
        // A closed receiver means the front end stopped listening
        let _ = self.sender.send(BatchEvent::Progress { fraction });
    }
}

impl LogSink for ChannelSink {
    fn on_log(&self, message: &str) {
        let _ = self.sender.send(BatchEvent::Log {
            message: message.to_string(),
        });
    }
}

/// Records every update in memory
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<BatchEvent>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BatchEvent::Log { message } => Some(message),
                BatchEvent::Progress { .. } => None,
            })
            .collect()
    }

    pub fn progress_values(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BatchEvent::Progress { fraction } => Some(fraction),
                BatchEvent::Log { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: BatchEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressSink for MemorySink {
    fn on_progress(&self, fraction: f64) {
        self.push(BatchEvent::Progress { fraction });
    }
}

impl LogSink for MemorySink {
    fn on_log(&self, message: &str) {
        self.push(BatchEvent::Log {
            message: message.to_string(),
        });
    }
}

/// Discards everything
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    fn on_progress(&self, _fraction: f64) {}
}

impl LogSink for NoOpSink {
    fn on_log(&self, _message: &str) {}
}

/// Handle passed into every core operation.
///
/// Clamps progress to [0, 1], keeps it from moving backwards within one
/// unit of work, flattens log lines to a single line and mirrors them to
/// `tracing`.
#[derive(Clone)]
pub struct Reporter {
    progress: Arc<dyn ProgressSink>,
    log: Arc<dyn LogSink>,
    floor: Arc<Mutex<f64>>,
}

impl Reporter {
    pub fn new(progress: Arc<dyn ProgressSink>, log: Arc<dyn LogSink>) -> Self {
        Self {
            progress,
            log,
            floor: Arc::new(Mutex::new(0.0)),
        }
    }

    /// Use one value as both progress and log sink
    pub fn from_sink<S>(sink: Arc<S>) -> Self
    where
        S: ProgressSink + LogSink + 'static,
    {
        Self::new(sink.clone(), sink)
    }

    /// Reporter that drops every update
    pub fn silent() -> Self {
        Self::from_sink(Arc::new(NoOpSink))
    }

    /// Start a new unit of work; progress restarts from zero
    pub fn begin_unit(&self) {
        if let Ok(mut floor) = self.floor.lock() {
            *floor = 0.0;
        }
    }

    /// Report a fraction of the current unit of work
    pub fn progress(&self, fraction: f64) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        if let Ok(mut floor) = self.floor.lock() {
            if fraction < *floor {
                return;
            }
            *floor = fraction;
        }
        self.progress.on_progress(fraction);
    }

    /// Report a lifecycle line
    pub fn log(&self, message: impl AsRef<str>) {
        let line = single_line(message.as_ref());
        info!(target: "splitx::log", "{}", line);
        self.log.on_log(&line);
    }

    /// Report a warning line
    pub fn warn(&self, message: impl AsRef<str>) {
        let line = single_line(message.as_ref());
        warn!(target: "splitx::log", "{}", line);
        self.log.on_log(&line);
    }
}

fn single_line(message: &str) -> String {
    if !message.contains(['\n', '\r']) {
        return message.to_string();
    }
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}
