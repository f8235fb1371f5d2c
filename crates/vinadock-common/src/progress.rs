//! Progress reporting for long-running jobs.
//!
//! Reporters are fire-and-forget sinks: the caller never inspects a return
//! value, and a reporter must not fail the job it is observing.

use std::sync::Mutex;
use tracing::info;

/// Sink for `(stage, percent, message)` progress events.
pub trait ProgressReporter: Send + Sync {
    /// Record that `stage` has reached `percent` (0..=100).
    fn log_progress(&self, stage: &str, percent: u8, message: &str);
}

/// Emits every event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn log_progress(&self, stage: &str, percent: u8, message: &str) {
        info!(stage, percent = percent.min(100), "{}", message);
    }
}

// ── Recording Implementation for Testing ─────────────────────────────────────

/// One recorded progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: String,
    pub percent: u8,
    pub message: String,
}

/// Keeps every event in memory so tests can assert on the sequence.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Just the percentages, in emission order.
    pub fn percents(&self) -> Vec<u8> {
        self.events().into_iter().map(|e| e.percent).collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn log_progress(&self, stage: &str, percent: u8, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(ProgressEvent {
                stage: stage.to_string(),
                percent,
                message: message.to_string(),
            });
        }
    }
}
