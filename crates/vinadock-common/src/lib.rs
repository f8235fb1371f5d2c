//! vinadock-common — Shared types used across all vinadock crates.

pub mod card;
pub mod logging;
pub mod progress;

// Re-export commonly used types
pub use card::DataCard;
pub use progress::{ProgressEvent, ProgressReporter, RecordingProgress, TracingProgress};
