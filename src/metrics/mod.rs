//! Speech delivery metrics
//!
//! Pure, deterministic analysis of a transcription: speaking pace,
//! filler-word usage, pause cadence and a composite clarity score, plus
//! deterministic coaching feedback text. Nothing in this module fails;
//! absent or invalid input degrades to zero-valued metrics.

mod engine;
mod feedback;
mod types;

pub use engine::{analyze, clarity_score, detect_fillers, detect_pauses, MetricsConfig};
pub use feedback::{generate_feedback, Feedback};
pub use types::{FillerWordInstance, Pause, SpeechMetrics, Transcription, WordTiming};
