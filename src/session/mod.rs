//! Practice session management
//!
//! This module provides the `PracticeSession` abstraction that manages:
//! - Audio capture through the recording controller
//! - Transcription intake and metrics analysis
//! - The finished clip and its WAV/level encodings
//! - Review playback position for the word-timing overlay

mod config;
mod playback;
mod session;
mod stats;

pub use config::SessionConfig;
pub use playback::PlaybackCursor;
pub use session::PracticeSession;
pub use stats::SessionStats;
