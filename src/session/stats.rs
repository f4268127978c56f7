use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a practice session's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier.
    pub session_id: String,

    /// Whether recording is currently active.
    pub is_recording: bool,

    /// When the session was created.
    pub started_at: DateTime<Utc>,

    /// Wall-clock age of the session in seconds.
    pub duration_secs: f64,

    /// Length of the finished clip, once one exists.
    pub clip_seconds: Option<f64>,

    /// Whether a transcription has been attached and analyzed.
    pub has_metrics: bool,
}
