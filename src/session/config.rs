use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::CaptureConfig;
use crate::recording::RecorderOptions;

/// Configuration for one practice session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g. "practice-<uuid>").
    pub session_id: String,

    /// Sample rate for capture (speech transcription expects 16kHz).
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,

    /// Level under which the live snapshot reports silence.
    pub silence_threshold: f32,

    /// Hard recording limit in seconds, if any.
    pub max_duration_secs: Option<u64>,

    /// Stop automatically at the duration limit.
    pub auto_stop: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("practice-{}", uuid::Uuid::new_v4()),
            sample_rate: 16000,
            channels: 1,
            silence_threshold: 0.02,
            max_duration_secs: None,
            auto_stop: false,
        }
    }
}

impl SessionConfig {
    /// Controller options derived from this session's settings.
    pub fn recorder_options(&self) -> RecorderOptions {
        RecorderOptions {
            capture: CaptureConfig {
                sample_rate: self.sample_rate,
                channels: self.channels,
                ..CaptureConfig::default()
            },
            silence_threshold: self.silence_threshold,
            max_duration: self.max_duration_secs.map(Duration::from_secs),
            auto_stop: self.auto_stop,
            ..RecorderOptions::default()
        }
    }
}
