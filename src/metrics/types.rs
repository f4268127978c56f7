use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Word-level timing supplied by the transcription collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Payload from the transcription collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
    pub transcript: String,
    #[serde(default)]
    pub word_timings: Vec<WordTiming>,
    pub duration_seconds: f64,
}

/// A detected filler word or phrase with its start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillerWordInstance {
    pub word: String,
    pub timestamp: f64,
}

/// A silence gap between two consecutive words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pause {
    /// When the pause started (end of the preceding word).
    pub start_time: f64,
    /// Gap length in seconds.
    pub duration: f64,
}

/// Quantitative delivery metrics for one practice run.
///
/// `total_filler_words` always equals the sum of `filler_word_counts`
/// values, and `clarity_score` is clamped to [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechMetrics {
    pub words_per_minute: f64,
    pub total_words: u32,
    pub duration_seconds: f64,
    /// Per-filler counts, ordered for deterministic output.
    pub filler_word_counts: BTreeMap<String, u32>,
    pub total_filler_words: u32,
    pub filler_word_percentage: f64,
    pub avg_pause_duration: f64,
    pub pauses_per_minute: f64,
    pub clarity_score: u8,
}

impl Default for SpeechMetrics {
    fn default() -> Self {
        Self {
            words_per_minute: 0.0,
            total_words: 0,
            duration_seconds: 0.0,
            filler_word_counts: BTreeMap::new(),
            total_filler_words: 0,
            filler_word_percentage: 0.0,
            avg_pause_duration: 0.0,
            pauses_per_minute: 0.0,
            clarity_score: 0,
        }
    }
}
