use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::info;

use super::config::SessionConfig;
use super::playback::PlaybackCursor;
use super::stats::SessionStats;
use crate::audio::backend::{AudioClip, CaptureBackend};
use crate::error::{CoachError, Result};
use crate::metrics::{self, Feedback, MetricsConfig, SpeechMetrics, Transcription};
use crate::recording::{HostSignals, RecordingController, RecordingState};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One practice run: recording, transcription intake, metrics and
/// review playback, composed behind a single object the application
/// shell drives.
///
/// Collaborators are injected at construction; the session owns no
/// global state.
pub struct PracticeSession {
    config: SessionConfig,
    metrics_config: MetricsConfig,
    controller: RecordingController,
    started_at: chrono::DateTime<Utc>,
    clip: Mutex<Option<AudioClip>>,
    analysis: Mutex<Option<(SpeechMetrics, Feedback)>>,
    playback: PlaybackCursor,
}

impl PracticeSession {
    pub fn new(
        backend: Box<dyn CaptureBackend>,
        host: Arc<HostSignals>,
        config: SessionConfig,
        metrics_config: MetricsConfig,
    ) -> Self {
        info!("Creating practice session: {}", config.session_id);

        let controller = RecordingController::new(backend, host, config.recorder_options());

        Self {
            config,
            metrics_config,
            controller,
            started_at: Utc::now(),
            clip: Mutex::new(None),
            analysis: Mutex::new(None),
            playback: PlaybackCursor::default(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn controller(&self) -> &RecordingController {
        &self.controller
    }

    pub async fn request_permission(&self) -> bool {
        self.controller.request_permission().await
    }

    pub async fn start(&self) -> Result<()> {
        self.controller.start().await
    }

    pub fn pause(&self) -> Result<()> {
        self.controller.pause()
    }

    pub fn resume(&self) -> Result<()> {
        self.controller.resume()
    }

    pub async fn cancel(&self) {
        self.controller.cancel().await;
    }

    /// Stop recording, retain the clip and report the session summary.
    pub async fn stop(&self) -> Result<SessionStats> {
        let clip = self.controller.stop().await?;
        *lock(&self.clip) = Some(clip);
        Ok(self.stats())
    }

    pub fn recording_state(&self) -> RecordingState {
        self.controller.state()
    }

    /// Run the metrics engine over the transcription collaborator's
    /// payload and retain the result.
    pub fn attach_transcription(&self, transcription: &Transcription) -> (SpeechMetrics, Feedback) {
        let speech_metrics = metrics::analyze(transcription, &self.metrics_config);
        let feedback = metrics::generate_feedback(&speech_metrics);

        info!(
            "Session {} analyzed: {} words, clarity {}",
            self.config.session_id, speech_metrics.total_words, speech_metrics.clarity_score
        );

        *lock(&self.analysis) = Some((speech_metrics.clone(), feedback.clone()));
        (speech_metrics, feedback)
    }

    pub fn metrics(&self) -> Option<SpeechMetrics> {
        lock(&self.analysis).as_ref().map(|(m, _)| m.clone())
    }

    pub fn feedback(&self) -> Option<Feedback> {
        lock(&self.analysis).as_ref().map(|(_, f)| f.clone())
    }

    /// The finished clip as WAV bytes (`audio/wav`).
    pub fn wav_bytes(&self) -> Result<Vec<u8>> {
        self.absorb_auto_stop();
        match lock(&self.clip).as_ref() {
            Some(clip) => clip.wav_bytes(),
            None => Err(CoachError::NotRecording),
        }
    }

    /// Byte levels of the finished clip for the visualization pipeline.
    pub fn clip_levels(&self) -> Option<Vec<u8>> {
        self.absorb_auto_stop();
        lock(&self.clip).as_ref().map(|clip| clip.levels())
    }

    /// Start review playback of the finished clip.
    pub fn play(&self) -> Result<()> {
        self.absorb_auto_stop();
        let duration = match lock(&self.clip).as_ref() {
            Some(clip) => clip.duration_seconds(),
            None => return Err(CoachError::NotPlaying),
        };
        self.playback.play(duration);
        Ok(())
    }

    pub fn playback(&self) -> &PlaybackCursor {
        &self.playback
    }

    pub fn stats(&self) -> SessionStats {
        self.absorb_auto_stop();
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            session_id: self.config.session_id.clone(),
            is_recording: self.controller.state().is_recording,
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            clip_seconds: lock(&self.clip).as_ref().map(|c| c.duration_seconds()),
            has_metrics: lock(&self.analysis).is_some(),
        }
    }

    /// Pick up a clip parked by the controller's auto-stop, if any.
    fn absorb_auto_stop(&self) {
        let mut clip = lock(&self.clip);
        if clip.is_none() {
            if let Some(parked) = self.controller.take_finished() {
                *clip = Some(parked);
            }
        }
    }
}
