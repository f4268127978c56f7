pub mod audio;
pub mod config;
pub mod error;
pub mod metrics;
pub mod recording;
pub mod session;
pub mod viz;

pub use audio::{
    AudioChunk, AudioClip, AudioFile, CaptureBackend, CaptureConfig, CaptureEvent, ScriptedCapture,
    WAV_MIME,
};
pub use config::Config;
pub use error::{CoachError, Result};
pub use metrics::{
    analyze, generate_feedback, Feedback, FillerWordInstance, MetricsConfig, SpeechMetrics,
    Transcription, WordTiming,
};
pub use recording::{
    HostSignals, RecorderOptions, RecorderPhase, RecordingController, RecordingState,
};
pub use session::{PlaybackCursor, PracticeSession, SessionConfig, SessionStats};
pub use viz::{
    ContextId, ContextRegistry, DeviceProfile, DrawOp, QualityTier, RegistryConfig, Viewport,
    VisualizationKind, VisualizationService,
};
