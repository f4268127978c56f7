use thiserror::Error;

/// Result alias that carries the crate-wide [`CoachError`] type.
pub type Result<T> = std::result::Result<T, CoachError>;

/// Typed failures surfaced by the recording, playback, codec and
/// visualization components.
///
/// Interruptions are not errors from the host's point of view, but they
/// are carried through [`RecordingInterrupted`](CoachError::RecordingInterrupted)
/// so callers can tell a forced stop apart from a voluntary one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoachError {
    /// Microphone permission was not granted.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// `start()` was called while a recording is in progress.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// `stop()`/`pause()` was called with no active recording.
    #[error("no recording in progress")]
    NotRecording,

    /// The host reports the app is backgrounded; capture is unavailable.
    #[error("recording is restricted while the app is in the background")]
    BackgroundRestricted,

    /// The system interrupted the recording (call, media focus loss).
    #[error("recording was interrupted by the system")]
    RecordingInterrupted,

    /// A playback operation was invoked with no active playback.
    #[error("no playback in progress")]
    NotPlaying,

    /// Audio bytes could not be decoded.
    #[error("failed to decode audio: {0}")]
    DecodeFailure(String),

    /// A draw was attempted against a released visualization context.
    #[error("visualization context has been released")]
    ContextReleased,

    /// An unknown visualization kind name was requested.
    #[error("unsupported visualization type: {0}")]
    UnsupportedVisualizationType(String),

    /// The capture backend failed to open or close.
    #[error("audio capture failed: {0}")]
    Capture(String),

    /// Underlying I/O failure (file or encoder).
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CoachError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<hound::Error> for CoachError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => Self::Io(io.to_string()),
            other => Self::DecodeFailure(other.to_string()),
        }
    }
}
