use crate::error::CoachError;

/// Controller lifecycle phase.
///
/// `Idle -> PermissionPending -> Recording <-> Paused -> Stopping -> Idle`.
/// Cancellation and interruption exit back to `Idle` from any non-idle
/// phase; an interrupted exit leaves `RecordingInterrupted` in the
/// snapshot so callers can tell it apart from a voluntary stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    Idle,
    PermissionPending,
    Recording,
    Paused,
    Stopping,
}

impl RecorderPhase {
    /// Whether a capture session currently owns the device.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Recording | Self::Paused | Self::Stopping)
    }
}

/// Live recording snapshot, written only by the controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingState {
    pub is_recording: bool,
    pub duration_seconds: f64,
    /// RMS level of the latest sample window, in [0, 1].
    pub audio_level: f32,
    /// True while `stop()` finalizes the clip.
    pub is_processing: bool,
    /// True once the level has stayed under the silence threshold for the
    /// configured hold window.
    pub is_silent: bool,
    pub error: Option<CoachError>,
}
