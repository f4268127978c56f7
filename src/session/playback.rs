use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::{CoachError, Result};

#[derive(Debug)]
enum Playback {
    Idle,
    Playing {
        clip_duration: f64,
        resumed_at: Instant,
        /// Seconds played before the last resume.
        accumulated: f64,
    },
    Paused {
        clip_duration: f64,
        accumulated: f64,
    },
}

/// Review-playback position over a finished clip.
///
/// The host plays the audio itself; this cursor only tracks where the
/// playhead is so the word-timing overlay can highlight the current
/// word. Reaching the end of the clip returns the cursor to idle.
#[derive(Debug)]
pub struct PlaybackCursor {
    inner: Mutex<Playback>,
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Playback::Idle),
        }
    }
}

fn lock(inner: &Mutex<Playback>) -> MutexGuard<'_, Playback> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PlaybackCursor {
    /// Start playback from the beginning of a clip of the given length.
    pub fn play(&self, clip_duration: f64) {
        let mut state = lock(&self.inner);
        *state = Playback::Playing {
            clip_duration: clip_duration.max(0.0),
            resumed_at: Instant::now(),
            accumulated: 0.0,
        };
    }

    pub fn is_playing(&self) -> bool {
        matches!(*lock(&self.inner), Playback::Playing { .. })
    }

    /// Current playhead position in seconds.
    ///
    /// Clamps at the clip end and settles back to idle once the end is
    /// reached; a later call then fails with `NotPlaying`.
    pub fn position(&self) -> Result<f64> {
        let mut state = lock(&self.inner);
        match *state {
            Playback::Idle => Err(CoachError::NotPlaying),
            Playback::Paused { accumulated, .. } => Ok(accumulated),
            Playback::Playing {
                clip_duration,
                resumed_at,
                accumulated,
            } => {
                let elapsed = accumulated + resumed_at.elapsed().as_secs_f64();
                if elapsed >= clip_duration {
                    *state = Playback::Idle;
                    Ok(clip_duration)
                } else {
                    Ok(elapsed)
                }
            }
        }
    }

    pub fn pause(&self) -> Result<()> {
        let mut state = lock(&self.inner);
        match *state {
            Playback::Playing {
                clip_duration,
                resumed_at,
                accumulated,
            } => {
                let at = (accumulated + resumed_at.elapsed().as_secs_f64()).min(clip_duration);
                *state = Playback::Paused {
                    clip_duration,
                    accumulated: at,
                };
                Ok(())
            }
            _ => Err(CoachError::NotPlaying),
        }
    }

    pub fn resume(&self) -> Result<()> {
        let mut state = lock(&self.inner);
        match *state {
            Playback::Paused {
                clip_duration,
                accumulated,
            } => {
                *state = Playback::Playing {
                    clip_duration,
                    resumed_at: Instant::now(),
                    accumulated,
                };
                Ok(())
            }
            _ => Err(CoachError::NotPlaying),
        }
    }

    pub fn stop(&self) -> Result<()> {
        let mut state = lock(&self.inner);
        match *state {
            Playback::Idle => Err(CoachError::NotPlaying),
            _ => {
                *state = Playback::Idle;
                Ok(())
            }
        }
    }
}
