// Recording state machine
//
// All phase transitions are read-modify-write under one mutex so explicit
// calls, the periodic sampler and the interruption signal serialize. An
// epoch counter invalidates in-flight work (capture/sampler tasks, a
// pending `start()`) across terminal transitions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::state::{RecorderPhase, RecordingState};
use crate::audio::backend::{
    AudioChunk, AudioClip, CaptureBackend, CaptureConfig, CaptureEvent,
};
use crate::error::{CoachError, Result};

/// How often the live sampler refreshes duration/level/silence.
const SAMPLER_INTERVAL: Duration = Duration::from_millis(100);

/// Recording knobs for one controller.
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    pub capture: CaptureConfig,
    /// Level under which a sample window counts as silent.
    pub silence_threshold: f32,
    /// How long the level must stay under the threshold before the
    /// snapshot reports silence.
    pub silence_hold: Duration,
    /// Hard duration limit, if any.
    pub max_duration: Option<Duration>,
    /// Stop automatically when `max_duration` is reached.
    pub auto_stop: bool,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            silence_threshold: 0.02,
            silence_hold: Duration::from_secs(1),
            max_duration: None,
            auto_stop: false,
        }
    }
}

/// Host-reported runtime signals the controller consults.
///
/// The application shell owns one of these and flips the flags from its
/// lifecycle callbacks; the controller only ever reads them.
#[derive(Debug, Default)]
pub struct HostSignals {
    backgrounded: AtomicBool,
}

impl HostSignals {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_backgrounded(&self, backgrounded: bool) {
        self.backgrounded.store(backgrounded, Ordering::SeqCst);
    }

    pub fn is_backgrounded(&self) -> bool {
        self.backgrounded.load(Ordering::SeqCst)
    }
}

struct Shared {
    phase: RecorderPhase,
    snapshot: RecordingState,
    permission_granted: bool,
    chunks: Vec<AudioChunk>,
    started_at: Option<Instant>,
    paused_total: Duration,
    pause_started: Option<Instant>,
    /// RMS of the latest chunk, copied into the snapshot by the sampler.
    last_level: f32,
    last_sound_at: Option<Instant>,
    /// Bumped on every terminal transition; stale tasks observe the
    /// mismatch and bail out.
    epoch: u64,
    /// Clip parked by an internally triggered auto-stop.
    finished: Option<AudioClip>,
}

impl Shared {
    fn reset_session(&mut self) {
        self.chunks.clear();
        self.started_at = None;
        self.paused_total = Duration::ZERO;
        self.pause_started = None;
        self.last_level = 0.0;
        self.last_sound_at = None;
    }

    /// Forced exit to `Idle` carrying the interruption error.
    fn interrupt(&mut self) {
        self.phase = RecorderPhase::Idle;
        self.epoch += 1;
        self.reset_session();
        self.snapshot = RecordingState {
            error: Some(CoachError::RecordingInterrupted),
            ..RecordingState::default()
        };
    }
}

fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

type SharedBackend = Arc<tokio::sync::Mutex<Box<dyn CaptureBackend>>>;

/// Owns the capture device handle and runs the record/pause/resume/stop/
/// cancel state machine. At most one `Recording`/`Paused` session exists
/// per controller; the controller is the sole writer of
/// [`RecordingState`].
pub struct RecordingController {
    options: RecorderOptions,
    host: Arc<HostSignals>,
    backend: SharedBackend,
    shared: Arc<Mutex<Shared>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RecordingController {
    pub fn new(
        backend: Box<dyn CaptureBackend>,
        host: Arc<HostSignals>,
        options: RecorderOptions,
    ) -> Self {
        Self {
            options,
            host,
            backend: Arc::new(tokio::sync::Mutex::new(backend)),
            shared: Arc::new(Mutex::new(Shared {
                phase: RecorderPhase::Idle,
                snapshot: RecordingState::default(),
                permission_granted: false,
                chunks: Vec::new(),
                started_at: None,
                paused_total: Duration::ZERO,
                pause_started: None,
                last_level: 0.0,
                last_sound_at: None,
                epoch: 0,
                finished: None,
            })),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Current live snapshot.
    pub fn state(&self) -> RecordingState {
        lock_shared(&self.shared).snapshot.clone()
    }

    /// Current phase.
    pub fn phase(&self) -> RecorderPhase {
        lock_shared(&self.shared).phase
    }

    /// Take the clip parked by an auto-stop, if one happened.
    pub fn take_finished(&self) -> Option<AudioClip> {
        lock_shared(&self.shared).finished.take()
    }

    /// Ask the host for microphone access. Idempotent; never starts
    /// capture.
    pub async fn request_permission(&self) -> bool {
        {
            let mut shared = lock_shared(&self.shared);
            if shared.permission_granted {
                return true;
            }
            if shared.phase == RecorderPhase::Idle {
                shared.phase = RecorderPhase::PermissionPending;
            }
        }

        let granted = self.backend.lock().await.request_access().await;

        let mut shared = lock_shared(&self.shared);
        shared.permission_granted = granted;
        if shared.phase == RecorderPhase::PermissionPending {
            shared.phase = RecorderPhase::Idle;
        }
        info!("microphone permission {}", if granted { "granted" } else { "denied" });
        granted
    }

    /// Begin a capture session.
    pub async fn start(&self) -> Result<()> {
        let epoch = {
            let mut shared = lock_shared(&self.shared);
            if shared.phase.is_active() {
                return Err(CoachError::AlreadyRecording);
            }
            if self.host.is_backgrounded() {
                return Err(CoachError::BackgroundRestricted);
            }
            if !shared.permission_granted {
                return Err(CoachError::PermissionDenied);
            }

            shared.phase = RecorderPhase::Recording;
            shared.snapshot = RecordingState {
                is_recording: true,
                ..RecordingState::default()
            };
            shared.reset_session();
            shared.finished = None;
            shared.epoch += 1;
            shared.epoch
        };

        let rx = match self.backend.lock().await.open(&self.options.capture).await {
            Ok(rx) => rx,
            Err(err) => {
                let mut shared = lock_shared(&self.shared);
                if shared.epoch == epoch && shared.phase == RecorderPhase::Recording {
                    shared.phase = RecorderPhase::Idle;
                    shared.snapshot.is_recording = false;
                    shared.snapshot.error = Some(err.clone());
                }
                return Err(err);
            }
        };

        {
            let mut shared = lock_shared(&self.shared);
            if shared.epoch != epoch || shared.phase != RecorderPhase::Recording {
                // Interrupted while the device was opening.
                drop(shared);
                let _ = self.backend.lock().await.close().await;
                return Err(CoachError::RecordingInterrupted);
            }
            shared.started_at = Some(Instant::now());
        }

        info!("recording started");

        let capture_task = Self::spawn_capture(Arc::clone(&self.shared), rx, epoch);
        let sampler_task = Self::spawn_sampler(
            Arc::clone(&self.shared),
            Arc::clone(&self.backend),
            self.options.clone(),
            epoch,
        );
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.push(capture_task);
        tasks.push(sampler_task);

        Ok(())
    }

    /// Finalize the session and hand the clip to the caller.
    pub async fn stop(&self) -> Result<AudioClip> {
        let epoch = {
            let shared = lock_shared(&self.shared);
            if !matches!(shared.phase, RecorderPhase::Recording | RecorderPhase::Paused) {
                return Err(CoachError::NotRecording);
            }
            shared.epoch
        };

        let clip = Self::finalize(&self.shared, &self.backend, &self.options.capture, epoch).await?;
        self.join_tasks().await;
        info!("recording stopped: {:.1}s captured", clip.duration_seconds());
        Ok(clip)
    }

    /// Suspend capture; chunks arriving while paused are discarded.
    pub fn pause(&self) -> Result<()> {
        let mut shared = lock_shared(&self.shared);
        if shared.phase != RecorderPhase::Recording {
            return Err(CoachError::NotRecording);
        }
        shared.phase = RecorderPhase::Paused;
        shared.pause_started = Some(Instant::now());
        shared.snapshot.is_recording = false;
        Ok(())
    }

    /// Resume a paused session.
    pub fn resume(&self) -> Result<()> {
        let mut shared = lock_shared(&self.shared);
        if shared.phase != RecorderPhase::Paused {
            return Err(CoachError::NotRecording);
        }
        if self.host.is_backgrounded() {
            return Err(CoachError::BackgroundRestricted);
        }
        if let Some(paused) = shared.pause_started.take() {
            shared.paused_total += paused.elapsed();
        }
        shared.phase = RecorderPhase::Recording;
        shared.snapshot.is_recording = true;
        Ok(())
    }

    /// Discard the session unconditionally. Always succeeds, from any
    /// phase, including during a pending `start()`.
    pub async fn cancel(&self) {
        {
            let mut shared = lock_shared(&self.shared);
            shared.phase = RecorderPhase::Idle;
            shared.epoch += 1;
            shared.reset_session();
            shared.finished = None;
            shared.snapshot = RecordingState::default();
        }

        let mut backend = self.backend.lock().await;
        if backend.is_open() {
            let _ = backend.close().await;
        }
        drop(backend);

        self.join_tasks().await;
        info!("recording cancelled");
    }

    /// External interruption (call, media focus loss). Forces `Idle` with
    /// `RecordingInterrupted` in the snapshot, discards in-flight samples
    /// and schedules device release. Reachable mid-`start()` via the
    /// epoch guard. Must be called from within a tokio runtime.
    pub fn signal_interruption(&self) {
        {
            let mut shared = lock_shared(&self.shared);
            if shared.phase == RecorderPhase::Idle {
                return;
            }
            warn!("recording interrupted by host signal");
            shared.interrupt();
        }

        // The signal arrives from a sync host callback; release the
        // device without blocking it.
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let mut backend = backend.lock().await;
            if backend.is_open() {
                let _ = backend.close().await;
            }
        });
    }

    fn spawn_capture(
        shared: Arc<Mutex<Shared>>,
        mut rx: mpsc::Receiver<CaptureEvent>,
        epoch: u64,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    CaptureEvent::Chunk(chunk) => {
                        let mut s = lock_shared(&shared);
                        if s.epoch != epoch {
                            return;
                        }
                        if s.phase == RecorderPhase::Recording {
                            let level = chunk.rms();
                            if s.chunks.is_empty() {
                                // Seed the visible level from the first window.
                                s.snapshot.audio_level = level;
                            }
                            s.last_level = level;
                            s.chunks.push(chunk);
                        }
                    }
                    CaptureEvent::Closed => {
                        let mut s = lock_shared(&shared);
                        if s.epoch == epoch
                            && matches!(s.phase, RecorderPhase::Recording | RecorderPhase::Paused)
                        {
                            warn!("capture stream closed unexpectedly");
                            s.interrupt();
                        }
                        return;
                    }
                }
            }

            // Channel dropped without a terminal event.
            let mut s = lock_shared(&shared);
            if s.epoch == epoch
                && matches!(s.phase, RecorderPhase::Recording | RecorderPhase::Paused)
            {
                warn!("capture stream dropped without close event");
                s.interrupt();
            }
        })
    }

    fn spawn_sampler(
        shared: Arc<Mutex<Shared>>,
        backend: SharedBackend,
        options: RecorderOptions,
        epoch: u64,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SAMPLER_INTERVAL);
            loop {
                interval.tick().await;

                let auto_stop = {
                    let mut s = lock_shared(&shared);
                    if s.epoch != epoch {
                        return;
                    }
                    match s.phase {
                        RecorderPhase::Recording => {
                            let now = Instant::now();
                            if let Some(started) = s.started_at {
                                s.snapshot.duration_seconds =
                                    now.saturating_duration_since(started)
                                        .saturating_sub(s.paused_total)
                                        .as_secs_f64();
                            }

                            let level = s.last_level;
                            s.snapshot.audio_level = level;
                            if level >= options.silence_threshold {
                                s.last_sound_at = Some(now);
                                s.snapshot.is_silent = false;
                            } else {
                                let quiet_since = s.last_sound_at.or(s.started_at);
                                s.snapshot.is_silent = quiet_since
                                    .map(|t| now.saturating_duration_since(t) > options.silence_hold)
                                    .unwrap_or(false);
                            }

                            options.auto_stop
                                && options
                                    .max_duration
                                    .map(|max| s.snapshot.duration_seconds >= max.as_secs_f64())
                                    .unwrap_or(false)
                        }
                        RecorderPhase::Paused | RecorderPhase::Stopping => false,
                        // Session over; the task retires.
                        RecorderPhase::Idle | RecorderPhase::PermissionPending => return,
                    }
                };

                if auto_stop {
                    info!("max duration reached, stopping recording");
                    match Self::finalize(&shared, &backend, &options.capture, epoch).await {
                        Ok(clip) => {
                            lock_shared(&shared).finished = Some(clip);
                        }
                        Err(_) => {
                            // Lost the race against an explicit stop/cancel.
                        }
                    }
                    return;
                }
            }
        })
    }

    /// The single stop routine shared by `stop()` and auto-stop: move to
    /// `Stopping`, flush/close the device, concatenate chunks, settle back
    /// to `Idle`.
    async fn finalize(
        shared: &Arc<Mutex<Shared>>,
        backend: &SharedBackend,
        capture: &CaptureConfig,
        epoch: u64,
    ) -> Result<AudioClip> {
        {
            let mut s = lock_shared(shared);
            if s.epoch != epoch
                || !matches!(s.phase, RecorderPhase::Recording | RecorderPhase::Paused)
            {
                return Err(CoachError::NotRecording);
            }
            s.phase = RecorderPhase::Stopping;
            s.snapshot.is_processing = true;
            if let Some(paused) = s.pause_started.take() {
                s.paused_total += paused.elapsed();
            }
        }

        if let Err(err) = backend.lock().await.close().await {
            error!("failed to close capture backend: {}", err);
        }

        let mut s = lock_shared(shared);
        let chunks = std::mem::take(&mut s.chunks);
        let clip = AudioClip::from_chunks(&chunks, capture);
        s.phase = RecorderPhase::Idle;
        s.snapshot.is_recording = false;
        s.snapshot.is_processing = false;
        s.snapshot.duration_seconds = clip.duration_seconds();
        s.started_at = None;
        Ok(clip)
    }

    async fn join_tasks(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.drain(..).collect()
        };
        for handle in handles {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    error!("recording task panicked");
                }
            }
        }
    }
}
