use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::{CoachError, Result};

/// One buffer of captured float samples.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved float samples in [-1, 1].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Timestamp in milliseconds since capture started.
    pub timestamp_ms: u64,
}

impl AudioChunk {
    /// Root-mean-square level of the chunk, clamped to [0, 1].
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.samples.iter().map(|s| s * s).sum();
        (sum / self.samples.len() as f32).sqrt().clamp(0.0, 1.0)
    }

    /// Chunk duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// A finished recording: capture chunks concatenated into one buffer.
///
/// Produced by the controller's stop path; the caller becomes the sole
/// owner of the samples.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    /// Concatenate chunks into a clip; an empty chunk list yields an empty
    /// clip carrying the configured format.
    pub fn from_chunks(chunks: &[AudioChunk], config: &CaptureConfig) -> Self {
        let (sample_rate, channels) = chunks
            .first()
            .map(|c| (c.sample_rate, c.channels))
            .unwrap_or((config.sample_rate, config.channels));

        let samples = chunks
            .iter()
            .flat_map(|c| c.samples.iter().copied())
            .collect();

        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Encode into an in-memory WAV buffer (`audio/wav`).
    pub fn wav_bytes(&self) -> Result<Vec<u8>> {
        super::codec::encode_wav(&self.samples, self.sample_rate, self.channels)
    }

    /// Byte levels for the visualization pipeline.
    pub fn levels(&self) -> Vec<u8> {
        super::codec::levels(&self.samples)
    }
}

/// Events yielded by an open capture stream.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// A buffer of captured samples.
    Chunk(AudioChunk),
    /// Terminal event: the device closed the stream.
    Closed,
}

/// Configuration for a capture backend.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate in Hz.
    pub sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Buffer size in milliseconds (affects latency).
    pub chunk_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz, enough for speech
            channels: 1,        // Mono
            chunk_duration_ms: 100,
        }
    }
}

/// Audio capture backend trait.
///
/// The recording controller only ever talks to this interface; platform
/// capture (cpal, OS capture kits) and test doubles both live behind it.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Ask the host for microphone access. Idempotent; never starts capture.
    async fn request_access(&self) -> bool;

    /// Open the device and start the stream.
    ///
    /// The receiver yields [`CaptureEvent::Chunk`] buffers and ends with a
    /// terminal [`CaptureEvent::Closed`].
    async fn open(&mut self, config: &CaptureConfig) -> Result<mpsc::Receiver<CaptureEvent>>;

    /// Stop the stream and release the device.
    async fn close(&mut self) -> Result<()>;

    /// Whether the device is currently open.
    fn is_open(&self) -> bool;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Scripted capture backend for tests and batch processing.
///
/// Emits a fixed sequence of chunks when opened, then keeps the stream
/// alive until [`CaptureBackend::close`] is called, at which point it
/// yields the terminal close event.
pub struct ScriptedCapture {
    access_granted: bool,
    chunks: Vec<AudioChunk>,
    open: bool,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl ScriptedCapture {
    pub fn new(chunks: Vec<AudioChunk>) -> Self {
        Self {
            access_granted: true,
            chunks,
            open: false,
            stop_tx: None,
        }
    }

    /// Override whether `request_access` reports the permission as granted.
    pub fn with_access(mut self, granted: bool) -> Self {
        self.access_granted = granted;
        self
    }

    /// Build a chunk filled with a constant sample value.
    pub fn constant_chunk(value: f32, len: usize, sample_rate: u32, timestamp_ms: u64) -> AudioChunk {
        AudioChunk {
            samples: vec![value; len],
            sample_rate,
            channels: 1,
            timestamp_ms,
        }
    }
}

#[async_trait]
impl CaptureBackend for ScriptedCapture {
    async fn request_access(&self) -> bool {
        self.access_granted
    }

    async fn open(&mut self, _config: &CaptureConfig) -> Result<mpsc::Receiver<CaptureEvent>> {
        if self.open {
            return Err(CoachError::Capture("device already open".to_string()));
        }

        let (tx, rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);
        self.open = true;

        let chunks = self.chunks.clone();
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(CaptureEvent::Chunk(chunk)).await.is_err() {
                    return;
                }
            }

            // Hold the stream open until the backend is closed.
            let _ = stop_rx.await;
            let _ = tx.send(CaptureEvent::Closed).await;
        });

        Ok(rx)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
