use std::path::Path;

use hound::WavReader;
use tracing::info;

use super::codec;
use crate::error::{CoachError, Result};

/// A WAV file loaded into float samples.
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)
            .map_err(|e| CoachError::DecodeFailure(format!("{}: {}", path.display(), e)))?;

        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => reader
                .into_samples::<i16>()
                .map(|s| s.map(codec::i16_to_float))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| CoachError::DecodeFailure(e.to_string()))?,
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| CoachError::DecodeFailure(e.to_string()))?,
        };

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Encode the samples into an in-memory WAV buffer (`audio/wav`).
    pub fn wav_bytes(&self) -> Result<Vec<u8>> {
        codec::encode_wav(&self.samples, self.sample_rate, self.channels)
    }

    /// Write the samples out as a WAV file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.wav_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
