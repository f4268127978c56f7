// PCM/WAV codec
//
// Normalizes captured float samples into portable 16-bit PCM and the
// 44-byte WAV container layout, and provides the sample-scaling helpers
// shared with the visualization pipeline.

use std::io::Cursor;

use crate::error::{CoachError, Result};

/// MIME tag for buffers produced by [`encode_wav`].
pub const WAV_MIME: &str = "audio/wav";

/// Convert a float sample to signed 16-bit PCM.
///
/// Input is clamped to [-1, 1]; negative values scale by 0x8000 and
/// non-negative by 0x7FFF so both ends of the integer range are reachable.
pub fn float_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Inverse of [`float_to_i16`]; round-trips within 1 LSB.
pub fn i16_to_float(sample: i16) -> f32 {
    if sample < 0 {
        sample as f32 / 32768.0
    } else {
        sample as f32 / 32767.0
    }
}

/// Convert float samples to little-endian 16-bit PCM bytes.
pub fn pcm16_bytes(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| float_to_i16(s).to_le_bytes())
        .collect()
}

/// Interleave two channels as L,R,L,R... into one buffer of combined
/// length. If one channel runs out the remainder of the other follows.
pub fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let longest = left.len().max(right.len());

    for i in 0..longest {
        if let Some(&l) = left.get(i) {
            out.push(l);
        }
        if let Some(&r) = right.get(i) {
            out.push(r);
        }
    }

    out
}

/// Decoded WAV payload.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Encode float samples into an in-memory WAV buffer.
///
/// The output carries the canonical 44-byte header: `RIFF` + chunk size,
/// `WAVE`, a 16-byte PCM `fmt ` subchunk (format code 1, 16 bits per
/// sample) and the `data` subchunk, all little-endian.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(float_to_i16(sample))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Decode a WAV buffer back into float samples.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .into_samples::<i16>()
            .map(|s| s.map(i16_to_float))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoachError::DecodeFailure(e.to_string()))?,
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoachError::DecodeFailure(e.to_string()))?,
    };

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Reduce a byte-level series to exactly `target` samples by averaging
/// contiguous bins. Each output value is the integer-truncated mean of
/// its bin. Inputs at or below `target` are returned unchanged.
pub fn downsample_to(data: &[u8], target: usize) -> Vec<u8> {
    if target == 0 || data.len() <= target {
        return data.to_vec();
    }

    let bin_size = data.len() / target;
    let mut out = Vec::with_capacity(target);

    for i in 0..target {
        let bin = &data[i * bin_size..(i + 1) * bin_size];
        let sum: u32 = bin.iter().map(|&v| v as u32).sum();
        out.push((sum / bin_size as u32) as u8);
    }

    out
}

/// Map float samples [-1, 1] into byte levels 0-255 with silence at 128,
/// the input space of the visualization pipeline.
pub fn levels(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .map(|&s| (((s.clamp(-1.0, 1.0) + 1.0) * 0.5 * 255.0).round()) as u8)
        .collect()
}
