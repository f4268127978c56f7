// Visualization pipeline
//
// Stateless per call: a byte-level sample buffer plus a quality policy in,
// an ordered list of draw primitives out. The host sink executes the ops;
// nothing here touches a native drawing surface.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::primitives::{Color, DrawOp, Paint};
use super::quality::{resolve_tier, DeviceProfile, QualityTier};
use crate::audio::codec;
use crate::error::{CoachError, Result};

/// Sample budget enforced at the `Minimal` tier.
pub const MINIMAL_SAMPLE_BUDGET: usize = 128;

/// Target drawing area in sink coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformStyle {
    pub stroke: Color,
    pub line_width: f32,
    /// Scale applied to the per-sample offset from the vertical center.
    pub normalization: f32,
    /// Also draw the inverted lower half.
    pub mirror: bool,
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            stroke: Color::rgb(74, 144, 226),
            line_width: 2.0,
            normalization: 1.0,
            mirror: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarStyle {
    pub fill: Color,
    pub bar_count: usize,
    pub gap: f32,
    /// Corner radius; zero draws plain rectangles.
    pub corner_radius: f32,
    pub normalization: f32,
    /// Grow bars out from the vertical center instead of the baseline.
    pub mirrored: bool,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            fill: Color::rgb(74, 144, 226),
            bar_count: 32,
            gap: 2.0,
            corner_radius: 2.0,
            normalization: 1.0,
            mirrored: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStyle {
    pub fill: Color,
    pub normalization: f32,
}

impl Default for VolumeStyle {
    fn default() -> Self {
        Self {
            fill: Color::rgb(80, 200, 120),
            normalization: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramStyle {
    /// Strip color at zero intensity.
    pub quiet: Color,
    /// Strip color at full intensity.
    pub loud: Color,
}

impl Default for SpectrogramStyle {
    fn default() -> Self {
        Self {
            quiet: Color::rgb(20, 24, 48),
            loud: Color::rgb(255, 96, 64),
        }
    }
}

/// Visualization type, one constructor per kind.
///
/// Rendering matches exhaustively, so adding a kind is a compile-checked
/// change everywhere it is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisualizationKind {
    Waveform(WaveformStyle),
    Frequency(BarStyle),
    Volume(VolumeStyle),
    Spectrogram(SpectrogramStyle),
}

impl VisualizationKind {
    /// Parse a kind name (config/CLI seam) with default styling.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "waveform" => Ok(Self::Waveform(WaveformStyle::default())),
            "frequency" => Ok(Self::Frequency(BarStyle::default())),
            "volume" => Ok(Self::Volume(VolumeStyle::default())),
            "spectrogram" => Ok(Self::Spectrogram(SpectrogramStyle::default())),
            other => Err(CoachError::UnsupportedVisualizationType(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Waveform(_) => "waveform",
            Self::Frequency(_) => "frequency",
            Self::Volume(_) => "volume",
            Self::Spectrogram(_) => "spectrogram",
        }
    }
}

/// One visualization call.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    /// Byte-level samples, 0-255 (see [`codec::levels`]).
    pub samples: &'a [u8],
    pub viewport: Viewport,
    pub kind: VisualizationKind,
    /// Explicit tier override; `None` falls back to the device heuristic.
    pub tier: Option<QualityTier>,
    pub device: Option<&'a DeviceProfile>,
    /// Suppress all drawing when the target is not visible.
    pub visible: bool,
}

/// Produce the ordered draw-primitive list for one call.
///
/// An invisible target yields exactly zero primitives, not merely fewer.
pub fn render(request: &RenderRequest<'_>) -> Vec<DrawOp> {
    if !request.visible {
        return Vec::new();
    }

    let tier = resolve_tier(request.tier, request.device);
    let samples: Cow<'_, [u8]> =
        if tier == QualityTier::Minimal && request.samples.len() > MINIMAL_SAMPLE_BUDGET {
            Cow::Owned(codec::downsample_to(request.samples, MINIMAL_SAMPLE_BUDGET))
        } else {
            Cow::Borrowed(request.samples)
        };

    let viewport = request.viewport;
    let mut ops = vec![DrawOp::Clear {
        width: viewport.width,
        height: viewport.height,
    }];

    if samples.is_empty() {
        return ops;
    }

    match &request.kind {
        VisualizationKind::Waveform(style) => draw_waveform(&samples, viewport, style, &mut ops),
        VisualizationKind::Frequency(style) => {
            draw_frequency(&samples, viewport, style, tier, &mut ops)
        }
        VisualizationKind::Volume(style) => draw_volume(&samples, viewport, style, &mut ops),
        VisualizationKind::Spectrogram(style) => {
            draw_spectrogram(&samples, viewport, style, &mut ops)
        }
    }

    ops
}

/// Signed offset of a byte sample from the vertical center.
fn center_offset(sample: u8, center: f32, normalization: f32) -> f32 {
    let v = sample as f32 / 128.0 - 1.0;
    v * center * normalization
}

fn draw_waveform(samples: &[u8], viewport: Viewport, style: &WaveformStyle, ops: &mut Vec<DrawOp>) {
    let center = viewport.height / 2.0;
    let step = viewport.width / samples.len() as f32;

    ops.push(DrawOp::SetStroke {
        paint: Paint::Solid(style.stroke),
        line_width: style.line_width,
    });

    let passes: &[f32] = if style.mirror { &[1.0, -1.0] } else { &[1.0] };
    for &sign in passes {
        for (i, &sample) in samples.iter().enumerate() {
            let x = i as f32 * step;
            let y = center + sign * center_offset(sample, center, style.normalization);
            if i == 0 {
                ops.push(DrawOp::MoveTo { x, y });
            } else {
                ops.push(DrawOp::LineTo { x, y });
            }
        }
        ops.push(DrawOp::LineTo {
            x: viewport.width,
            y: center,
        });
        ops.push(DrawOp::StrokePath);
    }
}

fn draw_frequency(
    samples: &[u8],
    viewport: Viewport,
    style: &BarStyle,
    tier: QualityTier,
    ops: &mut Vec<DrawOp>,
) {
    let bar_count = style.bar_count.clamp(1, tier.max_bars());
    let bucket = (samples.len() / bar_count).max(1);
    let total_gap = style.gap * bar_count.saturating_sub(1) as f32;
    let bar_width = ((viewport.width - total_gap) / bar_count as f32).max(1.0);
    let center = viewport.height / 2.0;

    ops.push(DrawOp::SetFill(Paint::Solid(style.fill)));

    for i in 0..bar_count {
        let start = i * bucket;
        if start >= samples.len() {
            break;
        }
        let end = ((i + 1) * bucket).min(samples.len());
        let bin = &samples[start..end];
        let mean = bin.iter().map(|&v| v as f32).sum::<f32>() / bin.len() as f32;

        let bar_height = (mean / 255.0 * viewport.height * style.normalization)
            .min(viewport.height);
        let x = i as f32 * (bar_width + style.gap);
        let y = if style.mirrored {
            center - bar_height / 2.0
        } else {
            viewport.height - bar_height
        };

        if style.corner_radius > 0.0 {
            ops.push(DrawOp::FillRoundedRect {
                x,
                y,
                width: bar_width,
                height: bar_height,
                radius: style.corner_radius,
            });
        } else {
            ops.push(DrawOp::FillRect {
                x,
                y,
                width: bar_width,
                height: bar_height,
            });
        }
    }
}

fn draw_volume(samples: &[u8], viewport: Viewport, style: &VolumeStyle, ops: &mut Vec<DrawOp>) {
    let mean = samples.iter().map(|&v| v as f32).sum::<f32>() / samples.len() as f32;
    let bar_height = (mean / 255.0 * viewport.height * style.normalization).min(viewport.height);

    ops.push(DrawOp::SetFill(Paint::Solid(style.fill)));
    ops.push(DrawOp::FillRect {
        x: 0.0,
        y: viewport.height - bar_height,
        width: viewport.width,
        height: bar_height,
    });
}

fn draw_spectrogram(
    samples: &[u8],
    viewport: Viewport,
    style: &SpectrogramStyle,
    ops: &mut Vec<DrawOp>,
) {
    let strip = viewport.width / samples.len() as f32;

    for (i, &sample) in samples.iter().enumerate() {
        let intensity = sample as f32 / 255.0;
        let color = style.quiet.lerp(style.loud, intensity);
        ops.push(DrawOp::SetFill(Paint::Solid(color)));
        ops.push(DrawOp::FillRect {
            x: i as f32 * strip,
            y: 0.0,
            width: strip,
            height: viewport.height,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            width: 320.0,
            height: 120.0,
        }
    }

    #[test]
    fn invisible_target_emits_nothing() {
        let samples = vec![128u8; 256];
        let request = RenderRequest {
            samples: &samples,
            viewport: viewport(),
            kind: VisualizationKind::Waveform(WaveformStyle::default()),
            tier: Some(QualityTier::Maximum),
            device: None,
            visible: false,
        };
        assert!(render(&request).is_empty());
    }

    #[test]
    fn unknown_kind_name_is_rejected() {
        let err = VisualizationKind::from_name("hologram").unwrap_err();
        assert_eq!(
            err,
            CoachError::UnsupportedVisualizationType("hologram".to_string())
        );
    }

    #[test]
    fn volume_is_a_single_bar() {
        let samples = vec![255u8; 64];
        let request = RenderRequest {
            samples: &samples,
            viewport: viewport(),
            kind: VisualizationKind::Volume(VolumeStyle::default()),
            tier: Some(QualityTier::Standard),
            device: None,
            visible: true,
        };
        let ops = render(&request);
        let rects = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
            .count();
        assert_eq!(rects, 1);
    }
}
