// Word-timing overlay: a timeline with tick marks, word labels and a
// current-time marker, laid over a playback view of a finished clip.

use serde::{Deserialize, Serialize};

use super::pipeline::Viewport;
use super::primitives::{Color, DrawOp, Paint};
use crate::metrics::WordTiming;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub baseline: Color,
    pub tick: Color,
    pub label: Color,
    /// Fill for the word whose span contains the current time.
    pub highlight: Color,
    pub marker: Color,
    pub font_size: f32,
    /// Upper bound on emitted tick marks; long clips get coarser ticks.
    pub max_ticks: usize,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            baseline: Color::rgb(120, 120, 130),
            tick: Color::rgb(120, 120, 130),
            label: Color::rgb(200, 200, 210),
            highlight: Color::rgb(255, 200, 60),
            marker: Color::rgb(255, 80, 80),
            font_size: 11.0,
            max_ticks: 30,
        }
    }
}

/// Emit the overlay ops for one frame of playback.
///
/// Returns an empty list when there is no timeline to draw
/// (`total_duration <= 0`).
pub fn word_timing_overlay(
    words: &[WordTiming],
    current_time: f64,
    total_duration: f64,
    viewport: Viewport,
    style: &OverlayStyle,
) -> Vec<DrawOp> {
    if total_duration <= 0.0 {
        return Vec::new();
    }

    let mut ops = Vec::new();
    let baseline_y = viewport.height - 20.0;

    // Timeline baseline.
    ops.push(DrawOp::SetStroke {
        paint: Paint::Solid(style.baseline),
        line_width: 1.0,
    });
    ops.push(DrawOp::MoveTo { x: 0.0, y: baseline_y });
    ops.push(DrawOp::LineTo {
        x: viewport.width,
        y: baseline_y,
    });
    ops.push(DrawOp::StrokePath);

    // Tick marks at whole seconds, coarsened so long clips stay readable.
    let tick_step = (total_duration / style.max_ticks as f64).ceil().max(1.0);
    ops.push(DrawOp::SetStroke {
        paint: Paint::Solid(style.tick),
        line_width: 1.0,
    });
    ops.push(DrawOp::SetFill(Paint::Solid(style.tick)));
    let mut t = 0.0;
    while t <= total_duration {
        let x = (t / total_duration) as f32 * viewport.width;
        ops.push(DrawOp::MoveTo { x, y: baseline_y - 4.0 });
        ops.push(DrawOp::LineTo { x, y: baseline_y + 4.0 });
        ops.push(DrawOp::StrokePath);
        ops.push(DrawOp::FillText {
            text: format!("{:.0}s", t),
            x,
            y: baseline_y + 16.0,
            size: style.font_size,
        });
        t += tick_step;
    }

    // Word labels, highlighting the one under the playhead.
    for word in words {
        let x = (word.start_time / total_duration) as f32 * viewport.width;
        let active = current_time >= word.start_time && current_time <= word.end_time;
        let fill = if active { style.highlight } else { style.label };
        ops.push(DrawOp::SetFill(Paint::Solid(fill)));
        ops.push(DrawOp::FillText {
            text: word.word.clone(),
            x,
            y: baseline_y - 8.0,
            size: style.font_size,
        });
    }

    // Current-time marker across the full height.
    let marker_x = (current_time / total_duration).clamp(0.0, 1.0) as f32 * viewport.width;
    ops.push(DrawOp::SetStroke {
        paint: Paint::Solid(style.marker),
        line_width: 2.0,
    });
    ops.push(DrawOp::MoveTo { x: marker_x, y: 0.0 });
    ops.push(DrawOp::LineTo {
        x: marker_x,
        y: viewport.height,
    });
    ops.push(DrawOp::StrokePath);

    ops
}
