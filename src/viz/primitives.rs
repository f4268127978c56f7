use serde::{Deserialize, Serialize};

/// RGBA color. Alpha is [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Linear interpolation toward `other` by `t` in [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Fill or stroke paint for the host sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        start: (f32, f32),
        end: (f32, f32),
        /// (offset in [0,1], color) stops in ascending offset order.
        stops: Vec<(f32, Color)>,
    },
}

/// One draw instruction for the external draw-primitive sink.
///
/// The core never touches a native surface; it emits an ordered list of
/// these and the host executes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    Clear { width: f32, height: f32 },
    SetFill(Paint),
    SetStroke { paint: Paint, line_width: f32 },
    FillRect { x: f32, y: f32, width: f32, height: f32 },
    FillRoundedRect { x: f32, y: f32, width: f32, height: f32, radius: f32 },
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    StrokePath,
    FillText { text: String, x: f32, y: f32, size: f32 },
}
