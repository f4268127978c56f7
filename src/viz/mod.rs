//! Visualization-data pipeline
//!
//! Turns sample buffers into ordered draw-primitive lists for an external
//! sink, degrades fidelity under the quality policy, and tracks the
//! lifecycle of host drawing contexts.

pub mod contexts;
pub mod overlay;
pub mod pipeline;
pub mod primitives;
pub mod quality;

pub use contexts::{ContextId, ContextRegistry, RegistryConfig, VisualizationService};
pub use overlay::{word_timing_overlay, OverlayStyle};
pub use pipeline::{
    render, BarStyle, RenderRequest, SpectrogramStyle, Viewport, VisualizationKind, VolumeStyle,
    WaveformStyle, MINIMAL_SAMPLE_BUDGET,
};
pub use primitives::{Color, DrawOp, Paint};
pub use quality::{resolve_tier, DeviceProfile, QualityTier};
