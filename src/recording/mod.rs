//! Recording controller
//!
//! This module owns the capture state machine:
//! - Permission flow and host background/interruption signals
//! - Record / pause / resume / stop / cancel transitions under one lock
//! - Live duration, level and silence sampling
//! - Auto-stop at a configured duration limit

mod controller;
mod state;

pub use controller::{HostSignals, RecorderOptions, RecordingController};
pub use state::{RecorderPhase, RecordingState};
