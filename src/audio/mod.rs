pub mod backend;
pub mod codec;
pub mod file;

pub use backend::{AudioChunk, AudioClip, CaptureBackend, CaptureConfig, CaptureEvent, ScriptedCapture};
pub use codec::{DecodedAudio, WAV_MIME};
pub use file::AudioFile;
