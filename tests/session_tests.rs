// End-to-end practice session flow: record, stop, attach a
// transcription, read back metrics, WAV bytes and playback position.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use speech_coach::audio::AudioChunk;
use speech_coach::{
    CoachError, HostSignals, MetricsConfig, PracticeSession, ScriptedCapture, SessionConfig,
    Transcription, WordTiming,
};

fn session(chunks: Vec<AudioChunk>) -> PracticeSession {
    let host = HostSignals::new();
    let backend = ScriptedCapture::new(chunks);
    PracticeSession::new(
        Box::new(backend),
        Arc::clone(&host),
        SessionConfig::default(),
        MetricsConfig::default(),
    )
}

fn chunks(count: usize) -> Vec<AudioChunk> {
    (0..count)
        .map(|i| ScriptedCapture::constant_chunk(0.3, 1600, 16000, i as u64 * 100))
        .collect()
}

#[tokio::test]
async fn full_session_flow() -> Result<()> {
    let session = session(chunks(4));

    assert!(session.request_permission().await);
    session.start().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let stats = session.stop().await?;
    assert!(!stats.is_recording);
    let clip_seconds = stats.clip_seconds.expect("clip retained after stop");
    assert!((clip_seconds - 0.4).abs() < 1e-9);
    assert!(!stats.has_metrics);

    // Transcription arrives from the external collaborator.
    let transcription = Transcription {
        transcript: "um hello everyone thanks for joining".to_string(),
        word_timings: vec![
            WordTiming {
                word: "um".to_string(),
                start_time: 0.0,
                end_time: 0.2,
                confidence: Some(0.9),
            },
            WordTiming {
                word: "hello".to_string(),
                start_time: 0.3,
                end_time: 0.6,
                confidence: Some(0.98),
            },
        ],
        duration_seconds: clip_seconds,
    };
    let (metrics, feedback) = session.attach_transcription(&transcription);
    assert_eq!(metrics.total_filler_words, 1);
    assert!(!feedback.encouragement.is_empty());
    assert!(session.stats().has_metrics);
    assert_eq!(session.metrics().map(|m| m.total_words), Some(2));

    // The clip encodes as a WAV buffer.
    let wav = session.wav_bytes()?;
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");

    // Review playback over the finished clip.
    session.play()?;
    let position = session.playback().position()?;
    assert!(position >= 0.0);
    session.playback().pause()?;
    session.playback().resume()?;
    session.playback().stop()?;

    Ok(())
}

#[tokio::test]
async fn playback_requires_a_clip() {
    let session = session(Vec::new());
    assert_eq!(session.play().unwrap_err(), CoachError::NotPlaying);
}

#[tokio::test]
async fn wav_bytes_require_a_clip() {
    let session = session(Vec::new());
    assert_eq!(session.wav_bytes().unwrap_err(), CoachError::NotRecording);
}

#[tokio::test]
async fn clip_levels_feed_the_pipeline() -> Result<()> {
    let session = session(chunks(2));
    session.request_permission().await;
    session.start().await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    session.stop().await?;

    let levels = session.clip_levels().expect("levels from the clip");
    assert_eq!(levels.len(), 2 * 1600);
    // Constant 0.3 maps above the byte center.
    assert!(levels.iter().all(|&v| v > 128));
    Ok(())
}
