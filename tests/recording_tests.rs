// Integration tests for the recording state machine
//
// These drive the controller against the scripted capture backend and
// verify the documented transitions, failures and signals.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use speech_coach::audio::AudioChunk;
use speech_coach::{
    CoachError, HostSignals, RecorderOptions, RecorderPhase, RecordingController, ScriptedCapture,
};

fn chunks(count: usize, level: f32) -> Vec<AudioChunk> {
    (0..count)
        .map(|i| ScriptedCapture::constant_chunk(level, 1600, 16000, i as u64 * 100))
        .collect()
}

fn controller(chunks: Vec<AudioChunk>, options: RecorderOptions) -> (RecordingController, Arc<HostSignals>) {
    let host = HostSignals::new();
    let backend = ScriptedCapture::new(chunks);
    let controller = RecordingController::new(Box::new(backend), Arc::clone(&host), options);
    (controller, host)
}

#[tokio::test]
async fn start_without_permission_is_denied() {
    let (controller, _host) = controller(Vec::new(), RecorderOptions::default());
    assert_eq!(
        controller.start().await.unwrap_err(),
        CoachError::PermissionDenied
    );
    assert_eq!(controller.phase(), RecorderPhase::Idle);
}

#[tokio::test]
async fn denied_access_keeps_start_failing() {
    let host = HostSignals::new();
    let backend = ScriptedCapture::new(Vec::new()).with_access(false);
    let controller =
        RecordingController::new(Box::new(backend), host, RecorderOptions::default());

    assert!(!controller.request_permission().await);
    assert_eq!(
        controller.start().await.unwrap_err(),
        CoachError::PermissionDenied
    );
}

#[tokio::test]
async fn permission_request_is_idempotent() {
    let (controller, _host) = controller(Vec::new(), RecorderOptions::default());
    assert!(controller.request_permission().await);
    assert!(controller.request_permission().await);
    assert_eq!(controller.phase(), RecorderPhase::Idle);
}

#[tokio::test]
async fn second_start_yields_already_recording() -> Result<()> {
    let (controller, _host) = controller(chunks(3, 0.5), RecorderOptions::default());
    controller.request_permission().await;
    controller.start().await?;

    assert_eq!(
        controller.start().await.unwrap_err(),
        CoachError::AlreadyRecording
    );
    // State unchanged by the failed call.
    assert_eq!(controller.phase(), RecorderPhase::Recording);
    assert!(controller.state().is_recording);

    controller.cancel().await;
    Ok(())
}

#[tokio::test]
async fn backgrounded_start_is_restricted() {
    let (controller, host) = controller(chunks(1, 0.5), RecorderOptions::default());
    controller.request_permission().await;
    host.set_backgrounded(true);

    assert_eq!(
        controller.start().await.unwrap_err(),
        CoachError::BackgroundRestricted
    );
}

#[tokio::test]
async fn stop_without_start_fails() {
    let (controller, _host) = controller(Vec::new(), RecorderOptions::default());
    assert_eq!(
        controller.stop().await.unwrap_err(),
        CoachError::NotRecording
    );
}

#[tokio::test]
async fn stop_returns_the_concatenated_clip() -> Result<()> {
    let (controller, _host) = controller(chunks(5, 0.4), RecorderOptions::default());
    controller.request_permission().await;
    controller.start().await?;

    // Let the scripted chunks flow through the capture task.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let clip = controller.stop().await?;
    assert_eq!(clip.samples.len(), 5 * 1600);
    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.channels, 1);
    assert!((clip.duration_seconds() - 0.5).abs() < 1e-9);

    let state = controller.state();
    assert!(!state.is_recording);
    assert!(!state.is_processing);
    assert_eq!(controller.phase(), RecorderPhase::Idle);
    Ok(())
}

#[tokio::test]
async fn level_is_seeded_from_the_first_window() -> Result<()> {
    let (controller, _host) = controller(chunks(2, 0.5), RecorderOptions::default());
    controller.request_permission().await;
    controller.start().await?;

    tokio::time::sleep(Duration::from_millis(300)).await;
    let state = controller.state();
    assert!((state.audio_level - 0.5).abs() < 1e-3);

    controller.cancel().await;
    Ok(())
}

#[tokio::test]
async fn pause_and_resume_transition_correctly() -> Result<()> {
    let (controller, _host) = controller(chunks(2, 0.5), RecorderOptions::default());
    controller.request_permission().await;
    controller.start().await?;

    controller.pause()?;
    assert_eq!(controller.phase(), RecorderPhase::Paused);
    assert!(!controller.state().is_recording);

    // Pausing twice is invalid.
    assert_eq!(controller.pause().unwrap_err(), CoachError::NotRecording);

    controller.resume()?;
    assert_eq!(controller.phase(), RecorderPhase::Recording);
    assert!(controller.state().is_recording);

    controller.cancel().await;
    Ok(())
}

#[tokio::test]
async fn resume_while_backgrounded_is_restricted() -> Result<()> {
    let (controller, host) = controller(chunks(2, 0.5), RecorderOptions::default());
    controller.request_permission().await;
    controller.start().await?;
    controller.pause()?;

    host.set_backgrounded(true);
    assert_eq!(
        controller.resume().unwrap_err(),
        CoachError::BackgroundRestricted
    );
    assert_eq!(controller.phase(), RecorderPhase::Paused);

    controller.cancel().await;
    Ok(())
}

#[tokio::test]
async fn cancel_discards_everything() -> Result<()> {
    let (controller, _host) = controller(chunks(4, 0.5), RecorderOptions::default());
    controller.request_permission().await;
    controller.start().await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    controller.cancel().await;

    assert_eq!(controller.phase(), RecorderPhase::Idle);
    assert_eq!(controller.state().error, None);
    assert_eq!(
        controller.stop().await.unwrap_err(),
        CoachError::NotRecording
    );
    Ok(())
}

#[tokio::test]
async fn cancel_when_idle_is_harmless() {
    let (controller, _host) = controller(Vec::new(), RecorderOptions::default());
    controller.cancel().await;
    assert_eq!(controller.phase(), RecorderPhase::Idle);
}

#[tokio::test]
async fn interruption_forces_idle_with_error() -> Result<()> {
    let (controller, _host) = controller(chunks(3, 0.5), RecorderOptions::default());
    controller.request_permission().await;
    controller.start().await?;
    tokio::time::sleep(Duration::from_millis(150)).await;

    controller.signal_interruption();

    let state = controller.state();
    assert_eq!(state.error, Some(CoachError::RecordingInterrupted));
    assert!(!state.is_recording);
    assert_eq!(controller.phase(), RecorderPhase::Idle);

    // The forced exit also means there is nothing left to stop.
    assert_eq!(
        controller.stop().await.unwrap_err(),
        CoachError::NotRecording
    );

    // Give the deferred device release a moment before the runtime drops.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

#[tokio::test]
async fn auto_stop_parks_the_clip_at_the_limit() -> Result<()> {
    let options = RecorderOptions {
        max_duration: Some(Duration::from_millis(300)),
        auto_stop: true,
        ..RecorderOptions::default()
    };
    let (controller, _host) = controller(chunks(3, 0.5), options);
    controller.request_permission().await;
    controller.start().await?;

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(controller.phase(), RecorderPhase::Idle);
    let clip = controller.take_finished().expect("auto-stop parks the clip");
    assert_eq!(clip.samples.len(), 3 * 1600);
    // Taking the clip transfers ownership; a second take finds nothing.
    assert!(controller.take_finished().is_none());
    Ok(())
}

#[tokio::test]
async fn silence_latches_after_the_hold_window() -> Result<()> {
    let options = RecorderOptions {
        silence_threshold: 0.05,
        silence_hold: Duration::from_millis(100),
        ..RecorderOptions::default()
    };
    let (controller, _host) = controller(chunks(2, 0.0), options);
    controller.request_permission().await;
    controller.start().await?;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(controller.state().is_silent);

    controller.stop().await?;
    Ok(())
}

#[tokio::test]
async fn loud_input_never_reports_silence() -> Result<()> {
    let options = RecorderOptions {
        silence_threshold: 0.05,
        silence_hold: Duration::from_millis(100),
        ..RecorderOptions::default()
    };
    let (controller, _host) = controller(chunks(2, 0.5), options);
    controller.request_permission().await;
    controller.start().await?;

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!controller.state().is_silent);

    controller.cancel().await;
    Ok(())
}
