// Context lifecycle tests
//
// These verify handle tracking, idempotent release, the idle sweep and
// forced release under memory pressure.

use std::sync::Arc;
use std::time::Duration;

use speech_coach::viz::{
    BarStyle, ContextRegistry, QualityTier, RegistryConfig, Viewport, VisualizationKind,
    VisualizationService,
};
use speech_coach::CoachError;

#[test]
fn touch_works_until_release() {
    let registry = ContextRegistry::default();
    let id = registry.register(300, 150);

    assert!(registry.touch(id).is_ok());
    registry.release(id);
    assert_eq!(registry.touch(id).unwrap_err(), CoachError::ContextReleased);
}

#[test]
fn release_is_idempotent() {
    let registry = ContextRegistry::default();
    let id = registry.register(300, 150);

    registry.release(id);
    registry.release(id);
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn memory_pressure_releases_half_in_creation_order() {
    let registry = ContextRegistry::default();
    let ids: Vec<_> = (0..4).map(|_| registry.register(100, 100)).collect();

    let released = registry.on_memory_pressure();

    // Exactly 2 of 4, and the oldest two at that.
    assert_eq!(released, vec![ids[0], ids[1]]);
    assert_eq!(registry.live_count(), 2);
    assert_eq!(
        registry.touch(ids[0]).unwrap_err(),
        CoachError::ContextReleased
    );
    assert_eq!(
        registry.touch(ids[1]).unwrap_err(),
        CoachError::ContextReleased
    );
    assert!(registry.touch(ids[2]).is_ok());
    assert!(registry.touch(ids[3]).is_ok());
}

#[test]
fn memory_pressure_rounds_down_on_odd_counts() {
    let registry = ContextRegistry::default();
    for _ in 0..5 {
        registry.register(64, 64);
    }

    let released = registry.on_memory_pressure();
    assert_eq!(released.len(), 2);
    assert_eq!(registry.live_count(), 3);
}

#[test]
fn sweep_flags_idle_handles() {
    let registry = ContextRegistry::new(RegistryConfig {
        idle_warning: Duration::from_millis(50),
        sweep_interval: Duration::from_secs(60),
    });

    let idle = registry.register(100, 100);
    let busy = registry.register(100, 100);

    std::thread::sleep(Duration::from_millis(80));
    registry.touch(busy).unwrap();

    let stale = registry.sweep();
    assert_eq!(stale, vec![idle]);

    // Warnings are observational; the handle still works.
    assert!(registry.touch(idle).is_ok());
}

#[test]
fn sweep_ignores_released_handles() {
    let registry = ContextRegistry::new(RegistryConfig {
        idle_warning: Duration::from_millis(20),
        sweep_interval: Duration::from_secs(60),
    });
    let id = registry.register(100, 100);
    registry.release(id);

    std::thread::sleep(Duration::from_millis(40));
    assert!(registry.sweep().is_empty());
}

#[test]
fn service_refuses_draws_on_released_contexts() {
    let service = VisualizationService::new(Arc::new(ContextRegistry::default()), None);
    let ctx = service.create_context(320, 240);
    let samples = vec![150u8; 256];
    let viewport = Viewport {
        width: 320.0,
        height: 240.0,
    };

    let ops = service
        .render(
            ctx,
            &samples,
            viewport,
            VisualizationKind::Frequency(BarStyle::default()),
            Some(QualityTier::Standard),
            true,
        )
        .unwrap();
    assert!(!ops.is_empty());

    service.release(ctx);
    let err = service
        .render(
            ctx,
            &samples,
            viewport,
            VisualizationKind::Frequency(BarStyle::default()),
            Some(QualityTier::Standard),
            true,
        )
        .unwrap_err();
    assert_eq!(err, CoachError::ContextReleased);
}

#[tokio::test]
async fn sweeper_task_runs_until_aborted() {
    let registry = Arc::new(ContextRegistry::new(RegistryConfig {
        idle_warning: Duration::from_millis(10),
        sweep_interval: Duration::from_millis(20),
    }));
    registry.register(32, 32);

    let sweeper = registry.spawn_sweeper();
    tokio::time::sleep(Duration::from_millis(60)).await;
    sweeper.abort();

    // The arena is still consistent after the sweeps.
    assert_eq!(registry.live_count(), 1);
}
