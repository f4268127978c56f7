// Visualization-context lifecycle tracking
//
// The host creates platform drawing contexts on request; this registry
// tracks them as arena slots behind opaque ids, flags long-idle handles,
// and force-releases handles under memory pressure. It owns no audio or
// drawing state of its own.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::pipeline::{self, RenderRequest, Viewport, VisualizationKind};
use super::primitives::DrawOp;
use super::quality::{DeviceProfile, QualityTier};
use crate::error::{CoachError, Result};

/// Opaque handle to a tracked visualization context (arena index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(u32);

#[derive(Debug)]
struct Slot {
    created_at: Instant,
    last_used_at: Instant,
    width: u32,
    height: u32,
    released: bool,
}

/// Registry tunables.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Idle span after which a live handle draws a leak warning.
    pub idle_warning: Duration,
    /// Cadence of the periodic sweep.
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_warning: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Arena of tracked context handles.
#[derive(Debug)]
pub struct ContextRegistry {
    config: RegistryConfig,
    slots: Mutex<Vec<Slot>>,
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl ContextRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Track a newly created context handle.
    pub fn register(&self, width: u32, height: u32) -> ContextId {
        let mut slots = self.slots.lock().expect("context arena lock");
        let now = Instant::now();
        slots.push(Slot {
            created_at: now,
            last_used_at: now,
            width,
            height,
            released: false,
        });
        ContextId((slots.len() - 1) as u32)
    }

    /// Refresh the handle's last-used time. Called on every draw.
    pub fn touch(&self, id: ContextId) -> Result<()> {
        let mut slots = self.slots.lock().expect("context arena lock");
        match slots.get_mut(id.0 as usize) {
            Some(slot) if !slot.released => {
                slot.last_used_at = Instant::now();
                Ok(())
            }
            _ => Err(CoachError::ContextReleased),
        }
    }

    /// Release a handle. Idempotent; unknown or already-released handles
    /// are ignored.
    pub fn release(&self, id: ContextId) {
        let mut slots = self.slots.lock().expect("context arena lock");
        if let Some(slot) = slots.get_mut(id.0 as usize) {
            slot.released = true;
        }
    }

    /// Number of live (not yet released) handles.
    pub fn live_count(&self) -> usize {
        let slots = self.slots.lock().expect("context arena lock");
        slots.iter().filter(|s| !s.released).count()
    }

    /// One sweep round: warn about handles idle past the threshold.
    ///
    /// Observational only; nothing is released. Uses `try_lock` so the
    /// periodic sweep never blocks a concurrent draw, skipping the round
    /// under contention.
    pub fn sweep(&self) -> Vec<ContextId> {
        let slots = match self.slots.try_lock() {
            Ok(slots) => slots,
            Err(_) => return Vec::new(),
        };

        let now = Instant::now();
        let mut stale = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            if slot.released {
                continue;
            }
            let idle = now.saturating_duration_since(slot.last_used_at);
            if idle > self.config.idle_warning {
                warn!(
                    "visualization context {} ({}x{}, alive {:?}) idle for {:?}, possible leak",
                    index,
                    slot.width,
                    slot.height,
                    now.saturating_duration_since(slot.created_at),
                    idle
                );
                stale.push(ContextId(index as u32));
            }
        }
        stale
    }

    /// Critical memory pressure: force-release half of the live handles
    /// in creation order and report which ones went away.
    pub fn on_memory_pressure(&self) -> Vec<ContextId> {
        let mut slots = self.slots.lock().expect("context arena lock");
        let live = slots.iter().filter(|s| !s.released).count();
        let to_release = live / 2;

        let mut released = Vec::with_capacity(to_release);
        for (index, slot) in slots.iter_mut().enumerate() {
            if released.len() == to_release {
                break;
            }
            if !slot.released {
                slot.released = true;
                released.push(ContextId(index as u32));
            }
        }

        info!(
            "memory pressure: released {} of {} visualization contexts",
            released.len(),
            live
        );
        released
    }

    /// Run [`Self::sweep`] on a fixed interval until the task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(registry.config.sweep_interval);
            loop {
                interval.tick().await;
                registry.sweep();
            }
        })
    }
}

/// Couples the context registry to the render pipeline: every draw
/// touches the handle first, so draws against released handles fail with
/// [`CoachError::ContextReleased`] instead of leaking work.
pub struct VisualizationService {
    registry: Arc<ContextRegistry>,
    device: Option<DeviceProfile>,
}

impl VisualizationService {
    pub fn new(registry: Arc<ContextRegistry>, device: Option<DeviceProfile>) -> Self {
        Self { registry, device }
    }

    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    /// Ask the host for a context of the given size and track it.
    pub fn create_context(&self, width: u32, height: u32) -> ContextId {
        self.registry.register(width, height)
    }

    /// Render against a tracked context.
    pub fn render(
        &self,
        context: ContextId,
        samples: &[u8],
        viewport: Viewport,
        kind: VisualizationKind,
        tier: Option<QualityTier>,
        visible: bool,
    ) -> Result<Vec<DrawOp>> {
        self.registry.touch(context)?;
        Ok(pipeline::render(&RenderRequest {
            samples,
            viewport,
            kind,
            tier,
            device: self.device.as_ref(),
            visible,
        }))
    }

    pub fn release(&self, context: ContextId) {
        self.registry.release(context);
    }
}
