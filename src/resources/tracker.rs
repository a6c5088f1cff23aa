//! GPU Residency Tracking
//!
//! Every scene object that would own device memory (shadow maps, model buffers, clip
//! evaluators, the runtime instance, the ground plane) holds a [`GpuAllocation`].
//!
//! # Design Principles
//! - An allocation is uniquely owned; dropping it releases it, so a failed or abandoned build
//!   cannot leak device memory even when its results are discarded mid-join
//! - The tracker is cheap to clone and shared by every allocation it handed out
//! - `live_count() == 0` after `dispose()` is the observable that teardown is complete

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// What an allocation backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuResourceKind {
    ShadowMap,
    ModelBuffers,
    ClipEvaluator,
    RuntimeInstance,
    GroundPlane,
}

#[derive(Debug, Default)]
struct TrackerInner {
    live: AtomicU32,
    live_bytes: AtomicU64,
    allocated_total: AtomicU64,
    by_kind: Mutex<FxHashMap<GpuResourceKind, u32>>,
}

impl TrackerInner {
    fn release(&self, kind: GpuResourceKind, bytes: u64) {
        self.live.fetch_sub(1, Ordering::AcqRel);
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
        let mut by_kind = self.by_kind.lock();
        if let Some(count) = by_kind.get_mut(&kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                by_kind.remove(&kind);
            }
        }
    }
}

/// Shared counter of live device allocations.
#[derive(Clone, Default)]
pub struct GpuResourceTracker {
    inner: Arc<TrackerInner>,
}

impl fmt::Debug for GpuResourceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuResourceTracker")
            .field("live", &self.live_count())
            .field("live_bytes", &self.live_bytes())
            .finish()
    }
}

impl GpuResourceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new allocation of `bytes` and returns its owning token.
    #[must_use]
    pub fn allocate(&self, kind: GpuResourceKind, label: impl Into<String>, bytes: u64) -> GpuAllocation {
        self.inner.live.fetch_add(1, Ordering::AcqRel);
        self.inner.live_bytes.fetch_add(bytes, Ordering::AcqRel);
        self.inner.allocated_total.fetch_add(1, Ordering::Relaxed);
        *self.inner.by_kind.lock().entry(kind).or_insert(0) += 1;

        GpuAllocation {
            id: Uuid::new_v4(),
            kind,
            label: label.into(),
            bytes,
            tracker: Arc::clone(&self.inner),
        }
    }

    #[inline]
    #[must_use]
    pub fn live_count(&self) -> u32 {
        self.inner.live.load(Ordering::Acquire)
    }

    #[inline]
    #[must_use]
    pub fn live_bytes(&self) -> u64 {
        self.inner.live_bytes.load(Ordering::Acquire)
    }

    /// Number of allocations ever made, including released ones.
    #[inline]
    #[must_use]
    pub fn allocated_total(&self) -> u64 {
        self.inner.allocated_total.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn live_of(&self, kind: GpuResourceKind) -> u32 {
        self.inner.by_kind.lock().get(&kind).copied().unwrap_or(0)
    }
}

/// Owning token for one device allocation. Released on drop.
pub struct GpuAllocation {
    id: Uuid,
    kind: GpuResourceKind,
    label: String,
    bytes: u64,
    tracker: Arc<TrackerInner>,
}

impl GpuAllocation {
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> GpuResourceKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Releases the allocation now. Equivalent to dropping it.
    pub fn release(self) {
        log::trace!("Releasing {:?} allocation '{}'", self.kind, self.label);
    }
}

impl Drop for GpuAllocation {
    fn drop(&mut self) {
        self.tracker.release(self.kind, self.bytes);
    }
}

impl fmt::Debug for GpuAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuAllocation")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_releases() {
        let tracker = GpuResourceTracker::new();
        let a = tracker.allocate(GpuResourceKind::ShadowMap, "shadow", 1024);
        let b = tracker.allocate(GpuResourceKind::GroundPlane, "ground", 16);
        assert_eq!(tracker.live_count(), 2);
        assert_eq!(tracker.live_bytes(), 1040);

        drop(a);
        assert_eq!(tracker.live_count(), 1);
        assert_eq!(tracker.live_of(GpuResourceKind::ShadowMap), 0);

        b.release();
        assert_eq!(tracker.live_count(), 0);
        assert_eq!(tracker.live_bytes(), 0);
        assert_eq!(tracker.allocated_total(), 2);
    }
}
