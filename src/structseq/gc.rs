//! Collector cooperation: the host memory manager drives traversal and is
//! told when instances start and stop being tracked.

use super::record_type::RecordType;
use crate::spooky_value::SpookyValue;
use rustc_hash::FxHashSet;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Process-unique identity of a record instance, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

impl InstanceId {
    pub(crate) fn next() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Something reachable from a record during traversal.
#[derive(Debug, Clone, Copy)]
pub enum Traced<'a> {
    /// The owning type. Only reported for heap-allocated types.
    Type(&'a Arc<RecordType>),
    Value(&'a SpookyValue),
}

/// Reachability protocol used by the host collector.
pub trait Traceable {
    /// Report every owned reference to `visit`, in a fixed order. A `Break`
    /// from the visitor stops traversal and is returned as-is.
    fn traverse(&self, visit: &mut dyn FnMut(Traced<'_>) -> ControlFlow<()>) -> ControlFlow<()>;
}

/// Hooks a host collector installs on a record type at build time.
pub trait Collector: Send + Sync {
    /// Called once an instance is fully initialized.
    fn track(&self, id: InstanceId);
    /// Called first thing during disposal.
    fn untrack(&self, id: InstanceId);
}

/// Collector for hosts that rely on reference counting alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCollector;

impl Collector for NoopCollector {
    #[inline]
    fn track(&self, _id: InstanceId) {}

    #[inline]
    fn untrack(&self, _id: InstanceId) {}
}

/// Keeps the set of live instances plus running totals.
#[derive(Debug, Default)]
pub struct TrackingCollector {
    live: Mutex<FxHashSet<InstanceId>>,
    tracked: AtomicUsize,
    untracked: AtomicUsize,
}

impl TrackingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, id: InstanceId) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn tracked_total(&self) -> usize {
        self.tracked.load(Ordering::Acquire)
    }

    pub fn untracked_total(&self) -> usize {
        self.untracked.load(Ordering::Acquire)
    }
}

impl Collector for TrackingCollector {
    fn track(&self, id: InstanceId) {
        let inserted = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        debug_assert!(inserted, "instance {id:?} tracked twice");
        self.tracked.fetch_add(1, Ordering::AcqRel);
    }

    fn untrack(&self, id: InstanceId) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        debug_assert!(removed, "instance {id:?} untracked without being tracked");
        self.untracked.fetch_add(1, Ordering::AcqRel);
    }
}
