//! Allocator-tagged buffers and resource accounting.
//!
//! Arrays returned by query terminals are [`NativeArray`]s: an owned buffer
//! remembering which [`Allocator`] it came from. The world's
//! [`ResourceTracker`] counts live arrays and live query scopes, and both are
//! released by `Drop`, so every exit path gives the resource back.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Allocation strategy for a [`NativeArray`].
///
/// The strategies differ only in intended lifetime; all of them are tracked
/// separately so leaks can be attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allocator {
    /// Scratch memory, released within the same call.
    Temp,
    /// Memory that outlives one call but not one frame.
    TempJob,
    /// Memory owned until explicitly released.
    #[default]
    Persistent,
}

impl Allocator {
    /// Every allocator, in tracking order.
    pub const ALL: [Allocator; 3] = [Allocator::Temp, Allocator::TempJob, Allocator::Persistent];

    /// The `snake_case` name of the allocator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Allocator::Temp => "temp",
            Allocator::TempJob => "temp_job",
            Allocator::Persistent => "persistent",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Allocator::Temp => 0,
            Allocator::TempJob => 1,
            Allocator::Persistent => 2,
        }
    }
}

impl fmt::Display for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown allocator name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown allocator '{0}' (expected temp, temp_job or persistent)")]
pub struct ParseAllocatorError(pub String);

impl FromStr for Allocator {
    type Err = ParseAllocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "temp" => Ok(Allocator::Temp),
            "temp_job" | "tempjob" => Ok(Allocator::TempJob),
            "persistent" => Ok(Allocator::Persistent),
            _ => Err(ParseAllocatorError(s.to_string())),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    queries: AtomicUsize,
    arrays: [AtomicUsize; 3],
}

/// Shared counters for live query scopes and native arrays.
///
/// Cloning yields a handle to the same counters.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    inner: Arc<Counters>,
}

impl ResourceTracker {
    /// Create a tracker with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn query_opened(&self) {
        self.inner.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn query_closed(&self) {
        self.inner.queries.fetch_sub(1, Ordering::Relaxed);
    }

    fn array_allocated(&self, allocator: Allocator) {
        self.inner.arrays[allocator.slot()].fetch_add(1, Ordering::Relaxed);
    }

    fn array_released(&self, allocator: Allocator) {
        self.inner.arrays[allocator.slot()].fetch_sub(1, Ordering::Relaxed);
    }

    /// A snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> ResourceStats {
        let arrays = |a: Allocator| self.inner.arrays[a.slot()].load(Ordering::Relaxed);
        ResourceStats {
            live_queries: self.inner.queries.load(Ordering::Relaxed),
            temp_arrays: arrays(Allocator::Temp),
            temp_job_arrays: arrays(Allocator::TempJob),
            persistent_arrays: arrays(Allocator::Persistent),
        }
    }
}

/// Point-in-time resource counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceStats {
    /// Query scopes that have been created and not yet dropped.
    pub live_queries: usize,
    /// Live arrays allocated with [`Allocator::Temp`].
    pub temp_arrays: usize,
    /// Live arrays allocated with [`Allocator::TempJob`].
    pub temp_job_arrays: usize,
    /// Live arrays allocated with [`Allocator::Persistent`].
    pub persistent_arrays: usize,
}

impl ResourceStats {
    /// Live arrays across all allocators.
    #[must_use]
    pub fn live_arrays(&self) -> usize {
        self.temp_arrays + self.temp_job_arrays + self.persistent_arrays
    }

    /// Live arrays for one allocator.
    #[must_use]
    pub fn live_arrays_for(&self, allocator: Allocator) -> usize {
        match allocator {
            Allocator::Temp => self.temp_arrays,
            Allocator::TempJob => self.temp_job_arrays,
            Allocator::Persistent => self.persistent_arrays,
        }
    }

    /// Returns `true` when no query scope or array is live.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.live_queries == 0 && self.live_arrays() == 0
    }
}

/// An owned buffer tagged with the allocator it was created with.
///
/// The allocation is released exactly once: on [`NativeArray::dispose`],
/// on [`NativeArray::into_vec`], or when the array is dropped.
pub struct NativeArray<T> {
    data: Vec<T>,
    allocator: Allocator,
    tracker: ResourceTracker,
}

impl<T> NativeArray<T> {
    /// Wrap `data` as a tracked allocation.
    pub fn new(data: Vec<T>, allocator: Allocator, tracker: &ResourceTracker) -> Self {
        tracker.array_allocated(allocator);
        trace!(len = data.len(), %allocator, "native array allocated");
        Self {
            data,
            allocator,
            tracker: tracker.clone(),
        }
    }

    /// The allocator this array was created with.
    #[must_use]
    pub fn allocator(&self) -> Allocator {
        self.allocator
    }

    /// Move the elements out, releasing the allocation.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<T> {
        std::mem::take(&mut self.data)
    }

    /// Release the allocation.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<T: Clone> NativeArray<T> {
    /// Copy the elements into a plain `Vec`, keeping this array alive.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }
}

impl<T> Deref for NativeArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for NativeArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for NativeArray<T> {
    fn drop(&mut self) {
        self.tracker.array_released(self.allocator);
        trace!(allocator = %self.allocator, "native array released");
    }
}

impl<T: fmt::Debug> fmt::Debug for NativeArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeArray")
            .field("allocator", &self.allocator)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_parse() {
        assert_eq!("temp".parse::<Allocator>(), Ok(Allocator::Temp));
        assert_eq!("TempJob".parse::<Allocator>(), Ok(Allocator::TempJob));
        assert_eq!("temp-job".parse::<Allocator>(), Ok(Allocator::TempJob));
        assert_eq!(" Persistent ".parse::<Allocator>(), Ok(Allocator::Persistent));
        assert!("heap".parse::<Allocator>().is_err());
    }

    #[test]
    fn test_allocator_display_matches_serde() {
        for allocator in Allocator::ALL {
            let json = serde_json::to_string(&allocator).unwrap();
            assert_eq!(json, format!("\"{allocator}\""));
        }
    }

    #[test]
    fn test_drop_releases_allocation() {
        let tracker = ResourceTracker::new();
        let array = NativeArray::new(vec![1, 2, 3], Allocator::Persistent, &tracker);
        assert_eq!(tracker.stats().persistent_arrays, 1);
        assert_eq!(&*array, &[1, 2, 3]);
        drop(array);
        assert!(tracker.stats().is_idle());
    }

    #[test]
    fn test_into_vec_releases_once() {
        let tracker = ResourceTracker::new();
        let array = NativeArray::new(vec!['a', 'b'], Allocator::Temp, &tracker);
        assert_eq!(tracker.stats().live_arrays_for(Allocator::Temp), 1);
        let values = array.into_vec();
        assert_eq!(values, vec!['a', 'b']);
        assert_eq!(tracker.stats(), ResourceStats::default());
    }

    #[test]
    fn test_to_vec_keeps_array_alive() {
        let tracker = ResourceTracker::new();
        let array = NativeArray::new(vec![7u8], Allocator::TempJob, &tracker);
        assert_eq!(array.to_vec(), vec![7u8]);
        assert_eq!(tracker.stats().temp_job_arrays, 1);
        array.dispose();
        assert_eq!(tracker.stats().live_arrays(), 0);
    }

    #[test]
    fn test_counters_are_per_allocator() {
        let tracker = ResourceTracker::new();
        let a = NativeArray::new(Vec::<u32>::new(), Allocator::Temp, &tracker);
        let b = NativeArray::new(Vec::<u32>::new(), Allocator::Persistent, &tracker);
        let stats = tracker.stats();
        assert_eq!(stats.temp_arrays, 1);
        assert_eq!(stats.temp_job_arrays, 0);
        assert_eq!(stats.persistent_arrays, 1);
        assert_eq!(stats.live_arrays(), 2);
        drop((a, b));
        assert!(tracker.stats().is_idle());
    }
}
