//! Fixed-capacity rolling buffer for audio samples.
//!
//! When an append would exceed `capacity`, the oldest elements are evicted
//! so the most-recent `capacity` elements are always available in arrival
//! order.  The same type backs both the raw sample history and the decimated
//! visualization series.
//!
//! # Example
//!
//! ```rust
//! use audio_recorder::audio::RollingBuffer;
//!
//! let mut buf = RollingBuffer::new(5).unwrap();
//! buf.append(&[1.0, 2.0, 3.0]);
//! buf.append(&[4.0, 5.0, 6.0, 7.0]); // 7 items → capacity 5 → two oldest dropped
//! assert_eq!(buf.snapshot(), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
//! ```

use std::collections::VecDeque;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// RollingBuffer
// ---------------------------------------------------------------------------

/// A fixed-capacity, oldest-first-evicting buffer.
///
/// ## Overflow behaviour
///
/// [`append`](Self::append) costs O(batch length): elements are evicted from
/// the front of a `VecDeque` and a batch larger than the whole buffer only
/// copies its own tail.  Storage is allocated once at construction and never
/// grows past `capacity`.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RollingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] when `capacity == 0`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append `batch` in order, then evict from the front until
    /// `len() <= capacity`.
    pub fn append(&mut self, batch: &[T]) {
        if batch.len() >= self.capacity {
            // Everything currently stored would be evicted anyway.
            self.items.clear();
            self.items.extend(batch[batch.len() - self.capacity..].iter().cloned());
            return;
        }

        let overflow = (self.items.len() + batch.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.items.drain(..overflow);
        }
        self.items.extend(batch.iter().cloned());
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Discard all elements.  Capacity and storage are kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of elements currently stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of elements the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` when the next append will evict.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Span of the stored window in seconds at `sample_rate` Hz.
    pub fn duration_secs(&self, sample_rate: f64) -> f64 {
        if sample_rate <= 0.0 || !sample_rate.is_finite() {
            return 0.0;
        }
        self.items.len() as f64 / sample_rate
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
