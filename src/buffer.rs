//! Bounded circular time-series storage
//!
//! Fixed-capacity ring of timestamped scalar samples. Once full, each push
//! silently evicts the oldest entry. One buffer exists per active stream
//! and is discarded when the stream stops; it is never resized.

use crate::error::EngineError;
use crate::types::Sample;

/// Fixed-capacity circular buffer of [`Sample`]s.
#[derive(Debug, Clone)]
pub struct BoundedSeriesBuffer {
    samples: Vec<Sample>,
    head: usize,
    filled: bool,
    capacity: usize,
}

impl BoundedSeriesBuffer {
    /// Create a buffer holding at most `capacity` samples.
    ///
    /// Zero capacity is rejected: a buffer that can hold nothing has no
    /// meaningful eviction order.
    pub fn new(capacity: usize) -> Result<Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::InvalidCapacity(capacity));
        }
        Ok(Self {
            samples: Vec::with_capacity(capacity),
            head: 0,
            filled: false,
            capacity,
        })
    }

    /// Store one sample, evicting the oldest when full.
    pub fn push(&mut self, t: i64, v: f64) {
        let sample = Sample { t, v };
        if self.filled {
            self.samples[self.head] = sample;
        } else {
            self.samples.push(sample);
        }
        self.head = (self.head + 1) % self.capacity;
        if !self.filled && self.head == 0 {
            self.filled = true;
        }
    }

    /// Number of samples currently stored.
    pub fn len(&self) -> usize {
        if self.filled {
            self.capacity
        } else {
            self.head
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lazily walk the stored samples in ascending time order.
    ///
    /// The iterator reads the buffer as it is at call time; the borrow
    /// keeps pushes out until the walk is dropped, so a snapshot is never
    /// observed half-written.
    pub fn iter_chronological(&self) -> impl Iterator<Item = Sample> + '_ {
        let len = self.len();
        (0..len).map(move |i| {
            let idx = if self.filled {
                (self.head + i) % self.capacity
            } else {
                i
            };
            self.samples[idx]
        })
    }

    /// Materialized chronological snapshot.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.iter_chronological().collect()
    }

    /// Arithmetic mean of samples with `t >= now_ms - window_ms`.
    ///
    /// An empty window yields 0, not an error.
    pub fn avg_in_window(&self, now_ms: i64, window_ms: i64) -> f64 {
        let start = now_ms - window_ms;
        let mut sum = 0.0;
        let mut count = 0u32;
        for sample in self.iter_chronological() {
            if sample.t >= start {
                sum += sample.v;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Most recent `n` sample values, oldest first.
    pub fn last_values(&self, n: usize) -> Vec<f64> {
        let len = self.len();
        self.iter_chronological()
            .skip(len.saturating_sub(n))
            .map(|s| s.v)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(BoundedSeriesBuffer::new(0).is_err());
    }

    #[test]
    fn test_partial_fill_preserves_order() {
        let mut buf = BoundedSeriesBuffer::new(5).unwrap();
        buf.push(100, 1.0);
        buf.push(200, 2.0);
        buf.push(300, 3.0);

        let times: Vec<i64> = buf.iter_chronological().map(|s| s.t).collect();
        assert_eq!(times, vec![100, 200, 300]);
        assert_eq!(buf.len(), 3);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_overflow_keeps_last_capacity_samples() {
        // Pushing capacity + k samples leaves exactly capacity samples,
        // in ascending time order, equal to the last capacity pushed.
        let capacity = 4;
        let extra = 3;
        let mut buf = BoundedSeriesBuffer::new(capacity).unwrap();
        for i in 0..(capacity + extra) as i64 {
            buf.push(i * 10, i as f64);
        }

        assert_eq!(buf.len(), capacity);
        let snapshot = buf.snapshot();
        let expected: Vec<Sample> = (extra as i64..(capacity + extra) as i64)
            .map(|i| Sample {
                t: i * 10,
                v: i as f64,
            })
            .collect();
        assert_eq!(snapshot, expected);
    }

    #[test]
    fn test_exact_fill_boundary() {
        let mut buf = BoundedSeriesBuffer::new(3).unwrap();
        for i in 0..3 {
            buf.push(i, i as f64);
        }
        assert_eq!(buf.len(), 3);

        buf.push(3, 3.0);
        let times: Vec<i64> = buf.iter_chronological().map(|s| s.t).collect();
        assert_eq!(times, vec![1, 2, 3]);
    }

    #[test]
    fn test_avg_in_window_empty_is_zero() {
        let buf = BoundedSeriesBuffer::new(8).unwrap();
        assert_eq!(buf.avg_in_window(10_000, 5_000), 0.0);
    }

    #[test]
    fn test_avg_in_window_excludes_old_samples() {
        let mut buf = BoundedSeriesBuffer::new(8).unwrap();
        buf.push(1_000, 10.0); // outside window
        buf.push(6_000, 2.0);
        buf.push(7_000, 4.0);

        // Window [5_000, 10_000] covers the last two samples only.
        let avg = buf.avg_in_window(10_000, 5_000);
        assert!((avg - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_avg_in_window_no_qualifying_samples() {
        let mut buf = BoundedSeriesBuffer::new(4).unwrap();
        buf.push(1_000, 1.0);
        buf.push(1_200, 0.0);
        assert_eq!(buf.avg_in_window(10_000, 600), 0.0);
    }

    #[test]
    fn test_last_values() {
        let mut buf = BoundedSeriesBuffer::new(3).unwrap();
        for i in 0..5 {
            buf.push(i, i as f64);
        }
        assert_eq!(buf.last_values(2), vec![3.0, 4.0]);
        // Asking for more than stored returns everything
        assert_eq!(buf.last_values(10), vec![2.0, 3.0, 4.0]);
    }
}
