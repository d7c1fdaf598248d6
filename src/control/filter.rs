//! Sliding-window moving average for thermocouple samples.
//!
//! Fixed-capacity ring (no heap) holding the `N` most recent raw samples
//! plus their running sum.  The oldest sample is evicted once the window
//! is full.

use heapless::Deque;

/// Default window length.
pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone)]
pub struct SmoothingFilter<const N: usize = DEFAULT_WINDOW> {
    window: Deque<f32, N>,
    /// Kept in f64 so long firings do not accumulate add/subtract drift.
    sum: f64,
}

impl<const N: usize> SmoothingFilter<N> {
    pub fn new() -> Self {
        const { assert!(N > 0, "smoothing window must hold at least one sample") };
        Self {
            window: Deque::new(),
            sum: 0.0,
        }
    }

    /// Append `raw` and return the mean of the current window.
    ///
    /// With a single sample in the window the output equals the input.
    pub fn add(&mut self, raw: f32) -> f32 {
        if self.window.is_full() {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= f64::from(oldest);
            }
        }
        // Cannot fail: a slot was freed above if the window was full.
        if self.window.push_back(raw).is_ok() {
            self.sum += f64::from(raw);
        }
        self.average().unwrap_or(raw)
    }

    /// Mean of the current window, `None` before the first sample.
    pub fn average(&self) -> Option<f32> {
        if self.window.is_empty() {
            None
        } else {
            Some((self.sum / self.window.len() as f64) as f32)
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.window.clear();
        self.sum = 0.0;
    }
}

impl<const N: usize> Default for SmoothingFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_returns_raw_value() {
        let mut f: SmoothingFilter = SmoothingFilter::new();
        assert!((f.add(812.25) - 812.25).abs() < f32::EPSILON);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn constant_input_for_full_window_returns_constant() {
        let mut f: SmoothingFilter = SmoothingFilter::new();
        let mut out = 0.0;
        for _ in 0..DEFAULT_WINDOW {
            out = f.add(640.5);
        }
        assert!((out - 640.5).abs() < 1e-4);
        assert_eq!(f.len(), f.capacity());
    }

    #[test]
    fn oldest_sample_is_evicted() {
        let mut f: SmoothingFilter<3> = SmoothingFilter::new();
        f.add(100.0);
        f.add(10.0);
        f.add(10.0);
        // 100 falls out of the window here.
        let out = f.add(10.0);
        assert!((out - 10.0).abs() < 1e-5);
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn average_before_first_sample_is_none() {
        let f: SmoothingFilter<4> = SmoothingFilter::new();
        assert!(f.average().is_none());
        assert!(f.is_empty());
    }

    #[test]
    fn clear_empties_window() {
        let mut f: SmoothingFilter<4> = SmoothingFilter::new();
        f.add(1.0);
        f.add(2.0);
        f.clear();
        assert!(f.is_empty());
        assert!((f.add(7.0) - 7.0).abs() < f32::EPSILON);
    }
}
