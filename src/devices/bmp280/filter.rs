//! Limiting average filter for the pressure output.
//!
//! A ring of the last `N` accepted pressure values. New samples only enter
//! the ring if they are within `threshold` of the most recently accepted
//! value, which suppresses short spikes (e.g. someone breathing on the
//! sensor). The output is the mean of the whole ring.
//!
//! Until the ring is full the filter passes inputs straight through.
//!
//! # Example
//!
//! ```rust
//! use rubik_i2c::devices::bmp280::LimitingAverageFilter;
//!
//! let mut filter = LimitingAverageFilter::<5>::default();
//! for _ in 0..5 {
//!     assert_eq!(filter.apply(1000.0), 1000.0);
//! }
//!
//! // A 5 hPa jump is rejected; the output stays at the old mean
//! assert_eq!(filter.apply(1005.0), 1000.0);
//! ```

/// Default ring length.
pub const DEFAULT_FILTER_LEN: usize = 5;

/// Default accept/reject threshold in hPa.
pub const DEFAULT_THRESHOLD_HPA: f32 = 0.1;

/// Per-device smoothing state (ring buffer, cursor and threshold).
#[derive(Clone, Debug, PartialEq)]
pub struct LimitingAverageFilter<const N: usize = DEFAULT_FILTER_LEN> {
    buf: [f32; N],
    cursor: usize,
    threshold: f32,
}

impl<const N: usize> Default for LimitingAverageFilter<N> {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_HPA)
    }
}

impl<const N: usize> LimitingAverageFilter<N> {
    /// Creates an empty filter with the given rejection threshold.
    pub const fn new(threshold: f32) -> Self {
        assert!(N > 0, "filter length must be non-zero");
        Self {
            buf: [0.0; N],
            cursor: 0,
            threshold,
        }
    }

    /// Feeds one sample and returns the filtered value.
    pub fn apply(&mut self, input: f32) -> f32 {
        // 0.0 marks a slot that has never been written
        if self.buf[self.cursor] == 0.0 {
            self.buf[self.cursor] = input;
            self.advance();
            return input;
        }

        let prev = if self.cursor == 0 { N - 1 } else { self.cursor - 1 };
        let delta = input - self.buf[prev];
        if delta.abs() < self.threshold {
            self.buf[self.cursor] = input;
            self.advance();
        } else {
            log::trace!("pressure sample {} rejected (delta {})", input, delta);
        }

        self.mean()
    }

    /// Mean of all slots.
    pub fn mean(&self) -> f32 {
        let sum: f64 = self.buf.iter().map(|&v| f64::from(v)).sum();
        (sum / N as f64) as f32
    }

    /// Current ring contents.
    pub fn buffer(&self) -> &[f32; N] {
        &self.buf
    }

    /// Slot the next accepted sample goes into.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rejection threshold in hPa.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Empties the ring; the next `N` samples pass through again.
    pub fn reset(&mut self) {
        self.buf = [0.0; N];
        self.cursor = 0;
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= N {
            self.cursor = 0;
        }
    }
}
