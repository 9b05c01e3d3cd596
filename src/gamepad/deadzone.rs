//! # Deadzone Module
//!
//! Suppresses analog stick noise around the rest position.
//!
//! Values whose magnitude is below the threshold collapse to exactly `0.0`.
//! Everything at or above the threshold passes through untouched: the
//! remaining range is *not* rescaled, so a stick pushed to `0.5` still reads
//! `0.5`. Because zero stays zero and surviving values are unchanged, the
//! filter is idempotent.
//!
//! ## Usage
//!
//! ```
//! use skyline_input::gamepad::deadzone::DeadzoneFilter;
//!
//! let filter = DeadzoneFilter::default(); // 0.12 threshold
//!
//! assert_eq!(filter.apply(0.05), 0.0);
//! assert_eq!(filter.apply(-0.11), 0.0);
//! assert_eq!(filter.apply(0.5), 0.5);
//! ```

/// Default deadzone threshold for analog sticks.
pub const DEFAULT_DEADZONE: f32 = 0.12;

/// Largest threshold accepted from configuration.
pub const MAX_DEADZONE: f32 = 0.5;

/// Zeroes analog values whose magnitude falls inside the deadzone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadzoneFilter {
    threshold: f32,
}

impl Default for DeadzoneFilter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DEADZONE,
        }
    }
}

impl DeadzoneFilter {
    /// Creates a filter with the given threshold.
    ///
    /// The threshold is clamped to `0.0..=0.5`; a threshold of `0.0` lets
    /// every value through.
    ///
    /// # Examples
    ///
    /// ```
    /// use skyline_input::gamepad::deadzone::DeadzoneFilter;
    ///
    /// let filter = DeadzoneFilter::new(0.2);
    /// assert_eq!(filter.apply(0.19), 0.0);
    /// assert_eq!(filter.apply(0.2), 0.2);
    /// ```
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, MAX_DEADZONE),
        }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Applies the deadzone to a single axis value.
    #[must_use]
    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        apply_deadzone(value, self.threshold)
    }
}

/// Free-function form of [`DeadzoneFilter::apply`].
///
/// Returns exactly `0.0` when `|value| < threshold`, otherwise `value`.
#[must_use]
#[inline]
pub fn apply_deadzone(value: f32, threshold: f32) -> f32 {
    if value.abs() < threshold {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold() {
        assert_eq!(DeadzoneFilter::default().threshold(), 0.12);
    }

    #[test]
    fn test_values_inside_deadzone_are_zeroed() {
        let filter = DeadzoneFilter::default();
        for v in [0.0, 0.01, -0.01, 0.0599, 0.1199, -0.1199] {
            assert_eq!(filter.apply(v), 0.0, "value {} should be suppressed", v);
        }
    }

    #[test]
    fn test_values_at_or_outside_deadzone_pass_through() {
        let filter = DeadzoneFilter::default();
        for v in [0.12, -0.12, 0.3, -0.75, 1.0, -1.0] {
            assert_eq!(filter.apply(v), v, "value {} should be unchanged", v);
        }
    }

    #[test]
    fn test_no_rescaling_above_threshold() {
        let filter = DeadzoneFilter::new(0.25);
        assert_eq!(filter.apply(0.26), 0.26);
        assert_eq!(filter.apply(-0.9), -0.9);
    }

    #[test]
    fn test_idempotent() {
        let filter = DeadzoneFilter::default();
        let mut v = -1.0_f32;
        while v <= 1.0 {
            let once = filter.apply(v);
            assert_eq!(filter.apply(once), once);
            v += 0.01;
        }
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(DeadzoneFilter::new(-0.3).threshold(), 0.0);
        assert_eq!(DeadzoneFilter::new(0.9).threshold(), MAX_DEADZONE);
    }

    #[test]
    fn test_zero_threshold_passes_everything() {
        let filter = DeadzoneFilter::new(0.0);
        assert_eq!(filter.apply(0.001), 0.001);
        assert_eq!(filter.apply(0.0), 0.0);
    }

    #[test]
    fn test_free_function_matches_filter() {
        assert_eq!(apply_deadzone(0.1, 0.12), 0.0);
        assert_eq!(apply_deadzone(0.4, 0.12), 0.4);
    }
}
