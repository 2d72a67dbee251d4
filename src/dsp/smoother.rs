//! Parameter Smoother
//!
//! Ramps a scalar control value toward a target over a fixed number of
//! samples so that parameter jumps coming from the control thread never
//! reach the filter as discontinuities.
//!
//! Two ramp shapes are supported:
//! - **Linear**: constant additive step. Used for gain.
//! - **Multiplicative**: constant ratio per step, i.e. linear in the log
//!   domain. Used for frequency, which is perceived logarithmically.
//!
//! ## Audio Thread Safety
//! - `next_value()` and `skip()` never allocate.
//! - `skip()` costs at most one step per remaining ramp sample.

use super::sample::SampleType;

/// Interpolation shape of a [`SmoothedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampKind {
    Linear,
    /// Current and target must be non-zero and share a sign.
    Multiplicative,
}

/// A value that moves toward its target in a fixed number of steps.
#[derive(Debug, Clone, Copy)]
pub struct SmoothedValue<T: SampleType> {
    current: T,
    target: T,
    /// Additive step (linear) or per-sample ratio (multiplicative)
    step: T,
    /// Steps left until `current == target`
    countdown: usize,
    /// Step budget for a full ramp, derived from the ramp time
    steps_to_target: usize,
    kind: RampKind,
}

impl<T: SampleType> SmoothedValue<T> {
    pub fn new(initial: T, kind: RampKind) -> Self {
        debug_assert!(
            kind == RampKind::Linear || initial != T::zero(),
            "multiplicative ramps cannot start at zero"
        );
        Self {
            current: initial,
            target: initial,
            step: Self::idle_step(kind),
            countdown: 0,
            steps_to_target: 0,
            kind,
        }
    }

    pub fn linear(initial: T) -> Self {
        Self::new(initial, RampKind::Linear)
    }

    pub fn multiplicative(initial: T) -> Self {
        Self::new(initial, RampKind::Multiplicative)
    }

    /// Recompute the step budget for a ramp of `ramp_seconds` at `sample_rate`.
    ///
    /// The current value is left untouched. A ramp already in flight restarts
    /// from where it is with the new budget; with a zero budget it completes
    /// immediately.
    pub fn set_ramp_length(&mut self, sample_rate: f64, ramp_seconds: f64) {
        let steps = (ramp_seconds.max(0.0) * sample_rate.max(0.0)).floor();
        self.steps_to_target = if steps.is_finite() { steps as usize } else { 0 };

        if self.countdown > 0 {
            if self.steps_to_target == 0 {
                self.set_current_and_target(self.target);
            } else {
                self.countdown = self.steps_to_target;
                self.update_step();
            }
        }
    }

    /// Number of samples a full ramp takes.
    pub fn ramp_length_samples(&self) -> usize {
        self.steps_to_target
    }

    /// Jump to `value` without ramping.
    pub fn set_current_and_target(&mut self, value: T) {
        self.current = value;
        self.target = value;
        self.countdown = 0;
        self.step = Self::idle_step(self.kind);
    }

    /// Start a new ramp toward `value`. Re-setting the current target is a no-op.
    pub fn set_target(&mut self, value: T) {
        if value == self.target {
            return;
        }

        if self.steps_to_target == 0 {
            self.set_current_and_target(value);
            return;
        }

        self.target = value;
        self.countdown = self.steps_to_target;
        self.update_step();
    }

    /// Advance one sample and return the new current value.
    #[inline]
    pub fn next_value(&mut self) -> T {
        if self.countdown == 0 {
            return self.target;
        }

        self.countdown -= 1;

        if self.countdown > 0 {
            self.current = match self.kind {
                RampKind::Linear => self.current + self.step,
                RampKind::Multiplicative => self.current * self.step,
            };
        } else {
            self.current = self.target;
        }

        self.current
    }

    /// Advance `num_samples` samples and return the resulting current value.
    ///
    /// Stepping one sample at a time keeps the result bit-identical to calling
    /// `next_value()` the same number of times.
    #[inline]
    pub fn skip(&mut self, num_samples: usize) -> T {
        for _ in 0..num_samples.min(self.countdown) {
            self.next_value();
        }
        self.current
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }

    #[inline]
    pub fn current(&self) -> T {
        self.current
    }

    #[inline]
    pub fn target(&self) -> T {
        self.target
    }

    pub fn kind(&self) -> RampKind {
        self.kind
    }

    fn update_step(&mut self) {
        let steps = T::from_f64(self.countdown as f64);
        self.step = match self.kind {
            RampKind::Linear => (self.target - self.current) / steps,
            RampKind::Multiplicative => {
                ((self.target.abs().ln() - self.current.abs().ln()) / steps).exp()
            }
        };
    }

    fn idle_step(kind: RampKind) -> T {
        match kind {
            RampKind::Linear => T::zero(),
            RampKind::Multiplicative => T::one(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_settled() {
        let value = SmoothedValue::<f32>::linear(0.5);
        assert!(!value.is_smoothing());
        assert_eq!(value.current(), 0.5);
        assert_eq!(value.target(), 0.5);
    }

    #[test]
    fn test_zero_ramp_jumps() {
        let mut value = SmoothedValue::<f32>::linear(0.0);
        value.set_ramp_length(48_000.0, 0.0);
        value.set_target(1.0);
        assert!(!value.is_smoothing());
        assert_eq!(value.current(), 1.0);
    }

    #[test]
    fn test_linear_ramp_length() {
        let mut value = SmoothedValue::<f64>::linear(0.0);
        value.set_ramp_length(1_000.0, 0.01);
        assert_eq!(value.ramp_length_samples(), 10);

        value.set_target(1.0);
        assert!(value.is_smoothing());

        let mut steps = 0;
        while value.is_smoothing() {
            let v = value.next_value();
            steps += 1;
            assert!(v <= 1.0);
        }
        assert_eq!(steps, 10);
        assert_eq!(value.current(), 1.0);
    }

    #[test]
    fn test_linear_ramp_is_evenly_spaced() {
        let mut value = SmoothedValue::<f64>::linear(0.0);
        value.set_ramp_length(100.0, 0.04);
        value.set_target(-4.0);

        let expected = [-1.0, -2.0, -3.0, -4.0];
        for e in expected {
            assert!((value.next_value() - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_multiplicative_ramp_is_geometric() {
        let mut value = SmoothedValue::<f64>::multiplicative(100.0);
        value.set_ramp_length(100.0, 0.02);
        value.set_target(10_000.0);

        // Two steps from 100 to 10 kHz: one decade each
        assert!((value.next_value() - 1_000.0).abs() < 1e-6);
        assert_eq!(value.next_value(), 10_000.0);
        assert!(!value.is_smoothing());
    }

    #[test]
    fn test_multiplicative_ramp_stays_positive() {
        let mut value = SmoothedValue::<f32>::multiplicative(20_000.0);
        value.set_ramp_length(48_000.0, 0.05);
        value.set_target(20.0);

        while value.is_smoothing() {
            let v = value.next_value();
            assert!(v > 0.0);
            assert!(v <= 20_000.0 * 1.0001);
        }
        assert_eq!(value.current(), 20.0);
    }

    #[test]
    fn test_skip_matches_stepping() {
        let mut stepped = SmoothedValue::<f32>::multiplicative(50.0);
        stepped.set_ramp_length(44_100.0, 0.1);
        stepped.set_target(12_000.0);
        let mut skipped = stepped;

        // Move both mid-ramp first
        for _ in 0..37 {
            stepped.next_value();
            skipped.next_value();
        }

        for _ in 0..1_000 {
            stepped.next_value();
        }
        skipped.skip(1_000);

        assert_eq!(stepped.current(), skipped.current());
        assert_eq!(stepped.is_smoothing(), skipped.is_smoothing());
    }

    #[test]
    fn test_skip_past_end_settles() {
        let mut value = SmoothedValue::<f32>::linear(0.0);
        value.set_ramp_length(44_100.0, 0.01);
        value.set_target(2.0);
        assert_eq!(value.skip(1_000_000), 2.0);
        assert!(!value.is_smoothing());
    }

    #[test]
    fn test_same_target_does_not_restart() {
        let mut value = SmoothedValue::<f32>::linear(0.0);
        value.set_ramp_length(1_000.0, 0.01);
        value.set_target(1.0);
        value.skip(5);
        let before = value.current();

        value.set_target(1.0);
        value.skip(5);
        assert!(!value.is_smoothing());
        assert!(before < 1.0);
    }

    #[test]
    fn test_ramp_length_change_keeps_current() {
        let mut value = SmoothedValue::<f64>::linear(0.0);
        value.set_ramp_length(1_000.0, 0.1);
        value.set_target(1.0);
        value.skip(10);
        let mid = value.current();

        value.set_ramp_length(2_000.0, 0.1);
        assert_eq!(value.current(), mid);
        assert!(value.is_smoothing());
        assert_eq!(value.skip(200), 1.0);
    }
}
