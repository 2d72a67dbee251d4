//! Per-channel delay registers.

use super::sample::SampleType;

/// Magnitude below which a register is flushed to zero by `snap_to_zero`.
pub const SNAP_TO_ZERO_THRESHOLD: f64 = 1.0e-8;

/// Unit delays for one channel.
///
/// All three exist regardless of the active realization; each structure
/// reads and writes its own subset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelState<T: SampleType> {
    /// x[n-1], or the zero-section state of the transposed Direct Form I
    pub prior_input: T,
    /// y[n-1], or the pole-section state of the transposed Direct Form I
    pub prior_output: T,
    /// w[n-1] of Direct Form II, or the single state of its transposed form
    pub prior_intermediate: T,
}

impl<T: SampleType> ChannelState<T> {
    pub fn filled(value: T) -> Self {
        Self {
            prior_input: value,
            prior_output: value,
            prior_intermediate: value,
        }
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        *self = Self::filled(value);
    }

    /// Flush near-zero registers to exactly zero.
    #[inline]
    pub fn snap_to_zero(&mut self) {
        let threshold = T::from_f64(SNAP_TO_ZERO_THRESHOLD);
        for register in [
            &mut self.prior_input,
            &mut self.prior_output,
            &mut self.prior_intermediate,
        ] {
            if !(*register < -threshold || *register > threshold) {
                *register = T::zero();
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.prior_input == T::zero()
            && self.prior_output == T::zero()
            && self.prior_intermediate == T::zero()
    }
}

// =============================================================================
// Tests
// =============================================================================
