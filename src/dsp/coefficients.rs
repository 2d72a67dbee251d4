//! Bilinear-transform coefficient design for first-order sections.
//!
//! Each response is an analog one-pole/one-zero prototype normalized so the
//! corner sits at `s = 1`. The bilinear transform with frequency pre-warping
//!
//! ```text
//! s = (1 - z^-1) / (K * (1 + z^-1)),   K = tan(pi * f / fs)
//! ```
//!
//! maps the prototype corner exactly onto the requested cutoff `f`.
//!
//! # Prototypes
//! With `G` the linear gain and `r = max(sqrt(|G|), SHELF_MIN_RATIO)`:
//!
//! | Type          | H(s)                  | a0      |
//! |---------------|-----------------------|---------|
//! | LowPass       | 1 / (s + 1)           | 1 + K   |
//! | HighPass      | s / (s + 1)           | 1 + K   |
//! | LowShelf      | (s + G) / (s + 1)     | 1 + K   |
//! | HighShelf     | (G s + 1) / (s + 1)   | 1 + K   |
//! | LowShelfC     | (r s + G) / (r s + 1) | r + K   |
//! | HighShelfC    | (G s + r) / (s + r)   | 1 + r K |
//!
//! The plain shelves put the pole on the corner, so the full boost or cut is
//! reached on the far side of `f`. The "C" shelves place pole and zero
//! geometrically around the corner, making `f` the midpoint of the transition
//! (magnitude `sqrt(G)` at `f` for positive gain).
//!
//! `K` is strictly positive for every frequency below Nyquist and `r` is
//! floored above zero, so `a0 > 0` for every input.

use super::sample::SampleType;
use crate::params::{FilterType, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};

/// Highest cutoff as a fraction of the sample rate.
/// Keeps `tan(pi * f / fs)` finite at low sample rates.
const MAX_NYQUIST_FRACTION: f64 = 0.499;

/// Floor for the "C" shelf corner ratio.
/// Gains below -120 dB are treated as -120 dB for corner placement only.
const SHELF_MIN_RATIO: f64 = 1e-3;

/// Coefficients of `H(z) = (b0 + b1 z^-1) / (a0 + a1 z^-1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients<T: SampleType> {
    pub b0: T,
    pub b1: T,
    pub a0: T,
    pub a1: T,
}

impl<T: SampleType> Default for Coefficients<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: SampleType> Coefficients<T> {
    /// Pass-through section.
    pub fn identity() -> Self {
        Self {
            b0: T::one(),
            b1: T::zero(),
            a0: T::one(),
            a1: T::zero(),
        }
    }

    /// Design raw coefficients for `filter_type` at `frequency` Hz.
    ///
    /// `frequency` is clamped to the audible range and below Nyquist.
    /// `gain` is only read by the shelving types.
    pub fn design(filter_type: FilterType, frequency: T, gain: T, sample_rate: f64) -> Self {
        let one = T::one();
        let f = clamp_frequency(frequency, sample_rate);
        let k = (T::PI() * f / T::from_f64(sample_rate)).tan();
        let g = gain;

        match filter_type {
            FilterType::LowPass => Self {
                b0: k,
                b1: k,
                a0: k + one,
                a1: k - one,
            },
            FilterType::HighPass => Self {
                b0: one,
                b1: -one,
                a0: k + one,
                a1: k - one,
            },
            FilterType::LowShelf => Self {
                b0: one + g * k,
                b1: g * k - one,
                a0: k + one,
                a1: k - one,
            },
            FilterType::HighShelf => Self {
                b0: g + k,
                b1: k - g,
                a0: k + one,
                a1: k - one,
            },
            FilterType::LowShelfC => {
                let r = shelf_ratio(g);
                Self {
                    b0: r + g * k,
                    b1: g * k - r,
                    a0: r + k,
                    a1: k - r,
                }
            }
            FilterType::HighShelfC => {
                let r = shelf_ratio(g);
                Self {
                    b0: g + r * k,
                    b1: r * k - g,
                    a0: one + r * k,
                    a1: r * k - one,
                }
            }
        }
    }

    /// Scale by `1 / a0` so that `a0 == 1`.
    #[inline]
    pub fn normalized(self) -> Self {
        debug_assert!(self.a0 != T::zero(), "a0 must never be zero");
        let inv_a0 = T::one() / self.a0;
        Self {
            b0: self.b0 * inv_a0,
            b1: self.b1 * inv_a0,
            a0: T::one(),
            a1: self.a1 * inv_a0,
        }
    }

    /// Magnitude of the frequency response at `frequency` Hz.
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * std::f64::consts::PI * frequency / sample_rate;
        let (b0, b1) = (self.b0.into_f64(), self.b1.into_f64());
        let (a0, a1) = (self.a0.into_f64(), self.a1.into_f64());
        let cw = w.cos();

        let num = b0 * b0 + b1 * b1 + 2.0 * b0 * b1 * cw;
        let den = a0 * a0 + a1 * a1 + 2.0 * a0 * a1 * cw;
        (num / den.max(1e-300)).max(0.0).sqrt()
    }
}

/// Clamp a cutoff to the audible range and keep it below Nyquist.
#[inline]
pub fn clamp_frequency<T: SampleType>(frequency: T, sample_rate: f64) -> T {
    let upper = MAX_FREQUENCY_HZ.min(sample_rate * MAX_NYQUIST_FRACTION);
    frequency
        .max(T::from_f64(MIN_FREQUENCY_HZ))
        .min(T::from_f64(upper))
}

#[inline]
fn shelf_ratio<T: SampleType>(gain: T) -> T {
    gain.abs().sqrt().max(T::from_f64(SHELF_MIN_RATIO))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48_000.0;

    fn db(x: f64) -> f64 {
        20.0 * x.log10()
    }

    #[test]
    fn test_identity_is_flat() {
        let c = Coefficients::<f32>::identity();
        assert!((c.magnitude_at(100.0, SR) - 1.0).abs() < 1e-9);
        assert!((c.magnitude_at(20_000.0, SR) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_lowpass_corner_is_minus_3db() {
        let c = Coefficients::<f64>::design(FilterType::LowPass, 1_000.0, 1.0, SR);
        assert!((c.magnitude_at(0.0, SR) - 1.0).abs() < 1e-12);
        assert!((db(c.magnitude_at(1_000.0, SR)) + 3.0103).abs() < 0.01);
        assert!(c.magnitude_at(SR * 0.5, SR) < 1e-6);
    }

    #[test]
    fn test_highpass_corner_is_minus_3db() {
        let c = Coefficients::<f64>::design(FilterType::HighPass, 1_000.0, 1.0, SR);
        assert!(c.magnitude_at(0.0, SR) < 1e-12);
        assert!((db(c.magnitude_at(1_000.0, SR)) + 3.0103).abs() < 0.01);
        assert!((c.magnitude_at(SR * 0.5, SR) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pass_types_ignore_gain() {
        for filter_type in [FilterType::LowPass, FilterType::HighPass] {
            let a = Coefficients::<f64>::design(filter_type, 500.0, 1.0, SR);
            let b = Coefficients::<f64>::design(filter_type, 500.0, -7.0, SR);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_low_shelf_levels() {
        let g = 4.0;
        for filter_type in [FilterType::LowShelf, FilterType::LowShelfC] {
            let c = Coefficients::<f64>::design(filter_type, 200.0, g, SR);
            assert!((c.magnitude_at(0.0, SR) - g).abs() < 1e-9);
            assert!((c.magnitude_at(SR * 0.5, SR) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_high_shelf_levels() {
        let g = 0.25;
        for filter_type in [FilterType::HighShelf, FilterType::HighShelfC] {
            let c = Coefficients::<f64>::design(filter_type, 2_000.0, g, SR);
            assert!((c.magnitude_at(0.0, SR) - 1.0).abs() < 1e-9);
            assert!((c.magnitude_at(SR * 0.5, SR) - g).abs() < 1e-9);
        }
    }

    #[test]
    fn test_c_shelves_are_centred_on_corner() {
        let g = 4.0;
        let low = Coefficients::<f64>::design(FilterType::LowShelfC, 1_000.0, g, SR);
        let high = Coefficients::<f64>::design(FilterType::HighShelfC, 1_000.0, g, SR);
        assert!((low.magnitude_at(1_000.0, SR) - 2.0).abs() < 1e-9);
        assert!((high.magnitude_at(1_000.0, SR) - 2.0).abs() < 1e-9);

        // Plain shelves are not centred: more than half the boost at the corner
        let plain = Coefficients::<f64>::design(FilterType::LowShelf, 1_000.0, g, SR);
        assert!(plain.magnitude_at(1_000.0, SR) > 2.0);
    }

    #[test]
    fn test_unity_gain_shelves_are_flat() {
        for filter_type in [
            FilterType::LowShelf,
            FilterType::LowShelfC,
            FilterType::HighShelf,
            FilterType::HighShelfC,
        ] {
            let c = Coefficients::<f64>::design(filter_type, 3_000.0, 1.0, SR);
            for f in [20.0, 300.0, 3_000.0, 15_000.0] {
                assert!((c.magnitude_at(f, SR) - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_a0_never_zero() {
        let gains = [-100.0, -1.0, -1e-9, 0.0, 1e-9, 0.5, 1.0, 10.0, 1e6];
        let freqs = [0.0, 20.0, 1_000.0, 20_000.0, 1e9];
        let rates = [8_000.0, 22_050.0, 44_100.0, 192_000.0];

        for filter_type in FilterType::ALL {
            for &g in &gains {
                for &f in &freqs {
                    for &sr in &rates {
                        let c = Coefficients::<f32>::design(filter_type, f, g, sr);
                        assert!(c.a0 > 0.0, "{:?} f={} g={} sr={}", filter_type, f, g, sr);
                        assert!(c.a0.is_finite());
                        let n = c.normalized();
                        // Pole inside the unit circle
                        assert!(n.a1.abs() <= 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_frequency_clamp() {
        assert_eq!(clamp_frequency(5.0_f64, SR), 20.0);
        assert_eq!(clamp_frequency(50_000.0_f64, SR), 20_000.0);
        assert_eq!(clamp_frequency(20_000.0_f64, 22_050.0), 22_050.0 * 0.499);
        assert_eq!(clamp_frequency(440.0_f64, SR), 440.0);
    }

    #[test]
    fn test_normalized_keeps_response() {
        let c = Coefficients::<f64>::design(FilterType::HighShelf, 750.0, 3.0, SR);
        let n = c.normalized();
        assert_eq!(n.a0, 1.0);
        for f in [50.0, 750.0, 9_000.0] {
            assert!((c.magnitude_at(f, SR) - n.magnitude_at(f, SR)).abs() < 1e-12);
        }
    }
}
