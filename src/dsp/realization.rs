//! Direct-form realizations of a first-order section.
//!
//! All four structures compute the same transfer function and agree to within
//! rounding while the coefficients are fixed. They differ in which signals are
//! stored between samples, and therefore in how a coefficient change mid-stream
//! shows up at the output. The transposed Direct Form II keeps the smallest
//! state and injects the least transient error under modulation, which is why
//! it is the default.
//!
//! Every function here expects normalized coefficients (`a0 == 1`).

use super::channel_state::ChannelState;
use super::coefficients::Coefficients;
use super::sample::SampleType;
use crate::params::TransformType;

impl TransformType {
    /// Run one sample through the selected structure.
    #[inline]
    pub fn process<T: SampleType>(
        self,
        coeffs: &Coefficients<T>,
        state: &mut ChannelState<T>,
        input: T,
    ) -> T {
        debug_assert!(coeffs.a0 == T::one(), "coefficients must be normalized");

        match self {
            TransformType::DirectFormI => direct_form_i(coeffs, state, input),
            TransformType::DirectFormII => direct_form_ii(coeffs, state, input),
            TransformType::DirectFormITransposed => direct_form_i_transposed(coeffs, state, input),
            TransformType::DirectFormIITransposed => {
                direct_form_ii_transposed(coeffs, state, input)
            }
        }
    }
}

/// `y[n] = b0 x[n] + b1 x[n-1] - a1 y[n-1]`
#[inline]
fn direct_form_i<T: SampleType>(c: &Coefficients<T>, s: &mut ChannelState<T>, x: T) -> T {
    let y = c.b0 * x + c.b1 * s.prior_input - c.a1 * s.prior_output;
    s.prior_input = x;
    s.prior_output = y;
    y
}

/// `w[n] = x[n] - a1 w[n-1]`, `y[n] = b0 w[n] + b1 w[n-1]`
#[inline]
fn direct_form_ii<T: SampleType>(c: &Coefficients<T>, s: &mut ChannelState<T>, x: T) -> T {
    let w = x - c.a1 * s.prior_intermediate;
    let y = c.b0 * w + c.b1 * s.prior_intermediate;
    s.prior_intermediate = w;
    y
}

/// Pole section first, then zero section, each with its delay transposed.
///
/// `prior_output` carries `-a1 v[n-1]` into the pole section and
/// `prior_input` carries `b1 v[n-1]` into the zero section.
#[inline]
fn direct_form_i_transposed<T: SampleType>(
    c: &Coefficients<T>,
    s: &mut ChannelState<T>,
    x: T,
) -> T {
    let v = x + s.prior_output;
    let y = c.b0 * v + s.prior_input;
    s.prior_output = -c.a1 * v;
    s.prior_input = c.b1 * v;
    y
}

/// `y[n] = b0 x[n] + s[n-1]`, `s[n] = b1 x[n] - a1 y[n]`
#[inline]
fn direct_form_ii_transposed<T: SampleType>(
    c: &Coefficients<T>,
    s: &mut ChannelState<T>,
    x: T,
) -> T {
    let y = c.b0 * x + s.prior_intermediate;
    s.prior_intermediate = c.b1 * x - c.a1 * y;
    y
}

// =============================================================================
// Tests
// =============================================================================
