//! Sample type abstraction.
//!
//! Every DSP block in this crate is generic over the floating-point precision
//! it runs at. `f32` is the usual host format; `f64` is used by hosts that run
//! double-precision buses and by the tests as a numerical reference.

use num_traits::{Float, FloatConst};
use std::fmt::Debug;

/// Floating-point sample type the filter engine can run at.
pub trait SampleType: Float + FloatConst + Default + Debug + Send + Sync + 'static {
    /// Lossy conversion from a double-precision constant or parameter value.
    fn from_f64(value: f64) -> Self;

    /// Widening conversion used for analysis and parameter storage.
    fn into_f64(self) -> f64;
}

impl SampleType for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn into_f64(self) -> f64 {
        self as f64
    }
}

impl SampleType for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn into_f64(self) -> f64 {
        self
    }
}
