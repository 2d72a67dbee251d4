//! BiLinear EQ: a first-order multi-mode filter for real-time effect chains.
//!
//! The crate provides the filter engine only: bilinear-transform coefficient
//! design for six low/high pass and shelving responses, four direct-form
//! realizations, per-channel delay state, and smoothed frequency/gain changes.
//! Oversampling, dry/wet mixing, output gain and the host wrapper live in the
//! surrounding plugin.
//!
//! ```no_run
//! use bilinear_eq::{BiLinearFilter, FilterType, ProcessSetup};
//!
//! let mut filter = BiLinearFilter::<f32>::new();
//! filter.prepare(&ProcessSetup::new(48_000.0, 512, 2).unwrap());
//! filter.set_filter_type(FilterType::HighShelf);
//! filter.set_frequency(4_000.0);
//! filter.set_gain(2.0);
//!
//! let left = vec![0.0_f32; 512];
//! let right = vec![0.0_f32; 512];
//! let mut out_l = vec![0.0_f32; 512];
//! let mut out_r = vec![0.0_f32; 512];
//! filter.process(
//!     &[left.as_slice(), right.as_slice()],
//!     &mut [out_l.as_mut_slice(), out_r.as_mut_slice()],
//!     false,
//! );
//! ```

pub mod config;
pub mod dsp;
pub mod params;

pub use config::{FilterConfig, FilterPresets};
pub use dsp::{BiLinearFilter, Coefficients, ProcessSetup, SampleType};
pub use params::{FilterParams, FilterType, TransformType};
