//! Filter parameters shared between the control thread and the audio thread.
//!
//! The control side writes targets through [`FilterParams`]; the audio side
//! latches them at block and frame boundaries. Every target is its own atomic
//! scalar, so a racing update is either seen whole or not at all and the last
//! writer wins. There is no multi-field snapshot to tear.

use nih_plug::prelude::Enum;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Lowest accepted cutoff frequency in Hz
pub const MIN_FREQUENCY_HZ: f64 = 20.0;

/// Highest accepted cutoff frequency in Hz
pub const MAX_FREQUENCY_HZ: f64 = 20_000.0;

/// Cutoff the filter starts at before any setter runs
pub const DEFAULT_FREQUENCY_HZ: f64 = 1_000.0;

/// Linear gain the filter starts at
pub const DEFAULT_GAIN: f64 = 1.0;

// =============================================================================
// Response and realization selectors
// =============================================================================

/// Frequency response of the first-order section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    #[name = "Low Pass"]
    #[id = "low_pass"]
    LowPass,
    #[name = "High Pass"]
    #[id = "high_pass"]
    HighPass,
    #[name = "Low Shelf"]
    #[id = "low_shelf"]
    LowShelf,
    #[name = "Low Shelf (C)"]
    #[id = "low_shelf_c"]
    LowShelfC,
    #[name = "High Shelf"]
    #[id = "high_shelf"]
    HighShelf,
    #[name = "High Shelf (C)"]
    #[id = "high_shelf_c"]
    HighShelfC,
}

/// Difference-equation structure used to realize the transfer function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "camelCase")]
pub enum TransformType {
    #[name = "Direct Form I"]
    #[id = "dfi"]
    DirectFormI,
    #[name = "Direct Form II"]
    #[id = "dfii"]
    DirectFormII,
    #[name = "Direct Form I Transposed"]
    #[id = "dfi_t"]
    DirectFormITransposed,
    #[name = "Direct Form II Transposed"]
    #[id = "dfii_t"]
    DirectFormIITransposed,
}

impl Default for FilterType {
    fn default() -> Self {
        FilterType::LowPass
    }
}

impl Default for TransformType {
    fn default() -> Self {
        TransformType::DirectFormIITransposed
    }
}

impl FilterType {
    pub const ALL: [FilterType; 6] = [
        FilterType::LowPass,
        FilterType::HighPass,
        FilterType::LowShelf,
        FilterType::LowShelfC,
        FilterType::HighShelf,
        FilterType::HighShelfC,
    ];

    /// Convert a host choice index, clamping out-of-range indices to the last entry.
    pub fn from_choice(index: usize) -> Self {
        Self::from_index(index.min(Self::ALL.len() - 1))
    }

    /// Whether the gain parameter affects this response.
    pub fn uses_gain(self) -> bool {
        !matches!(self, FilterType::LowPass | FilterType::HighPass)
    }

    fn from_raw(raw: usize) -> Self {
        Self::ALL.get(raw).copied().unwrap_or_default()
    }
}

impl TransformType {
    pub const ALL: [TransformType; 4] = [
        TransformType::DirectFormI,
        TransformType::DirectFormII,
        TransformType::DirectFormITransposed,
        TransformType::DirectFormIITransposed,
    ];

    /// Convert a host choice index, clamping out-of-range indices to the last entry.
    pub fn from_choice(index: usize) -> Self {
        Self::from_index(index.min(Self::ALL.len() - 1))
    }

    fn from_raw(raw: usize) -> Self {
        Self::ALL.get(raw).copied().unwrap_or_default()
    }
}

// =============================================================================
// Shared targets
// =============================================================================

/// Lock-free parameter targets for one filter instance.
///
/// Floats are stored as `f64` bit patterns, enums as their index.
#[derive(Debug)]
pub struct FilterParams {
    frequency: AtomicU64,
    gain: AtomicU64,
    filter_type: AtomicUsize,
    transform_type: AtomicUsize,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterParams {
    pub fn new() -> Self {
        Self {
            frequency: AtomicU64::new(DEFAULT_FREQUENCY_HZ.to_bits()),
            gain: AtomicU64::new(DEFAULT_GAIN.to_bits()),
            filter_type: AtomicUsize::new(FilterType::default() as usize),
            transform_type: AtomicUsize::new(TransformType::default() as usize),
        }
    }

    /// Store a new cutoff target, clamped to the audible range.
    pub fn set_frequency(&self, hz: f64) {
        let hz = hz.max(MIN_FREQUENCY_HZ).min(MAX_FREQUENCY_HZ);
        self.frequency.store(hz.to_bits(), Ordering::Relaxed);
    }

    pub fn frequency(&self) -> f64 {
        f64::from_bits(self.frequency.load(Ordering::Relaxed))
    }

    /// Store a new gain target. Non-finite values keep the previous target.
    pub fn set_gain(&self, gain: f64) {
        if !gain.is_finite() {
            return;
        }
        self.gain.store(gain.to_bits(), Ordering::Relaxed);
    }

    pub fn gain(&self) -> f64 {
        f64::from_bits(self.gain.load(Ordering::Relaxed))
    }

    pub fn set_filter_type(&self, filter_type: FilterType) {
        self.filter_type
            .store(filter_type as usize, Ordering::Relaxed);
    }

    pub fn filter_type(&self) -> FilterType {
        FilterType::from_raw(self.filter_type.load(Ordering::Relaxed))
    }

    pub fn set_transform_type(&self, transform_type: TransformType) {
        self.transform_type
            .store(transform_type as usize, Ordering::Relaxed);
    }

    pub fn transform_type(&self) -> TransformType {
        TransformType::from_raw(self.transform_type.load(Ordering::Relaxed))
    }
}

// =============================================================================
// Tests
// =============================================================================
