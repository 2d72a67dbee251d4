//! Filter configuration and factory presets.
//!
//! A [`FilterConfig`] is a plain serializable snapshot of every setting the
//! filter exposes. It is applied through the public setters, so it goes
//! through the same clamping and smoothing as a live parameter change.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dsp::utils::db_to_gain;
use crate::dsp::{BiLinearFilter, SampleType};
use crate::params::{FilterParams, FilterType, TransformType, DEFAULT_FREQUENCY_HZ, DEFAULT_GAIN};

use crate::dsp::bilinear::DEFAULT_RAMP_DURATION_SECONDS;

/// Name of the preset every manager is guaranteed to contain
pub const FLAT_PRESET: &str = "Flat";

// =============================================================================
// Filter configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub frequency_hz: f64,
    /// Linear gain
    pub gain: f64,
    /// Gain in decibels. Overrides `gain` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain_db: Option<f64>,
    pub filter_type: FilterType,
    pub transform_type: TransformType,
    pub ramp_duration_seconds: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            gain: DEFAULT_GAIN,
            gain_db: None,
            filter_type: FilterType::default(),
            transform_type: TransformType::default(),
            ramp_duration_seconds: DEFAULT_RAMP_DURATION_SECONDS,
        }
    }
}

impl FilterConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("failed to parse filter config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize filter config")
    }

    /// Reject values the setters cannot clamp into something meaningful.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.frequency_hz.is_finite(),
            "frequency must be finite, got {}",
            self.frequency_hz
        );
        anyhow::ensure!(
            self.linear_gain().is_finite(),
            "gain must be finite, got {}",
            self.linear_gain()
        );
        anyhow::ensure!(
            self.ramp_duration_seconds.is_finite() && self.ramp_duration_seconds >= 0.0,
            "ramp duration must be a non-negative number of seconds, got {}",
            self.ramp_duration_seconds
        );
        Ok(())
    }

    /// Effective linear gain after resolving `gain_db`.
    pub fn linear_gain(&self) -> f64 {
        self.gain_db.map(db_to_gain).unwrap_or(self.gain)
    }

    /// Push every setting into `filter`. Not real-time safe.
    pub fn apply<T: SampleType>(&self, filter: &mut BiLinearFilter<T>) {
        filter.set_ramp_duration_seconds(self.ramp_duration_seconds);
        self.apply_to_params(&filter.params());
    }

    /// Update only the shared targets. Safe to call from a control thread
    /// while the filter is processing; the ramp duration is left unchanged.
    pub fn apply_to_params(&self, params: &FilterParams) {
        params.set_frequency(self.frequency_hz);
        params.set_gain(self.linear_gain());
        params.set_filter_type(self.filter_type);
        params.set_transform_type(self.transform_type);
    }
}

// =============================================================================
// Factory presets
// =============================================================================

#[derive(Debug)]
pub struct FilterPresets {
    presets: HashMap<String, FilterConfig>,
}

impl FilterPresets {
    /// Load the baked-in factory presets. Falls back to a flat-only set if
    /// the embedded JSON is malformed.
    pub fn new() -> Self {
        match Self::from_json_str(include_str!("../presets.json")) {
            Ok(presets) => {
                log::info!("loaded {} factory presets", presets.presets.len());
                presets
            }
            Err(err) => {
                log::warn!("factory presets unavailable, using flat only: {:#}", err);
                Self::default()
            }
        }
    }

    /// Parse a preset table of `name -> FilterConfig`.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let mut presets: HashMap<String, FilterConfig> =
            serde_json::from_str(json).context("failed to parse preset table")?;

        for (name, config) in &presets {
            config
                .validate()
                .with_context(|| format!("invalid preset '{}'", name))?;
        }

        presets
            .entry(FLAT_PRESET.to_string())
            .or_insert_with(FilterConfig::default);

        Ok(Self { presets })
    }

    pub fn get(&self, name: &str) -> Option<&FilterConfig> {
        self.presets.get(name)
    }

    /// Preset names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for FilterPresets {
    fn default() -> Self {
        let mut presets = HashMap::new();
        presets.insert(FLAT_PRESET.to_string(), FilterConfig::default());
        Self { presets }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::ProcessSetup;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = FilterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "frequency_hz": 250.0,
            "gain": 2.0,
            "filter_type": "lowShelfC",
            "transform_type": "directFormII",
            "ramp_duration_seconds": 0.01
        }"#;
        let config = FilterConfig::from_json_str(json).unwrap();
        assert_eq!(config.frequency_hz, 250.0);
        assert_eq!(config.filter_type, FilterType::LowShelfC);
        assert_eq!(config.transform_type, TransformType::DirectFormII);
        assert_eq!(config.linear_gain(), 2.0);
    }

    #[test]
    fn test_gain_db_overrides_gain() {
        let config = FilterConfig::from_json_str(r#"{ "gain": 5.0, "gain_db": 0.0 }"#).unwrap();
        assert!((config.linear_gain() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(FilterConfig::from_json_str("not json").is_err());
        assert!(FilterConfig::from_json_str(r#"{ "filter_type": "bandPass" }"#).is_err());
        assert!(FilterConfig::from_json_str(r#"{ "ramp_duration_seconds": -1.0 }"#).is_err());
        assert!(FilterConfig::from_json_str(r#"{ "cutoff": 100.0 }"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = FilterConfig {
            frequency_hz: 3_300.0,
            gain: 0.5,
            gain_db: None,
            filter_type: FilterType::HighShelf,
            transform_type: TransformType::DirectFormITransposed,
            ramp_duration_seconds: 0.02,
        };
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"highShelf\""));
        assert!(json.contains("\"directFormITransposed\""));
        assert_eq!(FilterConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_apply_reaches_filter() {
        let mut filter = BiLinearFilter::<f32>::new();
        filter.prepare(&ProcessSetup::new(48_000.0, 64, 1).unwrap());

        let config = FilterConfig {
            frequency_hz: 50_000.0,
            gain_db: Some(6.0),
            filter_type: FilterType::HighShelfC,
            transform_type: TransformType::DirectFormI,
            ramp_duration_seconds: 0.0,
            ..FilterConfig::default()
        };
        config.apply(&mut filter);
        filter.process_frame(&[0.0], &mut [0.0]);

        assert_eq!(filter.ramp_duration_seconds(), 0.0);
        assert_eq!(filter.filter_type(), FilterType::HighShelfC);
        assert_eq!(filter.transform_type(), TransformType::DirectFormI);
        assert_eq!(filter.current_frequency(), 20_000.0);
        assert!((filter.current_gain() - 1.995_262).abs() < 1e-5);
    }

    #[test]
    fn test_factory_presets_load() {
        let presets = FilterPresets::new();
        assert!(presets.len() > 1);
        assert!(presets.get(FLAT_PRESET).is_some());

        let air = presets.get("Air").unwrap();
        assert_eq!(air.filter_type, FilterType::HighShelfC);
        assert!(air.linear_gain() > 1.0);

        let names = presets.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_preset_table_always_has_flat() {
        let presets =
            FilterPresets::from_json_str(r#"{ "Bright": { "filter_type": "highShelf" } }"#)
                .unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets.get(FLAT_PRESET), Some(&FilterConfig::default()));
    }

    #[test]
    fn test_invalid_preset_is_reported() {
        let err = FilterPresets::from_json_str(
            r#"{ "Broken": { "ramp_duration_seconds": -0.5 } }"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Broken"));
    }

    #[test]
    fn test_default_presets_are_flat_only() {
        let presets = FilterPresets::default();
        assert_eq!(presets.names(), vec![FLAT_PRESET]);
    }
}
