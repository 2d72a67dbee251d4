//! BiLinear Filter (first-order multi-mode EQ section)
//!
//! A first-order low/high pass and shelving filter designed with the bilinear
//! transform, realized in any of the four direct forms, with click-free
//! frequency and gain changes.
//!
//! # Lifecycle
//! - **Unprepared**: after `new()`. No channel state exists yet.
//! - **Active**: every sample index advances the smoothers once, redesigns
//!   the coefficients and runs every channel through the selected structure.
//! - **Bypassed**: input is copied to output and the smoothers are skipped
//!   forward by the block length so they stay in time with the host.
//!
//! ## Threading
//! - Setters write atomics in [`FilterParams`] and may be called from any
//!   thread, directly or through the handle returned by `params()`.
//! - `prepare()`, `reset()` and `set_ramp_duration_seconds()` take
//!   `&mut self` and must run while the audio thread is not processing.
//!
//! ## Audio Thread Safety
//! - Channel state is allocated in `prepare()` only.
//! - No allocations, locks or logging during `process*()` and `snap_to_zero()`.

use std::sync::Arc;

use super::channel_state::ChannelState;
use super::coefficients::Coefficients;
use super::sample::SampleType;
use super::smoother::SmoothedValue;
use crate::params::{FilterParams, FilterType, TransformType};

/// Sample rate assumed until `prepare()` is called
pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// Default smoothing time for frequency and gain changes (50 µs)
pub const DEFAULT_RAMP_DURATION_SECONDS: f64 = 0.000_05;

// =============================================================================
// Processing setup
// =============================================================================

/// Session shape handed to [`BiLinearFilter::prepare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSetup {
    pub sample_rate: f64,
    pub maximum_block_size: usize,
    pub num_channels: usize,
}

impl ProcessSetup {
    pub fn new(
        sample_rate: f64,
        maximum_block_size: usize,
        num_channels: usize,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be positive and finite, got {}",
            sample_rate
        );
        anyhow::ensure!(maximum_block_size > 0, "maximum block size must be non-zero");
        anyhow::ensure!(num_channels > 0, "at least one channel is required");

        Ok(Self {
            sample_rate,
            maximum_block_size,
            num_channels,
        })
    }

    /// Build a setup from the host's buffer configuration.
    pub fn from_buffer_config(
        config: &nih_plug::prelude::BufferConfig,
        num_channels: usize,
    ) -> anyhow::Result<Self> {
        Self::new(
            config.sample_rate as f64,
            config.max_buffer_size as usize,
            num_channels,
        )
    }
}

// =============================================================================
// Filter
// =============================================================================

pub struct BiLinearFilter<T: SampleType> {
    params: Arc<FilterParams>,

    // Smoothed parameters, advanced once per sample index
    frequency: SmoothedValue<T>,
    gain: SmoothedValue<T>,

    // Selectors latched from `params`
    filter_type: FilterType,
    transform_type: TransformType,

    /// Normalized coefficients shared by every channel at the current index
    coefficients: Coefficients<T>,

    channels: Vec<ChannelState<T>>,

    sample_rate: f64,
    maximum_block_size: usize,
    ramp_duration_seconds: f64,
    snap_after_block: bool,
}

impl<T: SampleType> Default for BiLinearFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SampleType> BiLinearFilter<T> {
    pub fn new() -> Self {
        Self::with_params(Arc::new(FilterParams::new()))
    }

    /// Create a filter that reads its targets from an existing parameter handle.
    pub fn with_params(params: Arc<FilterParams>) -> Self {
        let frequency = SmoothedValue::multiplicative(T::from_f64(params.frequency()));
        let gain = SmoothedValue::linear(T::from_f64(params.gain()));
        let filter_type = params.filter_type();
        let transform_type = params.transform_type();

        let mut filter = Self {
            params,
            frequency,
            gain,
            filter_type,
            transform_type,
            coefficients: Coefficients::identity(),
            channels: Vec::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            maximum_block_size: 0,
            ramp_duration_seconds: DEFAULT_RAMP_DURATION_SECONDS,
            snap_after_block: true,
        };
        filter.configure_smoothers();
        filter.update_coefficients();
        filter
    }

    /// Shared handle for setting targets from another thread.
    pub fn params(&self) -> Arc<FilterParams> {
        Arc::clone(&self.params)
    }

    // -------------------------------------------------------------------------
    // Parameters
    // -------------------------------------------------------------------------

    // Setters only store targets. They take effect at the next `process()`,
    // `process_replacing()`, `process_frame()` or `advance_parameters()`.

    /// Set the cutoff in Hz. Clamped to 20..20000.
    pub fn set_frequency(&self, hz: T) {
        self.params.set_frequency(hz.into_f64());
    }

    /// Set the linear shelf gain. Ignored by the pass types. Non-finite
    /// values are dropped.
    pub fn set_gain(&self, gain: T) {
        self.params.set_gain(gain.into_f64());
    }

    pub fn set_filter_type(&self, filter_type: FilterType) {
        log::trace!("filter type -> {:?}", filter_type);
        self.params.set_filter_type(filter_type);
    }

    pub fn set_transform_type(&self, transform_type: TransformType) {
        log::trace!("transform type -> {:?}", transform_type);
        self.params.set_transform_type(transform_type);
    }

    /// Set the length of the ramp used for smoothing parameter changes.
    pub fn set_ramp_duration_seconds(&mut self, seconds: f64) {
        self.ramp_duration_seconds = seconds.max(0.0);
        self.configure_smoothers();
    }

    pub fn ramp_duration_seconds(&self) -> f64 {
        self.ramp_duration_seconds
    }

    /// True while either parameter is still moving toward its target,
    /// including targets set since the last processed sample.
    pub fn is_smoothing(&self) -> bool {
        self.frequency.is_smoothing()
            || self.gain.is_smoothing()
            || T::from_f64(self.params.frequency()) != self.frequency.target()
            || T::from_f64(self.params.gain()) != self.gain.target()
    }

    /// Flush near-zero registers to zero after every block (on by default).
    pub fn set_snap_to_zero_after_block(&mut self, enabled: bool) {
        self.snap_after_block = enabled;
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Allocate channel state for a new session.
    ///
    /// Smoothed values keep their current position; registers start at zero.
    pub fn prepare(&mut self, setup: &ProcessSetup) {
        debug_assert!(setup.sample_rate > 0.0, "sample rate must be positive");

        self.sample_rate = setup.sample_rate;
        self.maximum_block_size = setup.maximum_block_size;

        self.channels.clear();
        self.channels
            .resize(setup.num_channels, ChannelState::default());

        self.configure_smoothers();
        self.update_coefficients();

        log::debug!(
            "prepared: {} Hz, block {}, {} channel(s)",
            self.sample_rate,
            self.maximum_block_size,
            self.channels.len()
        );
    }

    /// Set every register of every channel to `initial_value`.
    pub fn reset(&mut self, initial_value: T) {
        for state in &mut self.channels {
            state.fill(initial_value);
        }
    }

    /// Flush denormal-range register values to zero.
    pub fn snap_to_zero(&mut self) {
        for state in &mut self.channels {
            state.snap_to_zero();
        }
    }

    // -------------------------------------------------------------------------
    // Processing
    // -------------------------------------------------------------------------

    /// Pull pending targets and selectors from the shared parameters.
    #[inline]
    fn latch_targets(&mut self) {
        self.frequency
            .set_target(T::from_f64(self.params.frequency()));
        self.gain.set_target(T::from_f64(self.params.gain()));
        self.filter_type = self.params.filter_type();
        self.transform_type = self.params.transform_type();
    }

    #[inline]
    fn update_coefficients(&mut self) {
        self.coefficients = Coefficients::design(
            self.filter_type,
            self.frequency.current(),
            self.gain.current(),
            self.sample_rate,
        )
        .normalized();
    }

    /// Advance both smoothers by one sample and redesign the coefficients.
    ///
    /// Call exactly once per sample index before `process_sample()` is run
    /// for each channel at that index. `process()` and `process_frame()` do
    /// this themselves.
    #[inline]
    pub fn advance_parameters(&mut self) {
        self.latch_targets();
        self.step_parameters();
    }

    /// Jump both smoothers straight to the pending targets, with no ramp.
    ///
    /// Useful after applying a configuration to a freshly prepared filter,
    /// so the first samples are not filtered on the way from the defaults.
    pub fn settle_parameters(&mut self) {
        self.latch_targets();
        self.frequency.set_current_and_target(self.frequency.target());
        self.gain.set_current_and_target(self.gain.target());
        self.update_coefficients();
    }

    #[inline]
    fn step_parameters(&mut self) {
        self.frequency.next_value();
        self.gain.next_value();
        self.update_coefficients();
    }

    /// Filter one sample on `channel` with the current coefficients.
    ///
    /// Does not read the shared targets or advance the smoothers. Call
    /// `advance_parameters()` once per sample index before the per-channel
    /// calls, otherwise setter changes are never picked up.
    ///
    /// # Panics
    /// In debug builds, if `channel` was not prepared. Release builds pass
    /// the input through.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: T) -> T {
        debug_assert!(
            channel < self.channels.len(),
            "channel {} was not prepared",
            channel
        );
        match self.channels.get_mut(channel) {
            Some(state) => self
                .transform_type
                .process(&self.coefficients, state, input),
            None => input,
        }
    }

    /// Process one sample index across all channels.
    pub fn process_frame(&mut self, input: &[T], output: &mut [T]) {
        debug_assert_eq!(input.len(), output.len(), "frame channel count mismatch");
        debug_assert!(
            input.len() <= self.channels.len(),
            "frame has more channels than were prepared"
        );

        self.advance_parameters();

        let coeffs = &self.coefficients;
        let transform = self.transform_type;
        for ((state, &x), y) in self.channels.iter_mut().zip(input).zip(output.iter_mut()) {
            *y = transform.process(coeffs, state, x);
        }
    }

    /// Process a block of `input` channels into `output` channels.
    ///
    /// Both buffers must have the same channel count and length, and no more
    /// channels than were prepared. Mismatches assert in debug builds; release
    /// builds process only the common region.
    pub fn process(&mut self, input: &[&[T]], output: &mut [&mut [T]], bypassed: bool) {
        debug_assert_eq!(input.len(), output.len(), "input/output channel count mismatch");
        debug_assert!(
            !self.channels.is_empty(),
            "prepare() must be called before process()"
        );

        #[cfg(debug_assertions)]
        assert_no_alloc::assert_no_alloc(|| self.process_block(input, output, bypassed));
        #[cfg(not(debug_assertions))]
        self.process_block(input, output, bypassed);
    }

    /// Process a block in place.
    pub fn process_replacing(&mut self, buffer: &mut [&mut [T]], bypassed: bool) {
        debug_assert!(
            !self.channels.is_empty(),
            "prepare() must be called before process()"
        );

        let num_channels = buffer.len().min(self.channels.len());
        let num_samples = buffer[..num_channels]
            .iter()
            .map(|channel| channel.len())
            .min()
            .unwrap_or(0);

        self.latch_targets();

        if bypassed {
            self.skip_parameters(num_samples);
            return;
        }

        for i in 0..num_samples {
            self.step_parameters();
            let coeffs = &self.coefficients;
            let transform = self.transform_type;
            for (state, channel) in self.channels.iter_mut().zip(buffer.iter_mut()) {
                channel[i] = transform.process(coeffs, state, channel[i]);
            }
        }

        if self.snap_after_block {
            self.snap_to_zero();
        }
    }

    fn process_block(&mut self, input: &[&[T]], output: &mut [&mut [T]], bypassed: bool) {
        let num_channels = input.len().min(output.len()).min(self.channels.len());
        let num_samples = input[..num_channels]
            .iter()
            .map(|channel| channel.len())
            .chain(output[..num_channels].iter().map(|channel| channel.len()))
            .min()
            .unwrap_or(0);

        debug_assert!(
            input[..num_channels]
                .iter()
                .zip(output[..num_channels].iter())
                .all(|(i, o)| i.len() == o.len()),
            "input/output block length mismatch"
        );

        self.latch_targets();

        if bypassed {
            self.skip_parameters(num_samples);
            for (src, dst) in input.iter().zip(output.iter_mut()).take(num_channels) {
                dst[..num_samples].copy_from_slice(&src[..num_samples]);
            }
            return;
        }

        for i in 0..num_samples {
            self.step_parameters();
            let coeffs = &self.coefficients;
            let transform = self.transform_type;
            for ((state, src), dst) in self
                .channels
                .iter_mut()
                .zip(input.iter())
                .zip(output.iter_mut())
            {
                dst[i] = transform.process(coeffs, state, src[i]);
            }
        }

        if self.snap_after_block {
            self.snap_to_zero();
        }
    }

    /// Keep the ramps in time without touching the coefficients.
    #[inline]
    fn skip_parameters(&mut self, num_samples: usize) {
        self.frequency.skip(num_samples);
        self.gain.skip(num_samples);
    }

    fn configure_smoothers(&mut self) {
        self.frequency
            .set_ramp_length(self.sample_rate, self.ramp_duration_seconds);
        self.gain
            .set_ramp_length(self.sample_rate, self.ramp_duration_seconds);
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Magnitude response of the current coefficients at `frequency` Hz.
    pub fn magnitude_response(&self, frequency: f64) -> f64 {
        self.coefficients.magnitude_at(frequency, self.sample_rate)
    }

    pub fn coefficients(&self) -> &Coefficients<T> {
        &self.coefficients
    }

    pub fn channel_state(&self, channel: usize) -> Option<&ChannelState<T>> {
        self.channels.get(channel)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn maximum_block_size(&self) -> usize {
        self.maximum_block_size
    }

    pub fn current_frequency(&self) -> T {
        self.frequency.current()
    }

    pub fn current_gain(&self) -> T {
        self.gain.current()
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn transform_type(&self) -> TransformType {
        self.transform_type
    }
}

// =============================================================================
// Tests
// =============================================================================
