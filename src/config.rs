// src/config.rs
// Tunable decoding parameters

use std::num::NonZeroUsize;

/// Frames aggregated into one power measurement.
pub const DEFAULT_BIN_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();
/// Tone/silence boundary, calibrated for `PowerMeasure::Magnitude` over samples in [-1, 1].
pub const DEFAULT_POWER_THRESHOLD: f64 = 10.0;
/// Run length (in bins) at which a tone becomes a dash and a silence becomes a space.
pub const DEFAULT_DASH_BIN_COUNT: usize = 8;

/// How the samples of one bin are folded into a single power value.
///
/// The threshold is expressed in the units of the chosen measure, so switching
/// measure means recalibrating `power_threshold` as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PowerMeasure {
    /// Sum of absolute sample values.
    #[default]
    Magnitude,
    /// Sum of squared sample values.
    Energy,
}

impl PowerMeasure {
    #[inline]
    pub fn of(self, sample: f64) -> f64 {
        match self {
            PowerMeasure::Magnitude => sample.abs(),
            PowerMeasure::Energy => sample * sample,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoderConfig {
    pub bin_size: NonZeroUsize,
    pub power_threshold: f64,
    pub dash_bin_count: usize,
    pub measure: PowerMeasure,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            bin_size: DEFAULT_BIN_SIZE,
            power_threshold: DEFAULT_POWER_THRESHOLD,
            dash_bin_count: DEFAULT_DASH_BIN_COUNT,
            measure: PowerMeasure::default(),
        }
    }
}
