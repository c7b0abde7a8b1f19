// src/binner.rs
// Fixed-width power binning over a sample source

use crate::config::PowerMeasure;
use crate::error::{DecodeError, Result};
use crate::source::SampleSource;
use std::num::NonZeroUsize;

/// Largest bin count a single pass will process. WAV durations are 32-bit frame
/// counts, so every WAV file fits even at one frame per bin.
pub const MAX_BINS: usize = u32::MAX as usize;

/// Largest number of samples (frames x channels) held for one bin.
pub const MAX_BIN_SAMPLES: usize = 1 << 24;

// Upper bound on up-front reservation; longer inputs grow the buffer as they are read.
const POWER_RESERVE_LIMIT: usize = 1 << 20;

/// Number of bins covering `total_frames`, counting a trailing partial bin.
pub fn bin_count(total_frames: u64, bin_size: NonZeroUsize) -> Result<usize> {
    let bins = total_frames.div_ceil(bin_size.get() as u64);
    usize::try_from(bins)
        .ok()
        .filter(|&bins| bins <= MAX_BINS)
        .ok_or_else(|| {
            DecodeError::Format(format!(
                "{total_frames} frames in bins of {bin_size} exceed the {MAX_BINS} bin limit"
            ))
        })
}

/// Samples read per full bin, checked against `MAX_BIN_SAMPLES`.
pub fn bin_samples(bin_size: NonZeroUsize, channels: u16) -> Result<usize> {
    bin_size
        .get()
        .checked_mul(usize::from(channels))
        .filter(|&samples| samples <= MAX_BIN_SAMPLES)
        .ok_or_else(|| {
            DecodeError::Format(format!(
                "bins of {bin_size} frames x {channels} channel(s) exceed {MAX_BIN_SAMPLES} samples"
            ))
        })
}

/// Reads `source` to the end, one bin at a time, and returns one power value per bin.
///
/// Every bin holds `bin_size` frames except possibly the last, which holds the remainder.
/// A source that runs dry before its advertised frame count is an IO error.
pub fn bin_power<S: SampleSource + ?Sized>(
    source: &mut S,
    bin_size: NonZeroUsize,
    measure: PowerMeasure,
) -> Result<Vec<f64>> {
    let total_frames = source.total_frame_count();
    let channels = source.channel_count();
    let total_bins = bin_count(total_frames, bin_size)?;
    let samples_per_bin = bin_samples(bin_size, channels)?;
    log::debug!(
        "Binning {} frames x {} channel(s) into {} bins of {}",
        total_frames,
        channels,
        total_bins,
        bin_size
    );

    let channels = usize::from(channels);
    let bin_size = bin_size.get() as u64;
    let mut powers = Vec::with_capacity(total_bins.min(POWER_RESERVE_LIMIT));
    let mut sample_buffer = Vec::with_capacity(samples_per_bin);
    let mut frames_left = total_frames;

    for bin_index in 0..total_bins {
        // Never exceeds bin_size, so it fits in usize and frames * channels cannot overflow.
        let frames = frames_left.min(bin_size) as usize;
        sample_buffer.clear();
        let read = source.read_frames(frames, &mut sample_buffer)?;
        let expected = frames * channels;
        if read < expected {
            return Err(DecodeError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("bin {bin_index}: expected {expected} samples, got {read}"),
            )));
        }
        powers.push(sample_buffer.iter().map(|&s| measure.of(s)).sum());
        frames_left -= frames as u64;
    }

    Ok(powers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_bin_count_rounds_up() {
        assert_eq!(bin_count(0, nz(100)).unwrap(), 0);
        assert_eq!(bin_count(1, nz(100)).unwrap(), 1);
        assert_eq!(bin_count(100, nz(100)).unwrap(), 1);
        assert_eq!(bin_count(101, nz(100)).unwrap(), 2);
        assert_eq!(bin_count(1000, nz(100)).unwrap(), 10);
    }

    #[test]
    fn test_partial_last_bin() {
        // Every sample has magnitude 1, so each power equals the bin's sample count.
        for frames in [0usize, 1, 7, 10, 23, 30, 99] {
            let mut source = MemorySource::mono(vec![-1.0; frames]);
            let powers = bin_power(&mut source, nz(10), PowerMeasure::Magnitude).unwrap();
            assert_eq!(powers.len(), frames.div_ceil(10));
            if let Some(&last) = powers.last() {
                let expected = if frames % 10 == 0 { 10 } else { frames % 10 };
                assert_eq!(last, expected as f64);
            }
            assert_eq!(powers.iter().sum::<f64>(), frames as f64);
        }
    }

    #[test]
    fn test_sums_all_channels() {
        let mut source = MemorySource::new(2, vec![0.5, -0.5, 1.0, -1.0, 0.25, 0.25]);
        let powers = bin_power(&mut source, nz(2), PowerMeasure::Magnitude).unwrap();
        assert_eq!(powers, vec![3.0, 0.5]);
    }

    #[test]
    fn test_energy_measure() {
        let mut source = MemorySource::mono(vec![0.5, -0.5, 2.0]);
        let powers = bin_power(&mut source, nz(2), PowerMeasure::Energy).unwrap();
        assert_eq!(powers, vec![0.5, 4.0]);
    }

    struct ShortSource;

    impl SampleSource for ShortSource {
        fn channel_count(&self) -> u16 {
            1
        }

        fn total_frame_count(&self) -> u64 {
            50
        }

        fn read_frames(&mut self, frames: usize, out: &mut Vec<f64>) -> Result<usize> {
            let n = frames.min(5);
            out.extend(std::iter::repeat_n(0.0, n));
            Ok(n)
        }
    }

    struct HugeSource {
        channels: u16,
        frames: u64,
    }

    impl SampleSource for HugeSource {
        fn channel_count(&self) -> u16 {
            self.channels
        }

        fn total_frame_count(&self) -> u64 {
            self.frames
        }

        fn read_frames(&mut self, _frames: usize, _out: &mut Vec<f64>) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_oversized_frame_count_is_format_error() {
        let mut source = HugeSource {
            channels: 1,
            frames: u64::MAX,
        };
        let err = bin_power(&mut source, nz(100), PowerMeasure::Magnitude).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)), "{err:?}");

        assert!(matches!(
            bin_count(MAX_BINS as u64 + 1, nz(1)),
            Err(DecodeError::Format(_))
        ));
        assert_eq!(bin_count(MAX_BINS as u64, nz(1)).unwrap(), MAX_BINS);
    }

    #[test]
    fn test_oversized_bin_is_format_error() {
        let mut source = HugeSource {
            channels: 2,
            frames: 10,
        };
        let err = bin_power(&mut source, nz(usize::MAX), PowerMeasure::Magnitude).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)), "{err:?}");

        assert!(matches!(
            bin_samples(nz(MAX_BIN_SAMPLES), 2),
            Err(DecodeError::Format(_))
        ));
        assert_eq!(bin_samples(nz(MAX_BIN_SAMPLES / 2), 2).unwrap(), MAX_BIN_SAMPLES);
    }

    #[test]
    fn test_large_frame_count_fails_on_first_read() {
        // Within the bin limit, but far more than should be reserved up front.
        let mut source = HugeSource {
            channels: 1,
            frames: MAX_BINS as u64 * 100,
        };
        let err = bin_power(&mut source, nz(100), PowerMeasure::Magnitude).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)), "{err:?}");
    }

    #[test]
    fn test_truncated_source_is_io_error() {
        let err = bin_power(&mut ShortSource, nz(10), PowerMeasure::Magnitude).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
