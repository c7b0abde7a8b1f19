// src/decoder.rs
// Pipeline driver: bins -> symbols -> text

use crate::binner::bin_power;
use crate::classifier::power_to_symbols;
use crate::config::DecoderConfig;
use crate::error::{DecodeError, Result};
use crate::source::{SampleSource, WavSource};
use crate::table;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Placeholder emitted for symbol groups missing from the code table.
pub const UNKNOWN_CHAR: char = '_';

/// Output of one decode: the intermediate symbol string and the text it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub symbols: String,
    pub text: String,
    /// Number of power bins measured.
    pub bins: usize,
    /// Symbol groups that fell back to `UNKNOWN_CHAR`.
    pub unmapped: usize,
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.symbols, self.text)
    }
}

/// Translates a dot/dash/space string into text. Groups are separated by spaces;
/// empty groups contribute nothing and unknown groups become `UNKNOWN_CHAR`.
pub fn symbols_to_text(symbols: &str) -> String {
    decode_groups(symbols).0
}

fn decode_groups(symbols: &str) -> (String, usize) {
    let mut unmapped = 0;
    let text = symbols
        .split(' ')
        .filter(|group| !group.is_empty())
        .map(|group| {
            table::lookup(group).unwrap_or_else(|| {
                log::debug!("No mapping for symbol group {:?}", group);
                unmapped += 1;
                UNKNOWN_CHAR
            })
        })
        .collect();
    (text, unmapped)
}

pub struct MorseDecoder {
    config: DecoderConfig,
    trace_path: Option<PathBuf>,
}

impl MorseDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            trace_path: None,
        }
    }

    /// Also write a bar chart of the bin powers against the threshold to `path`.
    pub fn with_trace<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.trace_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Runs binning, run classification and table lookup over a mono source.
    pub fn decode<S: SampleSource + ?Sized>(&self, source: &mut S) -> Result<Decoded> {
        let channels = source.channel_count();
        if channels != 1 {
            return Err(DecodeError::UnsupportedFormat(format!(
                "expected exactly one channel, found {channels}"
            )));
        }

        // 1. Power per bin
        let powers = bin_power(source, self.config.bin_size, self.config.measure)?;
        log::info!(
            "Measured {} bins of {} frames ({:?})",
            powers.len(),
            self.config.bin_size,
            self.config.measure
        );

        if let Some(path) = &self.trace_path {
            trace_power(path, &powers, self.config.power_threshold)?;
            log::info!("Wrote power trace to {:?}", path);
        }

        // 2. Runs to dots, dashes and spaces
        let symbols = power_to_symbols(
            &powers,
            self.config.power_threshold,
            self.config.dash_bin_count,
        );
        log::debug!("Symbols: {:?}", symbols);

        // 3. Table lookup
        let (text, unmapped) = decode_groups(&symbols);
        if unmapped > 0 {
            log::warn!(
                "{} symbol group(s) had no mapping; threshold {} or dash bin count {} may need recalibration",
                unmapped,
                self.config.power_threshold,
                self.config.dash_bin_count
            );
        }

        Ok(Decoded {
            symbols,
            text,
            bins: powers.len(),
            unmapped,
        })
    }
}

impl Default for MorseDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

/// Decodes a mono WAV file with the default parameters.
pub fn decode_wav_file<P: AsRef<Path>>(path: P) -> Result<Decoded> {
    let mut source = WavSource::open(path)?;
    MorseDecoder::default().decode(&mut source)
}

/// One line per bin: `#` bars scaled to the larger of the peak power and the
/// threshold, with `|` marking the threshold.
fn trace_power(path: &Path, powers: &[f64], threshold: f64) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "# Bins: {}, Threshold: {:.4e}", powers.len(), threshold)?;
    let max_val = powers.iter().copied().fold(threshold, f64::max);
    if max_val <= 0.0 {
        return file.flush();
    }

    let thresh_pos = ((threshold / max_val) * 100.0).round().max(0.0) as usize;
    for &val in powers {
        let bar_len = ((val / max_val) * 100.0).round().max(0.0) as usize;
        let mut line = vec![' '; 101];
        for cell in line.iter_mut().take(bar_len.min(100)) {
            *cell = '#';
        }
        if thresh_pos <= 100 {
            line[thresh_pos] = '|';
        }
        writeln!(file, "{}", line.into_iter().collect::<String>().trim_end())?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use std::num::NonZeroUsize;

    fn tone_source(pattern: &[(bool, usize)], bin_size: usize) -> MemorySource {
        let samples = pattern
            .iter()
            .flat_map(|&(on, bins)| {
                std::iter::repeat_n(if on { 0.5 } else { 0.0 }, bins * bin_size)
            })
            .collect();
        MemorySource::mono(samples)
    }

    #[test]
    fn test_hello() {
        assert_eq!(symbols_to_text(".... . .-.. .-.. ---"), "hello");
    }

    #[test]
    fn test_unmapped_group_keeps_going() {
        assert_eq!(symbols_to_text(".-.- ..."), "_s");
        assert_eq!(symbols_to_text("... .-.- ..."), "s_s");
        assert_eq!(decode_groups("........ .-.- -").1, 2);
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        assert_eq!(symbols_to_text(""), "");
        assert_eq!(symbols_to_text(" "), "");
        assert_eq!(symbols_to_text("  ...   ---  ... "), "sos");
    }

    #[test]
    fn test_decoding_is_idempotent() {
        let symbols = "-.-. --.- .-.- .-.-.-";
        let first = symbols_to_text(symbols);
        assert_eq!(first, symbols_to_text(symbols));
        assert_eq!(first, "cq_.");
    }

    #[test]
    fn test_rejects_stereo() {
        let mut source = MemorySource::new(2, vec![0.0; 400]);
        let err = MorseDecoder::default().decode(&mut source).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_oversized_bin_size_is_format_error() {
        let config = DecoderConfig {
            bin_size: NonZeroUsize::MAX,
            ..DecoderConfig::default()
        };
        let mut source = tone_source(&[(true, 1)], 100);
        let err = MorseDecoder::new(config).decode(&mut source).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)), "{err:?}");
    }

    #[test]
    fn test_empty_source() {
        let decoded = MorseDecoder::default()
            .decode(&mut MemorySource::mono(Vec::new()))
            .unwrap();
        assert_eq!(decoded.symbols, "");
        assert_eq!(decoded.text, "");
        assert_eq!(decoded.bins, 0);
        assert_eq!(decoded.to_string(), "\n");
    }

    #[test]
    fn test_decode_sos() {
        // ... --- ... with dot = 1 bin, dash/space = 8 bins
        let dot = [(true, 1), (false, 1)];
        let dash = [(true, 8), (false, 1)];
        let mut pattern = Vec::new();
        for letter in [&dot, &dash, &dot] {
            for _ in 0..3 {
                pattern.extend_from_slice(letter);
            }
            pattern.push((false, 7));
        }
        let mut source = tone_source(&pattern, 100);
        let decoded = MorseDecoder::default().decode(&mut source).unwrap();
        assert_eq!(decoded.symbols, "... --- ... ");
        assert_eq!(decoded.text, "sos");
        assert_eq!(decoded.unmapped, 0);
    }

    #[test]
    fn test_custom_bin_size() {
        let config = DecoderConfig {
            bin_size: NonZeroUsize::new(40).unwrap(),
            dash_bin_count: 3,
            ..DecoderConfig::default()
        };
        let mut source = tone_source(&[(true, 3), (false, 3), (true, 1)], 40);
        let decoded = MorseDecoder::new(config).decode(&mut source).unwrap();
        assert_eq!(decoded.symbols, "- .");
        assert_eq!(decoded.text, "te");
    }

    #[test]
    fn test_trace_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.txt");
        let mut source = tone_source(&[(true, 2), (false, 2)], 100);
        MorseDecoder::default()
            .with_trace(&path)
            .decode(&mut source)
            .unwrap();

        let trace = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("# Bins: 4"));
        assert!(lines[1].starts_with('#'));
        assert!(lines[1].contains('|'));
        assert_eq!(lines[3].trim(), "|");
    }
}
