// src/generator.rs
// Bin-aligned synthetic Morse signals for testing and calibration

use crate::config::DecoderConfig;
use crate::error::Result;
use crate::source::MemorySource;
use crate::table;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f64::consts::PI;
use std::path::Path;

/// Renders text as tone/silence whose timing lines up with the decoder's bins:
/// a dot is one bin of tone, a dash `dash_bin_count` bins, the gap inside a
/// character one bin and the gap between characters `dash_bin_count` bins.
pub struct MorseGenerator {
    sample_rate: u32,
    frequency: f64,
    amplitude: f64,
    bin_size: usize,
    dash_bins: usize,
}

impl MorseGenerator {
    pub fn new(config: &DecoderConfig, sample_rate: u32, frequency: f64) -> Self {
        Self {
            sample_rate,
            frequency,
            amplitude: 0.5, // 50% amplitude to avoid clipping
            bin_size: config.bin_size.get(),
            dash_bins: config.dash_bin_count,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Characters missing from the code table are skipped. Whitespace only
    /// separates characters; there is no separate word gap.
    pub fn text_to_symbols(&self, text: &str) -> String {
        text.chars()
            .filter_map(table::encode_char)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn text_to_elements(&self, text: &str) -> Vec<MorseElement> {
        let mut result = Vec::new();
        for (char_idx, code) in self.text_to_symbols(text).split(' ').enumerate() {
            if code.is_empty() {
                continue;
            }
            if char_idx > 0 {
                result.push(MorseElement::LetterGap);
            }
            for (elem_idx, morse_char) in code.chars().enumerate() {
                if elem_idx > 0 {
                    result.push(MorseElement::ElementGap);
                }
                match morse_char {
                    '.' => result.push(MorseElement::Dot),
                    '-' => result.push(MorseElement::Dash),
                    _ => {}
                }
            }
        }
        result
    }

    /// Mono samples in [-amplitude, amplitude].
    pub fn generate_samples(&self, text: &str) -> Vec<f64> {
        let mut samples = Vec::new();
        for element in self.text_to_elements(text) {
            let bins = match element {
                MorseElement::Dot | MorseElement::ElementGap => 1,
                MorseElement::Dash | MorseElement::LetterGap => self.dash_bins,
            };
            let len = bins * self.bin_size;
            if element.is_tone() {
                self.write_tone(&mut samples, len);
            } else {
                samples.resize(samples.len() + len, 0.0);
            }
        }
        samples
    }

    pub fn generate_source(&self, text: &str) -> MemorySource {
        MemorySource::mono(self.generate_samples(text))
    }

    /// Writes the signal as a 16-bit mono WAV file.
    pub fn generate_wav_file<P: AsRef<Path>>(&self, text: &str, path: P) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for sample in self.generate_samples(text) {
            writer.write_sample((sample * i16::MAX as f64) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }

    fn write_tone(&self, samples: &mut Vec<f64>, len: usize) {
        // Phase restarts with every element.
        let step = 2.0 * PI * self.frequency / self.sample_rate as f64;
        samples.extend((0..len).map(|i| self.amplitude * (step * i as f64).sin()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseElement {
    Dot,
    Dash,
    ElementGap,
    LetterGap,
}

impl MorseElement {
    pub fn is_tone(self) -> bool {
        matches!(self, MorseElement::Dot | MorseElement::Dash)
    }
}
