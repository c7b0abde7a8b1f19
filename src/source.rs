// src/source.rs
// Sample sources feeding the power binner

use crate::error::{DecodeError, Result};
use hound::{SampleFormat, WavReader, WavSpec};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Forward-only reader of interleaved audio frames.
pub trait SampleSource {
    fn channel_count(&self) -> u16;

    fn total_frame_count(&self) -> u64;

    /// Appends up to `frames * channel_count` samples to `out` and returns the number
    /// of samples appended. Fewer are appended only at end of stream.
    fn read_frames(&mut self, frames: usize, out: &mut Vec<f64>) -> Result<usize>;
}

/// WAV-backed source. Integer PCM is scaled to [-1, 1] by bit depth.
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    spec: WavSpec,
    scale: f64,
}

impl WavSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Opening WAV file: {:?}", path);
        Self::new(WavReader::open(path)?)
    }
}

impl<R: Read> WavSource<R> {
    pub fn new(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        log::info!("WAV spec: {:?}", spec);

        let scale = match spec.sample_format {
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(DecodeError::UnsupportedFormat(format!(
                        "{}-bit integer samples",
                        spec.bits_per_sample
                    )));
                }
                1.0 / (1u64 << (spec.bits_per_sample - 1)) as f64
            }
            SampleFormat::Float => 1.0,
        };

        Ok(Self {
            reader,
            spec,
            scale,
        })
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }
}

impl<R: Read> SampleSource for WavSource<R> {
    fn channel_count(&self) -> u16 {
        self.spec.channels
    }

    fn total_frame_count(&self) -> u64 {
        u64::from(self.reader.duration())
    }

    fn read_frames(&mut self, frames: usize, out: &mut Vec<f64>) -> Result<usize> {
        let wanted = frames.saturating_mul(usize::from(self.spec.channels));
        let before = out.len();
        match self.spec.sample_format {
            SampleFormat::Int => {
                for sample in self.reader.samples::<i32>().take(wanted) {
                    out.push(f64::from(sample?) * self.scale);
                }
            }
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(wanted) {
                    out.push(f64::from(sample?));
                }
            }
        }
        Ok(out.len() - before)
    }
}

/// In-memory interleaved samples, for synthetic signals and tests.
#[derive(Debug, Clone)]
pub struct MemorySource {
    channels: u16,
    samples: Vec<f64>,
    cursor: usize,
}

impl MemorySource {
    pub fn new(channels: u16, samples: Vec<f64>) -> Self {
        Self {
            channels,
            samples,
            cursor: 0,
        }
    }

    pub fn mono(samples: Vec<f64>) -> Self {
        Self::new(1, samples)
    }
}

impl SampleSource for MemorySource {
    fn channel_count(&self) -> u16 {
        self.channels
    }

    fn total_frame_count(&self) -> u64 {
        match self.channels {
            0 => 0,
            c => (self.samples.len() / usize::from(c)) as u64,
        }
    }

    fn read_frames(&mut self, frames: usize, out: &mut Vec<f64>) -> Result<usize> {
        let wanted = frames.saturating_mul(usize::from(self.channels));
        let end = self.cursor.saturating_add(wanted).min(self.samples.len());
        out.extend_from_slice(&self.samples[self.cursor..end]);
        let read = end - self.cursor;
        self.cursor = end;
        Ok(read)
    }
}
