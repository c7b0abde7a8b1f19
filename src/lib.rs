// src/lib.rs
// Library interface for dotdash

pub mod binner;
pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod generator;
pub mod source;
pub mod table;

pub use config::{DecoderConfig, PowerMeasure};
pub use decoder::{decode_wav_file, symbols_to_text, Decoded, MorseDecoder};
pub use error::{DecodeError, Result};
pub use generator::MorseGenerator;
pub use source::{MemorySource, SampleSource, WavSource};
