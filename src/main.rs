use anyhow::{Context, Result};
use clap::Parser;
use dotdash::config::{DEFAULT_BIN_SIZE, DEFAULT_DASH_BIN_COUNT, DEFAULT_POWER_THRESHOLD};
use dotdash::{DecoderConfig, MorseDecoder, PowerMeasure, WavSource};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the input WAV file (mono)
    #[arg(value_name = "WAV_FILE")]
    wav_file: PathBuf,

    /// Frames per power bin
    #[arg(long, default_value_t = DEFAULT_BIN_SIZE)]
    bin_size: NonZeroUsize,

    /// Bin power above which a bin counts as tone
    #[arg(long, default_value_t = DEFAULT_POWER_THRESHOLD)]
    threshold: f64,

    /// Run length in bins separating dots from dashes and gaps from spaces
    #[arg(long, default_value_t = DEFAULT_DASH_BIN_COUNT)]
    dash_bins: usize,

    /// How samples in a bin are combined into its power
    #[arg(long, value_enum, default_value_t = PowerMeasure::Magnitude)]
    measure: PowerMeasure,

    /// Write a per-bin power chart to this file
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Set up logging. Use `RUST_LOG=info` or `RUST_LOG=debug` to see output.
    env_logger::init();
    let cli = Cli::parse();

    let config = DecoderConfig {
        bin_size: cli.bin_size,
        power_threshold: cli.threshold,
        dash_bin_count: cli.dash_bins,
        measure: cli.measure,
    };
    let mut decoder = MorseDecoder::new(config);
    if let Some(path) = cli.trace {
        decoder = decoder.with_trace(path);
    }
    log::info!("Decoder config: {:?}", decoder.config());

    let mut source = WavSource::open(&cli.wav_file)
        .with_context(|| format!("failed to open {:?}", cli.wav_file))?;
    let decoded = decoder
        .decode(&mut source)
        .with_context(|| format!("failed to decode {:?}", cli.wav_file))?;

    println!("{}", decoded);

    Ok(())
}
