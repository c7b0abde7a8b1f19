//! Error types for the decoding pipeline

use thiserror::Error;

/// Structural failures that abort a decode. Calibration problems are not errors:
/// unmapped symbol groups show up as `_` in the decoded text instead.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => DecodeError::Io(e),
            hound::Error::FormatError(msg) => DecodeError::Format(msg.to_string()),
            hound::Error::Unsupported => {
                DecodeError::UnsupportedFormat("WAV encoding not supported".to_string())
            }
            hound::Error::TooWide => {
                DecodeError::UnsupportedFormat("sample too wide for target type".to_string())
            }
            other => DecodeError::Format(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
