//! Error types for decoding, encoding and detection
//!
//! Codecs report [`FormatError`] without knowing which format they belong to;
//! the registry wraps it into [`ConvertError`] together with the format id so
//! every failure renders as a one-line diagnostic.

use crate::cursor::CursorError;
use crate::format::MacroFormat;

/// Failure inside a single format codec
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A recognised header carries a version or sub-variant we don't implement
    #[error("unsupported version {version}")]
    UnsupportedVersion { version: u32 },

    /// Required magic, header token or field is missing or malformed
    #[error("{0}")]
    StructuralMismatch(String),

    /// Buffer ended in the middle of a header or record
    #[error("truncated input: {0}")]
    TruncatedInput(#[from] CursorError),

    /// JSON document could not be parsed into the expected shape
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A numeric token in a text format didn't parse
    #[error("invalid number '{value}' on line {line}")]
    InvalidNumber { line: usize, value: String },

    /// The macro holds data the target format cannot encode
    #[error("cannot encode {0}")]
    Unrepresentable(String),
}

impl FormatError {
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        FormatError::StructuralMismatch(msg.into())
    }

    pub(crate) fn unrepresentable(msg: impl Into<String>) -> Self {
        FormatError::Unrepresentable(msg.into())
    }
}

/// Error surfaced by the conversion engine
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// No format could be inferred; the caller must choose one explicitly
    #[error("could not detect the macro format of '{file_name}', choose one manually")]
    DetectionAmbiguous { file_name: String },

    /// Decoding with an explicitly chosen or detected format failed
    #[error("failed to decode {format} macro: {source}")]
    Decode {
        format: MacroFormat,
        #[source]
        source: FormatError,
    },

    /// Encoding into the target format failed
    #[error("failed to encode {format} macro: {source}")]
    Encode {
        format: MacroFormat,
        #[source]
        source: FormatError,
    },
}

impl ConvertError {
    /// The underlying codec error, if any
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            ConvertError::DetectionAmbiguous { .. } => None,
            ConvertError::Decode { source, .. } | ConvertError::Encode { source, .. } => {
                Some(source)
            }
        }
    }

    /// Whether the caller can recover by picking a format manually
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConvertError::DetectionAmbiguous { .. })
    }
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, ConvertError>;
