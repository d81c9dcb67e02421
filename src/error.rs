//! Error types for registry-backed serialization
//!
//! All failures surface as variants of a single tagged error so that the
//! transport's transform callbacks have one error channel. Variants carry
//! owned strings rather than error sources so that a result can be cloned to
//! every waiter of a coalesced registry call.

use crate::schema::DataFormat;

/// Error type covering the codec, the registry client and the serde pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Encoded bytes are too short or the magic byte is not recognized.
    MalformedData { message: String },
    /// The compression byte of a frame maps to no registered algorithm.
    UnsupportedCompression { code: u8 },
    /// The schema's data format has no codec.
    UnsupportedFormat { format: DataFormat },
    /// The registry has no matching version and auto-registration is off.
    SchemaNotFound { name: String },
    /// The registry already holds a schema under this name.
    AlreadyExists { name: String },
    /// The registry rejected a new version against its compatibility rules.
    Evolution { name: String, reason: String },
    /// A newly created version converged on a terminal non-available status.
    RegistrationFailed { name: String, status: String },
    /// An operation deadline or the polling budget was exceeded.
    Timeout { message: String },
    /// The underlying registry RPC failed.
    Transport { message: String },
    /// The caller handed the pipeline a value it cannot interpret.
    InvalidInput { message: String },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::MalformedData { message } => {
                write!(f, "Malformed data: {}", message)
            }
            SchemaError::UnsupportedCompression { code } => {
                write!(f, "Unsupported compression byte: {:#04x}", code)
            }
            SchemaError::UnsupportedFormat { format } => {
                write!(f, "Unsupported data format: {}", format)
            }
            SchemaError::SchemaNotFound { name } => {
                write!(f, "Schema not found in registry: {}", name)
            }
            SchemaError::AlreadyExists { name } => {
                write!(f, "Schema already exists in registry: {}", name)
            }
            SchemaError::Evolution { name, reason } => {
                write!(f, "Schema evolution rejected for {}: {}", name, reason)
            }
            SchemaError::RegistrationFailed { name, status } => {
                write!(f, "Schema registration failed for {}: status {}", name, status)
            }
            SchemaError::Timeout { message } => write!(f, "Timed out: {}", message),
            SchemaError::Transport { message } => {
                write!(f, "Registry transport error: {}", message)
            }
            SchemaError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

pub type SchemaResult<T> = Result<T, SchemaError>;

impl SchemaError {
    /// Wrap an arbitrary RPC failure, keeping only its rendered message.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        SchemaError::Transport {
            message: err.to_string(),
        }
    }
}
