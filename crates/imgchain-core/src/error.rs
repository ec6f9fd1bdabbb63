use thiserror::Error;

/// The taxonomy from the error handling design: codecs return result
/// records where they can, and raise this only at the boundaries that are
/// allowed to (key import, capacity checks at commit time, crypto backend
/// failures).
#[derive(Debug, Error)]
pub enum ImgChainError {
    #[error("invalid input: {0}")]
    InputError(String),

    #[error("capacity exceeded: {layer} needs {needed} bytes but only {available} are available")]
    CapacityExceeded {
        layer: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("crypto error: {0}")]
    CryptoError(String),

    #[error("unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, ImgChainError>;

impl ImgChainError {
    pub fn input(msg: impl Into<String>) -> Self {
        ImgChainError::InputError(msg.into())
    }

    pub fn crypto(msg: impl Into<String>) -> Self {
        ImgChainError::CryptoError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ImgChainError::InternalError(msg.into())
    }
}

/// Result of an LSB decode attempt after the 3x ECC layer has been applied.
/// This is a *result*, not an exception — CorruptionDetected in spec terms.
#[derive(Debug, Clone, PartialEq)]
pub struct CorruptionReport {
    pub recovered: bool,
    pub error_rate: f64,
}

/// Per-entry chain verification outcome. `ChainBroken` in spec terms is
/// carried as a diagnostic on the entry, never raised.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub version: u64,
    pub signature_valid: bool,
    pub chain_link_valid: bool,
    pub error: Option<String>,
}
