use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("key material too short: {len} bytes (minimum 32)")]
    KeyTooShort { len: usize },

    #[error("HKDF output too large: {requested} bytes (maximum {})", 255 * 32)]
    OutputTooLarge { requested: usize },

    #[error("media key must be exactly 32 bytes, got {len}")]
    InvalidKeyLength { len: usize },

    #[error("unknown media type: {0}")]
    UnknownMediaType(String),

    #[error("chunk size must be non-zero, got {0}")]
    InvalidChunkSize(usize),

    #[error("malformed container: {len} bytes is shorter than the 10-byte tag")]
    MalformedContainer { len: usize },

    #[error("malformed sidecar: {len} bytes is not a multiple of 10")]
    MalformedSidecar { len: usize },

    #[error("MAC validation failed")]
    MacMismatch,

    #[error("cipher failure after authentication: {0}")]
    CipherFailure(String),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("source returned no data before end-of-data")]
    SourceStalled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Coarse classification of a [`MediaError`].
///
/// Lets callers tell "the data is corrupt or tampered" apart from "the API
/// was misused" and "the key material is bad" without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad key material, unknown media type, or an out-of-range parameter.
    InputValidation,
    /// Authentication tag did not verify.
    IntegrityFailure,
    /// Container or sidecar is structurally invalid.
    MalformedContainer,
    /// The block cipher rejected ciphertext that already authenticated.
    CipherFailure,
    /// Write/seek/rewind on a read-only stream, or use after close.
    UnsupportedOperation,
    /// The wrapped byte source failed.
    Source,
    /// Configuration could not be read or is invalid.
    Config,
}

impl MediaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::KeyTooShort { .. }
            | MediaError::OutputTooLarge { .. }
            | MediaError::InvalidKeyLength { .. }
            | MediaError::UnknownMediaType(_)
            | MediaError::InvalidChunkSize(_) => ErrorKind::InputValidation,
            MediaError::MacMismatch => ErrorKind::IntegrityFailure,
            MediaError::MalformedContainer { .. } | MediaError::MalformedSidecar { .. } => {
                ErrorKind::MalformedContainer
            }
            MediaError::CipherFailure(_) => ErrorKind::CipherFailure,
            MediaError::Unsupported(_) => ErrorKind::UnsupportedOperation,
            MediaError::Io(_) | MediaError::SourceStalled => ErrorKind::Source,
            MediaError::Config(_) => ErrorKind::Config,
        }
    }

    /// True when the failure means the data is corrupt or has been tampered with.
    pub fn is_integrity_failure(&self) -> bool {
        self.kind() == ErrorKind::IntegrityFailure
    }
}
