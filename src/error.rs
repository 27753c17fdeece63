use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Unsupported image format: {0}. Use a lossless format (png, bmp, tiff)")]
    UnsupportedFormat(String),

    #[error("Invalid sample grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid encoding parameters: {0}")]
    InvalidParameters(String),

    #[error("Payload does not fit: need {needed_bits} bits, carrier holds {available_bits} bits")]
    CapacityExceeded { needed_bits: u64, available_bits: u64 },

    #[error("Carrier truncated: header declares {declared_bits} payload bits, only {available_bits} remain")]
    TruncatedCarrier { declared_bits: u64, available_bits: u64 },

    #[error("Bit count {0} is not a multiple of 8")]
    MalformedLength(usize),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Invalid part count: {0}. Must be between 2 and 10")]
    InvalidPartCount(usize),

    #[error("Incomplete share set: have {present} of {expected} shares, missing indices {missing:?}")]
    IncompleteShareSet {
        expected: usize,
        present: usize,
        missing: Vec<usize>,
    },

    #[error("Share {0} supplied more than once")]
    DuplicateShare(usize),

    #[error("Decryption failed: wrong password or corrupted payload")]
    WrongPassword,

    #[error("Encrypted payload too short: need at least {minimum} bytes, got {actual}")]
    EncryptedPayloadTooShort { minimum: usize, actual: usize },

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Share {index} has {actual} bytes, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, StegError>;
