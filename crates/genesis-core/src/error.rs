//! Error types for genesis construction and mining.

use thiserror::Error;

/// Errors raised while building a genesis block or searching for its nonce.
///
/// All of these are fatal for the run. Everything except
/// [`GenesisError::NonceSpaceExhausted`] and [`GenesisError::Cancelled`] is
/// reported before any hashing starts.
#[derive(Error, Debug)]
pub enum GenesisError {
    /// The requested PoW algorithm is not one of the supported names.
    #[error("Unsupported algorithm {0:?}, expected one of: SHA256, scrypt, X11, X13, X15, SWIFFT")]
    UnsupportedAlgorithm(String),

    /// The native backend for an algorithm could not be loaded.
    #[error("{algorithm} backend unavailable: {reason}")]
    AlgorithmUnavailable {
        /// Algorithm whose backend is missing.
        algorithm: String,
        /// Loader error.
        reason: String,
    },

    /// Malformed input to the script or transaction encoders.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Compact bits that do not describe a usable target.
    #[error("Invalid difficulty bits {0:#010x}")]
    InvalidDifficulty(u32),

    /// Every nonce for the given header time was tried without success.
    #[error("Nonce space exhausted at time {time} (started from nonce {start_nonce})")]
    NonceSpaceExhausted {
        /// Header time that was being searched.
        time: u32,
        /// First nonce of the search.
        start_nonce: u32,
    },

    /// The search was cancelled by the caller.
    #[error("Search cancelled")]
    Cancelled,

    /// A hash backend rejected its input or parameters.
    #[error("Hash backend error: {0}")]
    Backend(String),
}

/// Result type for genesis operations.
pub type Result<T> = std::result::Result<T, GenesisError>;
