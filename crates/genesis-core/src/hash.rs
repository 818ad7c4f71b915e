//! SHA256 double-hashing and the pluggable proof-of-work hash backends.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::block::BLOCK_HEADER_SIZE;
use crate::config::BackendConfig;
use crate::error::{GenesisError, Result};
use crate::native::{NativeHasher, NativeLibrary};

/// Bitcoin's double SHA256: SHA256(SHA256(data)).
///
/// This is used for block header hashing, transaction IDs, and the merkle root.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Reverse the byte order of a 32-byte array.
///
/// Bitcoin displays hashes in reverse byte order.
#[inline]
pub fn reverse_bytes(bytes: &[u8; 32]) -> [u8; 32] {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Double SHA256 of a header in display byte order.
#[inline]
pub fn header_hash(header: &[u8; BLOCK_HEADER_SIZE]) -> [u8; 32] {
    reverse_bytes(&double_sha256(header))
}

/// Convert an internal-order hash to its display format (reversed hex).
pub fn hash_to_display_hex(hash: &[u8; 32]) -> String {
    hex::encode(reverse_bytes(hash))
}

/// A proof-of-work hash function over serialized block headers.
///
/// Digests are written in the byte order they are compared in: the first
/// byte is the most significant when the digest is read as an integer.
/// Implementations must be callable from several mining threads at once.
pub trait PowHasher: Send + Sync {
    /// The algorithm this hasher implements.
    fn algorithm(&self) -> Algorithm;

    /// Length of the digest written by [`PowHasher::compute`].
    fn digest_len(&self) -> usize;

    /// Hash `header` into `out`, which is exactly `digest_len()` bytes long.
    fn compute(&self, header: &[u8; BLOCK_HEADER_SIZE], out: &mut [u8]);
}

/// Double SHA256, byte-reversed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256dHasher;

impl PowHasher for Sha256dHasher {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sha256
    }

    fn digest_len(&self) -> usize {
        32
    }

    #[inline]
    fn compute(&self, header: &[u8; BLOCK_HEADER_SIZE], out: &mut [u8]) {
        out.copy_from_slice(&header_hash(header));
    }
}

/// scrypt(N=1024, r=1, p=1) salted with the header itself, byte-reversed.
#[derive(Debug, Clone)]
pub struct ScryptHasher {
    params: scrypt::Params,
}

impl ScryptHasher {
    /// log2 of the scrypt cost parameter N = 1024.
    pub const LOG_N: u8 = 10;
    /// Block size parameter.
    pub const R: u32 = 1;
    /// Parallelization parameter.
    pub const P: u32 = 1;
    /// Digest length.
    pub const OUTPUT_LEN: usize = 32;

    /// Create a hasher with the Litecoin parameters.
    pub fn new() -> Result<Self> {
        let params = scrypt::Params::new(Self::LOG_N, Self::R, Self::P, Self::OUTPUT_LEN)
            .map_err(|e| GenesisError::Backend(format!("scrypt parameters: {}", e)))?;
        Ok(ScryptHasher { params })
    }
}

impl PowHasher for ScryptHasher {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Scrypt
    }

    fn digest_len(&self) -> usize {
        Self::OUTPUT_LEN
    }

    fn compute(&self, header: &[u8; BLOCK_HEADER_SIZE], out: &mut [u8]) {
        // scrypt only rejects an output length that differs from the params.
        debug_assert_eq!(out.len(), Self::OUTPUT_LEN);
        let result = scrypt::scrypt(header, header, &self.params, out);
        debug_assert!(result.is_ok());
        out.reverse();
    }
}

/// Bind the hasher for `algorithm`, loading native backends eagerly.
///
/// Native libraries are opened here so a missing backend is reported before
/// any mining starts.
pub fn load_hasher(algorithm: Algorithm, backends: &BackendConfig) -> Result<Box<dyn PowHasher>> {
    let hasher: Box<dyn PowHasher> = match algorithm {
        Algorithm::Sha256 => Box::new(Sha256dHasher),
        Algorithm::Scrypt => Box::new(ScryptHasher::new()?),
        Algorithm::X11 | Algorithm::X13 | Algorithm::X15 | Algorithm::Swifft => {
            let spec = backends.native_spec(algorithm);
            let library = NativeLibrary::open(algorithm, &spec.library)?;
            Box::new(NativeHasher::bind(algorithm, library, &spec.symbol)?)
        }
    };

    debug!(
        algorithm = %algorithm,
        digest_len = hasher.digest_len(),
        "Hash backend ready"
    );

    Ok(hasher)
}
