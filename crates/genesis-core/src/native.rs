//! Native hash backends loaded from shared libraries.
//!
//! X11, X13, X15 and SWIFFT have no Rust implementation here; they are bound
//! from C libraries at startup. Each library is held by an owned
//! [`NativeLibrary`] handle that lives exactly as long as the hasher using it.
//!
//! Expected exports:
//! - X-family: `void <symbol>(const uint8_t *input80, uint8_t *output32)`
//! - SWIFFT: `void SWIFFT_Compute(const uint8_t input[256], uint8_t output[128])`
//!
//! The functions must be reentrant, since parallel searches call them from
//! several threads.

use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::block::BLOCK_HEADER_SIZE;
use crate::error::{GenesisError, Result};
use crate::hash::PowHasher;

/// SWIFFT input block size in bytes.
pub const SWIFFT_INPUT_SIZE: usize = 256;

/// SWIFFT output block size in bytes.
pub const SWIFFT_OUTPUT_SIZE: usize = 128;

/// Length of the reduced SWIFFT digest.
pub const SWIFFT_DIGEST_SIZE: usize = SWIFFT_OUTPUT_SIZE / 2;

/// Digest length of the X-family functions.
pub const X_DIGEST_SIZE: usize = 32;

type HashFn = unsafe extern "C" fn(input: *const u8, output: *mut u8);

/// An open shared library providing a hash backend.
#[derive(Debug)]
pub struct NativeLibrary {
    algorithm: Algorithm,
    path: PathBuf,
    library: Library,
}

impl NativeLibrary {
    /// Open the library at `path` for `algorithm`.
    pub fn open(algorithm: Algorithm, path: &Path) -> Result<Self> {
        // SAFETY: loading runs the library's initializers; the configured
        // backend libraries are plain hash implementations.
        let library = unsafe { Library::new(path) }.map_err(|e| GenesisError::AlgorithmUnavailable {
            algorithm: algorithm.name().to_string(),
            reason: format!("cannot load {}: {}", path.display(), e),
        })?;

        debug!(algorithm = %algorithm, path = %path.display(), "Loaded native hash library");

        Ok(NativeLibrary {
            algorithm,
            path: path.to_path_buf(),
            library,
        })
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a hash function exported by the library.
    fn resolve(&self, symbol: &str) -> Result<HashFn> {
        // SAFETY: the symbol is declared with the backend's C signature; the
        // returned pointer is only called while `self.library` is alive.
        let function = unsafe { self.library.get::<HashFn>(symbol.as_bytes()) }.map_err(|e| {
            GenesisError::AlgorithmUnavailable {
                algorithm: self.algorithm.name().to_string(),
                reason: format!("symbol {} not found in {}: {}", symbol, self.path.display(), e),
            }
        })?;
        Ok(*function)
    }

    /// Unload the library, reporting any error from the platform loader.
    pub fn close(self) -> Result<()> {
        let algorithm = self.algorithm;
        self.library.close().map_err(|e| GenesisError::Backend(format!(
            "failed to unload {} library: {}",
            algorithm, e
        )))
    }
}

/// A proof-of-work hasher backed by a native library function.
#[derive(Debug)]
pub struct NativeHasher {
    algorithm: Algorithm,
    function: HashFn,
    // Must outlive `function`.
    library: NativeLibrary,
}

impl NativeHasher {
    /// Resolve `symbol` in `library` and wrap it as the hasher for `algorithm`.
    pub fn bind(algorithm: Algorithm, library: NativeLibrary, symbol: &str) -> Result<Self> {
        if !algorithm.is_native() {
            return Err(GenesisError::AlgorithmUnavailable {
                algorithm: algorithm.name().to_string(),
                reason: "algorithm has no native backend".to_string(),
            });
        }
        let function = library.resolve(symbol)?;
        Ok(NativeHasher {
            algorithm,
            function,
            library,
        })
    }

    /// The library backing this hasher.
    pub fn library(&self) -> &NativeLibrary {
        &self.library
    }

    /// Drop the function binding and unload the library.
    pub fn close(self) -> Result<()> {
        self.library.close()
    }
}

impl PowHasher for NativeHasher {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn digest_len(&self) -> usize {
        match self.algorithm {
            Algorithm::Swifft => SWIFFT_DIGEST_SIZE,
            _ => X_DIGEST_SIZE,
        }
    }

    fn compute(&self, header: &[u8; BLOCK_HEADER_SIZE], out: &mut [u8]) {
        match self.algorithm {
            Algorithm::Swifft => {
                let mut input = [0u8; SWIFFT_INPUT_SIZE];
                input[..BLOCK_HEADER_SIZE].copy_from_slice(header);
                let mut output = [0u8; SWIFFT_OUTPUT_SIZE];
                // SAFETY: both buffers have the sizes SWIFFT_Compute expects.
                unsafe { (self.function)(input.as_ptr(), output.as_mut_ptr()) };
                out.copy_from_slice(&select_even_bytes(&output));
            }
            _ => {
                let mut output = [0u8; X_DIGEST_SIZE];
                // SAFETY: the X-family functions read 80 bytes and write 32.
                unsafe { (self.function)(header.as_ptr(), output.as_mut_ptr()) };
                output.reverse();
                out.copy_from_slice(&output);
            }
        }
    }
}

/// Reduce a 128-byte SWIFFT output to 64 bytes by keeping bytes 0, 2, ..., 126.
///
/// This truncation is how SWIFFT chains derive their header digest; it is
/// not a general-purpose compression of the output.
pub fn select_even_bytes(output: &[u8; SWIFFT_OUTPUT_SIZE]) -> [u8; SWIFFT_DIGEST_SIZE] {
    let mut digest = [0u8; SWIFFT_DIGEST_SIZE];
    for (dst, src) in digest.iter_mut().zip(output.iter().step_by(2)) {
        *dst = *src;
    }
    digest
}
