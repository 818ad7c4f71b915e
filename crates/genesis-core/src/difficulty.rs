//! Difficulty target conversion and comparison.

use num_bigint::BigUint;

use crate::error::{GenesisError, Result};

/// Bits of the Bitcoin genesis block, the "difficulty 1" target.
pub const GENESIS_BITS: u32 = 0x1d00ffff;

/// A proof-of-work target decoded from compact "bits".
///
/// Target = mantissa * 256^(exponent - 3). The target may be wider than 256
/// bits (SWIFFT chains use 512-bit digests), so it is held as a `BigUint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyTarget {
    bits: u32,
    value: BigUint,
}

impl DifficultyTarget {
    /// Decode compact bits: `[exponent (1 byte)][mantissa (3 bytes)]`.
    ///
    /// Fails for exponents below 3 and for a zero mantissa, neither of which
    /// gives a target any digest can meet.
    pub fn from_bits(bits: u32) -> Result<Self> {
        let exponent = bits >> 24;
        let mantissa = bits & 0x00ff_ffff;

        if exponent < 3 || mantissa == 0 {
            return Err(GenesisError::InvalidDifficulty(bits));
        }

        let value = BigUint::from(mantissa) << (8 * (exponent as usize - 3));
        Ok(DifficultyTarget { bits, value })
    }

    /// The compact bits this target was decoded from.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// The target as an integer.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// The target as big-endian hex, without leading zeros.
    pub fn to_hex(&self) -> String {
        self.value.to_str_radix(16)
    }

    /// Check if a big-endian digest is strictly below the target.
    pub fn is_met_by(&self, digest: &[u8]) -> bool {
        BigUint::from_bytes_be(digest) < self.value
    }

    /// Precompute a fixed-width comparison for digests of `digest_len` bytes.
    pub fn threshold(&self, digest_len: usize) -> Threshold {
        if self.value.bits() > (digest_len as u64) * 8 {
            return Threshold::Any;
        }

        let bytes = self.value.to_bytes_be();
        let mut padded = vec![0u8; digest_len];
        padded[digest_len - bytes.len()..].copy_from_slice(&bytes);
        Threshold::Below(padded)
    }

    /// Approximate difficulty relative to the Bitcoin genesis target.
    ///
    /// Difficulty = genesis_target / target
    pub fn difficulty(&self) -> f64 {
        let genesis = BigUint::from(0xffffu32) << (8 * (0x1d - 3));
        biguint_to_f64(&genesis) / biguint_to_f64(&self.value)
    }
}

/// A target laid out for allocation-free comparison in the mining loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Threshold {
    /// The target exceeds every digest of this width.
    Any,
    /// Big-endian target, same width as the digests it is compared with.
    Below(Vec<u8>),
}

impl Threshold {
    /// Check if `digest` is strictly below the target.
    ///
    /// Both are big-endian numbers of the same width, so byte-wise
    /// lexicographic order is numeric order.
    #[inline]
    pub fn is_met_by(&self, digest: &[u8]) -> bool {
        match self {
            Threshold::Any => true,
            Threshold::Below(target) => digest < target.as_slice(),
        }
    }
}

/// Convert an integer to an approximate f64 value.
fn biguint_to_f64(value: &BigUint) -> f64 {
    let bits = value.bits();
    if bits <= 64 {
        return value.iter_u64_digits().next().unwrap_or(0) as f64;
    }

    // Keep the top 64 bits and scale back up.
    let shift = bits - 64;
    let top = (value >> shift).iter_u64_digits().next().unwrap_or(0) as f64;
    top * 2f64.powi(shift as i32)
}
