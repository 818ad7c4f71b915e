//! Proof-of-work algorithm selection.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenesisError;

/// Supported proof-of-work hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Algorithm {
    /// Bitcoin's double SHA-256.
    #[default]
    Sha256,
    /// scrypt with N=1024, r=1, p=1 (Litecoin style).
    Scrypt,
    /// X11 chained hash (native backend).
    X11,
    /// X13 chained hash (native backend).
    X13,
    /// X15 chained hash (native backend).
    X15,
    /// SWIFFT lattice hash (native backend).
    Swifft,
}

impl Algorithm {
    /// All supported algorithms, in the order they are listed to users.
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Sha256,
        Algorithm::Scrypt,
        Algorithm::X11,
        Algorithm::X13,
        Algorithm::X15,
        Algorithm::Swifft,
    ];

    /// Canonical name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "SHA256",
            Algorithm::Scrypt => "scrypt",
            Algorithm::X11 => "X11",
            Algorithm::X13 => "X13",
            Algorithm::X15 => "X15",
            Algorithm::Swifft => "SWIFFT",
        }
    }

    /// Compact difficulty bits associated with a difficulty of 1.
    pub fn default_bits(&self) -> u32 {
        match self {
            Algorithm::Sha256 => 0x1d00ffff,
            Algorithm::Scrypt | Algorithm::X11 | Algorithm::X13 | Algorithm::X15 => 0x1e0ffff0,
            Algorithm::Swifft => 0x3e00ffff,
        }
    }

    /// Whether the reported genesis hash is the algorithm's own PoW digest.
    ///
    /// SHA256 and scrypt chains identify blocks by the double SHA-256 of the
    /// header; the X-family and SWIFFT chains use the PoW digest itself.
    pub fn reports_pow_digest(&self) -> bool {
        matches!(
            self,
            Algorithm::X11 | Algorithm::X13 | Algorithm::X15 | Algorithm::Swifft
        )
    }

    /// Whether the algorithm is provided by a native shared library.
    pub fn is_native(&self) -> bool {
        !matches!(self, Algorithm::Sha256 | Algorithm::Scrypt)
    }
}

impl FromStr for Algorithm {
    type Err = GenesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenesisError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = GenesisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for &'static str {
    fn from(algorithm: Algorithm) -> Self {
        algorithm.name()
    }
}

impl core::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
