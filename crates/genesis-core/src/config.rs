//! Genesis run parameters and hash backend locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;

/// Timestamp message of the Bitcoin genesis coinbase.
pub const DEFAULT_TIMESTAMP: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";

/// Public key paid by the Bitcoin genesis coinbase.
pub const DEFAULT_PUBKEY: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";

/// Genesis output value: 50 coins of 10^8 base units.
pub const DEFAULT_VALUE: i64 = 5_000_000_000;

/// Parameters describing the genesis block to mine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisParams {
    /// Header time (unix seconds).
    pub time: u32,
    /// Message embedded in the coinbase input script.
    pub timestamp: String,
    /// First nonce to try.
    pub nonce: u32,
    /// Proof-of-work algorithm.
    pub algorithm: Algorithm,
    /// Hex-encoded 65-byte public key paid by the coinbase output.
    pub pubkey: String,
    /// Coinbase output value in base units.
    pub value: i64,
    /// Compact difficulty bits; the algorithm default when unset.
    pub bits: Option<u32>,
}

impl Default for GenesisParams {
    fn default() -> Self {
        GenesisParams {
            time: current_unix_time(),
            timestamp: DEFAULT_TIMESTAMP.to_string(),
            nonce: 0,
            algorithm: Algorithm::default(),
            pubkey: DEFAULT_PUBKEY.to_string(),
            value: DEFAULT_VALUE,
            bits: None,
        }
    }
}

impl GenesisParams {
    /// Bits to mine at: the configured value or the algorithm's default.
    pub fn resolved_bits(&self) -> u32 {
        self.bits.unwrap_or_else(|| self.algorithm.default_bits())
    }
}

/// Location of one native hash backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeBackendSpec {
    /// Shared library file name or path.
    pub library: PathBuf,
    /// Exported hash function.
    pub symbol: String,
}

impl NativeBackendSpec {
    fn platform(name: &str, symbol: &str) -> Self {
        NativeBackendSpec {
            library: PathBuf::from(libloading::library_filename(name)),
            symbol: symbol.to_string(),
        }
    }
}

/// Where to find the native hash backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// X11 backend.
    pub x11: NativeBackendSpec,
    /// X13 backend.
    pub x13: NativeBackendSpec,
    /// X15 backend.
    pub x15: NativeBackendSpec,
    /// SWIFFT backend.
    pub swifft: NativeBackendSpec,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            x11: NativeBackendSpec::platform("x11_hash", "x11_hash"),
            x13: NativeBackendSpec::platform("x13_hash", "x13_hash"),
            x15: NativeBackendSpec::platform("x15_hash", "x15_hash"),
            swifft: NativeBackendSpec::platform("swifft", "SWIFFT_Compute"),
        }
    }
}

impl BackendConfig {
    /// Backend location for a native algorithm.
    ///
    /// SHA256 and scrypt are built in; asking for them returns the X11 entry,
    /// which the loader never consults for those algorithms.
    pub fn native_spec(&self, algorithm: Algorithm) -> &NativeBackendSpec {
        match algorithm {
            Algorithm::X13 => &self.x13,
            Algorithm::X15 => &self.x15,
            Algorithm::Swifft => &self.swifft,
            _ => &self.x11,
        }
    }
}

/// Get the current Unix timestamp.
pub fn current_unix_time() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenesisParams::default();

        assert_eq!(params.timestamp, DEFAULT_TIMESTAMP);
        assert_eq!(params.pubkey.len(), 130);
        assert_eq!(params.value, 5_000_000_000);
        assert_eq!(params.nonce, 0);
        assert!(params.time > 1_231_006_505);
    }

    #[test]
    fn test_resolved_bits() {
        let mut params = GenesisParams {
            algorithm: Algorithm::Swifft,
            ..Default::default()
        };
        assert_eq!(params.resolved_bits(), 0x3e00ffff);

        params.bits = Some(0x207fffff);
        assert_eq!(params.resolved_bits(), 0x207fffff);
    }

    #[test]
    fn test_params_from_json() {
        let params: GenesisParams = serde_json::from_str(
            r#"{"time": 1231006505, "algorithm": "scrypt", "bits": 504365040}"#,
        )
        .unwrap();

        assert_eq!(params.time, 1231006505);
        assert_eq!(params.algorithm, Algorithm::Scrypt);
        assert_eq!(params.resolved_bits(), 0x1e0ffff0);
        assert_eq!(params.timestamp, DEFAULT_TIMESTAMP);
    }

    #[test]
    fn test_params_reject_unknown_algorithm() {
        let result = serde_json::from_str::<GenesisParams>(r#"{"algorithm": "ethash"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_lookup() {
        let backends = BackendConfig::default();

        assert_eq!(backends.native_spec(Algorithm::Swifft).symbol, "SWIFFT_Compute");
        assert_eq!(backends.native_spec(Algorithm::X13).symbol, "x13_hash");
    }
}
