//! Miner configuration.

use crate::Args;
use anyhow::{Context, Result};
use genesis_core::{BackendConfig, GenesisParams, SearchOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Genesis block parameters.
    pub genesis: GenesisParams,
    /// Search tuning.
    pub search: SearchOptions,
    /// Native hash backend locations.
    pub backends: BackendConfig,
}

impl MinerConfig {
    /// Load configuration from an optional file, then apply CLI args.
    pub fn load(config_path: Option<&Path>, args: &Args) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        config.apply_args(args);
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Override with CLI args that were explicitly given.
    pub fn apply_args(&mut self, args: &Args) {
        let genesis = &mut self.genesis;
        if let Some(time) = args.time {
            genesis.time = time;
        }
        if let Some(ref timestamp) = args.timestamp {
            genesis.timestamp = timestamp.clone();
        }
        if let Some(nonce) = args.nonce {
            genesis.nonce = nonce;
        }
        if let Some(algorithm) = args.algorithm {
            genesis.algorithm = algorithm;
        }
        if let Some(ref pubkey) = args.pubkey {
            genesis.pubkey = pubkey.clone();
        }
        if let Some(value) = args.value {
            genesis.value = value;
        }
        if args.bits.is_some() {
            genesis.bits = args.bits;
        }

        if let Some(threads) = args.threads {
            self.search.threads = threads;
        }
        if let Some(policy) = args.on_exhaustion {
            self.search.on_exhaustion = policy;
        }

        let backends = &mut self.backends;
        for (path, spec) in [
            (&args.x11_lib, &mut backends.x11),
            (&args.x13_lib, &mut backends.x13),
            (&args.x15_lib, &mut backends.x15),
            (&args.swifft_lib, &mut backends.swifft),
        ] {
            if let Some(path) = path {
                spec.library = path.clone();
            }
        }
    }
}

/// Parse compact bits given as `0x`-prefixed hex or decimal.
pub fn parse_bits(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid bits {:?}: {}", s, e))
}
