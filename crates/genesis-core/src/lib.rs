//! Genesis block construction and proof-of-work search.
//!
//! This crate provides:
//! - Coinbase input/output script construction
//! - Genesis coinbase transaction and block header serialization
//! - Compact difficulty target decoding and comparison
//! - Pluggable PoW hashers: double SHA256, scrypt, and native X11/X13/X15/SWIFFT
//! - A sequential or multi-threaded nonce search with progress reporting

pub mod algorithm;
pub mod block;
pub mod coinbase;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod miner;
pub mod native;
pub mod progress;
pub mod script;

pub use algorithm::Algorithm;
pub use block::{set_nonce, with_nonce, BlockHeader, GenesisBlock, BLOCK_HEADER_SIZE};
pub use coinbase::CoinbaseTransaction;
pub use config::{BackendConfig, GenesisParams, NativeBackendSpec};
pub use difficulty::DifficultyTarget;
pub use error::{GenesisError, Result};
pub use hash::{double_sha256, load_hasher, PowHasher};
pub use miner::{ExhaustionPolicy, Miner, SearchOptions, SearchResult};
pub use native::{NativeHasher, NativeLibrary};
pub use progress::{LogProgress, NoProgress, ProgressReport, ProgressSink};
pub use script::{build_input_script, build_output_script};
