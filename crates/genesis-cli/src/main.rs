//! Genesis Miner - builds a genesis block and searches for its nonce.
//!
//! This is the main entry point for the genesis-miner binary.

use anyhow::{Context, Result};
use clap::Parser;
use genesis_core::{
    load_hasher, Algorithm, DifficultyTarget, ExhaustionPolicy, GenesisBlock, Miner, SearchResult,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::{parse_bits, MinerConfig};

/// Genesis block generator for Bitcoin-derived chains.
#[derive(Parser, Debug)]
#[command(name = "genesis-miner")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Header time in unix seconds (default: now)
    #[arg(short, long)]
    time: Option<u32>,

    /// Message embedded in the coinbase input script
    #[arg(short = 'z', long)]
    timestamp: Option<String>,

    /// First nonce to try
    #[arg(short, long)]
    nonce: Option<u32>,

    /// Proof-of-work algorithm: SHA256, scrypt, X11, X13, X15 or SWIFFT
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// Hex-encoded 65-byte public key paid by the coinbase
    #[arg(short, long)]
    pubkey: Option<String>,

    /// Coinbase output value in base units
    #[arg(short, long, allow_negative_numbers = true)]
    value: Option<i64>,

    /// Compact difficulty bits, hex (0x...) or decimal (default: per algorithm)
    #[arg(short, long, value_parser = parse_bits)]
    bits: Option<u32>,

    /// Number of mining threads (0 = auto-detect)
    #[arg(long)]
    threads: Option<usize>,

    /// What to do when every nonce fails: fail or bump-time
    #[arg(long)]
    on_exhaustion: Option<ExhaustionPolicy>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// X11 shared library
    #[arg(long)]
    x11_lib: Option<PathBuf>,

    /// X13 shared library
    #[arg(long)]
    x13_lib: Option<PathBuf>,

    /// X15 shared library
    #[arg(long)]
    x15_lib: Option<PathBuf>,

    /// SWIFFT shared library
    #[arg(long)]
    swifft_lib: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// Everything printed about a mined genesis block.
#[derive(Debug, Serialize)]
struct GenesisReport {
    algorithm: Algorithm,
    merkle_root: String,
    timestamp: String,
    pubkey: String,
    value: i64,
    bits: String,
    target: String,
    time: u32,
    nonce: u32,
    hash: String,
    pow_digest: String,
    hashes: u64,
    header: String,
    block: String,
}

impl GenesisReport {
    fn new(config: &MinerConfig, block: &GenesisBlock, result: &SearchResult) -> Result<Self> {
        let target = DifficultyTarget::from_bits(result.header.bits)?;
        let solved = block.solved(result.time, result.nonce);

        Ok(Self {
            algorithm: result.algorithm,
            merkle_root: block.merkle_root_hex(),
            timestamp: config.genesis.timestamp.clone(),
            pubkey: config.genesis.pubkey.clone(),
            value: config.genesis.value,
            bits: format!("{:#010x}", result.header.bits),
            target: target.to_hex(),
            time: result.time,
            nonce: result.nonce,
            hash: result.hash_hex(),
            pow_digest: hex::encode(&result.pow_digest),
            hashes: result.hashes,
            header: hex::encode(result.header_bytes()),
            block: hex::encode(solved.serialize()),
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = MinerConfig::load(args.config.as_deref(), &args)?;
    let params = &config.genesis;

    let block = GenesisBlock::build(params).context("Failed to build genesis block")?;
    let bits = params.resolved_bits();

    if !args.json {
        print_block_info(&config, &block, bits);
    }

    let hasher = load_hasher(params.algorithm, &config.backends)
        .with_context(|| format!("Failed to load {} hasher", params.algorithm))?;
    let target = DifficultyTarget::from_bits(bits).context("Invalid difficulty bits")?;
    info!("Target: {}", target.to_hex());

    let miner = Miner::new(hasher.as_ref(), target, config.search.clone());
    let result = miner
        .search(&block.header)
        .context("Genesis hash search failed")?;

    let report = GenesisReport::new(&config, &block, &result)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("genesis hash found!");
        println!("nonce: {}", report.nonce);
        println!("genesis hash: {}", report.hash);
        println!("time: {}", report.time);
    }

    Ok(())
}

fn print_block_info(config: &MinerConfig, block: &GenesisBlock, bits: u32) {
    let params = &config.genesis;
    println!("algorithm: {}", params.algorithm);
    println!("merkle hash: {}", block.merkle_root_hex());
    println!("timestamp: {}", params.timestamp);
    println!("pubkey: {}", params.pubkey);
    println!("time: {}", params.time);
    println!("bits: {:#x}", bits);
}
