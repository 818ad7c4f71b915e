//! End-to-end genesis mining against the Bitcoin genesis block.

use std::sync::Mutex;

use genesis_core::{
    load_hasher, Algorithm, BackendConfig, DifficultyTarget, GenesisBlock, GenesisParams, Miner,
    NoProgress, ProgressReport, SearchOptions,
};

const BITCOIN_GENESIS_NONCE: u32 = 2083236893;
const BITCOIN_GENESIS_HASH: &str =
    "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

fn bitcoin_params(start_nonce: u32) -> GenesisParams {
    GenesisParams {
        time: 1231006505,
        nonce: start_nonce,
        algorithm: Algorithm::Sha256,
        bits: None,
        ..Default::default()
    }
}

#[test]
fn mines_bitcoin_genesis_block() {
    let params = bitcoin_params(BITCOIN_GENESIS_NONCE - 1500);
    let block = GenesisBlock::build(&params).unwrap();
    assert_eq!(
        block.merkle_root_hex(),
        "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
    );

    let hasher = load_hasher(params.algorithm, &BackendConfig::default()).unwrap();
    let target = DifficultyTarget::from_bits(params.resolved_bits()).unwrap();
    let miner = Miner::new(hasher.as_ref(), target, SearchOptions::default()).with_progress(NoProgress);

    let result = miner.search(&block.header).unwrap();

    assert_eq!(result.nonce, BITCOIN_GENESIS_NONCE);
    assert_eq!(result.time, 1231006505);
    assert_eq!(result.hash_hex(), BITCOIN_GENESIS_HASH);
    assert_eq!(result.hash, result.pow_digest);
    assert_eq!(result.hashes, 1501);
    assert!(miner.check(&result.header));

    let solved = block.solved(result.time, result.nonce);
    assert_eq!(solved.header.serialize(), result.header_bytes());
}

#[test]
#[ignore = "sweeps two billion nonces; run with --ignored"]
fn mines_bitcoin_genesis_block_from_zero() {
    let params = bitcoin_params(0);
    let block = GenesisBlock::build(&params).unwrap();

    let hasher = load_hasher(params.algorithm, &BackendConfig::default()).unwrap();
    let target = DifficultyTarget::from_bits(params.resolved_bits()).unwrap();
    let options = SearchOptions {
        threads: 0,
        ..Default::default()
    };
    let miner = Miner::new(hasher.as_ref(), target, options).with_progress(NoProgress);

    let result = miner.search(&block.header).unwrap();

    assert_eq!(result.nonce, BITCOIN_GENESIS_NONCE);
    assert_eq!(result.hash_hex(), BITCOIN_GENESIS_HASH);
}

#[test]
fn parallel_search_finds_the_same_nonce() {
    let params = bitcoin_params(BITCOIN_GENESIS_NONCE - 5000);
    let block = GenesisBlock::build(&params).unwrap();

    let hasher = load_hasher(Algorithm::Sha256, &BackendConfig::default()).unwrap();
    let target = DifficultyTarget::from_bits(params.resolved_bits()).unwrap();
    let options = SearchOptions {
        threads: 4,
        batch_size: 256,
        ..Default::default()
    };
    let miner = Miner::new(hasher.as_ref(), target, options).with_progress(NoProgress);

    let result = miner.search(&block.header).unwrap();

    assert_eq!(result.nonce, BITCOIN_GENESIS_NONCE);
    assert_eq!(result.hash_hex(), BITCOIN_GENESIS_HASH);
}

#[test]
fn reports_progress_while_mining() {
    // Starts at 2083234893: two interval boundaries before the solution.
    let params = bitcoin_params(BITCOIN_GENESIS_NONCE - 2000);
    let block = GenesisBlock::build(&params).unwrap();

    let hasher = load_hasher(Algorithm::Sha256, &BackendConfig::default()).unwrap();
    let target = DifficultyTarget::from_bits(params.resolved_bits()).unwrap();
    let options = SearchOptions {
        progress_interval: 1000,
        ..Default::default()
    };
    let reports = Mutex::new(Vec::new());
    let miner = Miner::new(hasher.as_ref(), target, options)
        .with_progress(|report: &ProgressReport| reports.lock().unwrap().push(*report));

    miner.search(&block.header).unwrap();
    drop(miner);

    let reports = reports.into_inner().unwrap();
    let nonces: Vec<u32> = reports.iter().map(|r| r.nonce).collect();
    assert_eq!(nonces, vec![2083234999, 2083235999]);
    assert!(reports.iter().all(|r| r.time == 1231006505 && r.hashrate > 0));
}

#[test]
fn scrypt_reports_sha256_hash() {
    // Easy bits so the search ends quickly.
    let params = GenesisParams {
        time: 1317972665,
        algorithm: Algorithm::Scrypt,
        bits: Some(0x207fffff),
        ..bitcoin_params(0)
    };
    let block = GenesisBlock::build(&params).unwrap();

    let hasher = load_hasher(Algorithm::Scrypt, &BackendConfig::default()).unwrap();
    let target = DifficultyTarget::from_bits(params.resolved_bits()).unwrap();
    let miner = Miner::new(hasher.as_ref(), target, SearchOptions::default()).with_progress(NoProgress);

    let result = miner.search(&block.header).unwrap();

    assert_eq!(result.nonce, 3);
    assert_eq!(
        hex::encode(&result.pow_digest),
        "4a3e8a1f6e95a1dc1062efa5f429931b23013c8943652eb423ca2a81c4fe415b"
    );
    assert_eq!(
        result.hash_hex(),
        "914c5db07cc4ddb70d56bc810b34e654b07429f550b69d4820470fee38770196"
    );
}

#[test]
fn unavailable_backend_is_reported_before_mining() {
    let mut backends = BackendConfig::default();
    backends.swifft.library = "/nonexistent/libswifft.so".into();

    let err = load_hasher(Algorithm::Swifft, &backends).err().unwrap();

    assert!(err.to_string().contains("SWIFFT backend unavailable"));
}
