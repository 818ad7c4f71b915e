//! Block header construction and serialization, and genesis block assembly.

use serde::{Deserialize, Serialize};

use crate::coinbase::CoinbaseTransaction;
use crate::config::GenesisParams;
use crate::error::{GenesisError, Result};
use crate::hash::{double_sha256, hash_to_display_hex};
use crate::script::{build_input_script, build_output_script, MAX_COINBASE_TIMESTAMP};

/// Block version of a genesis block.
pub const GENESIS_BLOCK_VERSION: i32 = 1;

/// Size of a block header in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Offset of the nonce field within the header.
pub const NONCE_OFFSET: usize = 76;

/// Offset of the time field within the header.
pub const TIME_OFFSET: usize = 68;

/// A block header (80 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block version.
    pub version: i32,
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: [u8; 32],
    /// Merkle root of all transactions (internal byte order).
    pub merkle_root: [u8; 32],
    /// Block timestamp (Unix time).
    pub time: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
    /// Nonce for proof of work.
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a genesis header: version 1, no previous block.
    pub fn genesis(merkle_root: [u8; 32], time: u32, bits: u32, nonce: u32) -> Self {
        BlockHeader {
            version: GENESIS_BLOCK_VERSION,
            prev_block_hash: [0u8; 32],
            merkle_root,
            time,
            bits,
            nonce,
        }
    }

    /// Serialize the block header to 80 bytes.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut header = [0u8; BLOCK_HEADER_SIZE];

        // Version (4 bytes, little-endian)
        header[0..4].copy_from_slice(&self.version.to_le_bytes());

        // Previous block hash (32 bytes, internal byte order)
        header[4..36].copy_from_slice(&self.prev_block_hash);

        // Merkle root (32 bytes)
        header[36..68].copy_from_slice(&self.merkle_root);

        // Time (4 bytes, little-endian)
        header[TIME_OFFSET..72].copy_from_slice(&self.time.to_le_bytes());

        // Bits (4 bytes, little-endian)
        header[72..NONCE_OFFSET].copy_from_slice(&self.bits.to_le_bytes());

        // Nonce (4 bytes, little-endian)
        header[NONCE_OFFSET..].copy_from_slice(&self.nonce.to_le_bytes());

        header
    }

    /// Parse an 80-byte serialized header.
    pub fn deserialize(bytes: &[u8; BLOCK_HEADER_SIZE]) -> Self {
        let mut prev_block_hash = [0u8; 32];
        prev_block_hash.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&bytes[36..68]);

        BlockHeader {
            version: i32::from_le_bytes(le_word(bytes, 0)),
            prev_block_hash,
            merkle_root,
            time: u32::from_le_bytes(le_word(bytes, TIME_OFFSET)),
            bits: u32::from_le_bytes(le_word(bytes, 72)),
            nonce: u32::from_le_bytes(le_word(bytes, NONCE_OFFSET)),
        }
    }

    /// Compute the block hash (double SHA256, internal byte order).
    pub fn hash(&self) -> [u8; 32] {
        double_sha256(&self.serialize())
    }
}

fn le_word(bytes: &[u8; BLOCK_HEADER_SIZE], offset: usize) -> [u8; 4] {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    word
}

/// Overwrite the nonce field of a serialized header.
///
/// Only bytes 76..80 change, so the mining loop never re-encodes the rest.
#[inline]
pub fn set_nonce(header: &mut [u8; BLOCK_HEADER_SIZE], nonce: u32) {
    header[NONCE_OFFSET..].copy_from_slice(&nonce.to_le_bytes());
}

/// Copy of `header` with its nonce replaced.
#[inline]
pub fn with_nonce(header: &[u8; BLOCK_HEADER_SIZE], nonce: u32) -> [u8; BLOCK_HEADER_SIZE] {
    let mut patched = *header;
    set_nonce(&mut patched, nonce);
    patched
}

/// A genesis block: its coinbase transaction and header.
#[derive(Debug, Clone)]
pub struct GenesisBlock {
    /// The coinbase transaction.
    pub coinbase: CoinbaseTransaction,
    /// The header, with the starting nonce.
    pub header: BlockHeader,
}

impl GenesisBlock {
    /// Assemble scripts, coinbase, merkle root and header from `params`.
    pub fn build(params: &GenesisParams) -> Result<Self> {
        if params.timestamp.len() > MAX_COINBASE_TIMESTAMP {
            return Err(GenesisError::Encoding(format!(
                "timestamp is {} bytes, a coinbase holds at most {}",
                params.timestamp.len(),
                MAX_COINBASE_TIMESTAMP
            )));
        }

        let input_script = build_input_script(&params.timestamp)?;
        let output_script = build_output_script(&params.pubkey)?;
        let coinbase = CoinbaseTransaction::new(input_script, output_script, params.value)?;

        // Single-transaction tree: the root is the coinbase txid
        let merkle_root = coinbase.txid();

        let header = BlockHeader::genesis(
            merkle_root,
            params.time,
            params.resolved_bits(),
            params.nonce,
        );

        Ok(GenesisBlock { coinbase, header })
    }

    /// Merkle root in internal byte order.
    pub fn merkle_root(&self) -> [u8; 32] {
        self.header.merkle_root
    }

    /// Merkle root as display hex.
    pub fn merkle_root_hex(&self) -> String {
        hash_to_display_hex(&self.header.merkle_root)
    }

    /// Serialize the full block: header, transaction count, coinbase.
    pub fn serialize(&self) -> Vec<u8> {
        let tx = self.coinbase.serialize();
        let mut block = Vec::with_capacity(BLOCK_HEADER_SIZE + 1 + tx.len());
        block.extend_from_slice(&self.header.serialize());
        block.push(0x01);
        block.extend_from_slice(&tx);
        block
    }

    /// Copy of this block with the header time and nonce of a search result.
    pub fn solved(&self, time: u32, nonce: u32) -> GenesisBlock {
        let mut block = self.clone();
        block.header.time = time;
        block.header.nonce = nonce;
        block
    }
}
