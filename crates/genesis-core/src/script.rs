//! Coinbase input script and pay-to-pubkey output script construction.

use crate::error::{GenesisError, Result};

/// Fixed input script prefix: push of the genesis bits `0x1d00ffff` followed
/// by a push of the single byte `0x04`.
pub const INPUT_SCRIPT_PREFIX: [u8; 7] = [0x04, 0xff, 0xff, 0x00, 0x1d, 0x01, 0x04];

/// OP_PUSHDATA1: the next byte holds the push length.
pub const OP_PUSHDATA1: u8 = 0x4c;

/// OP_CHECKSIG.
pub const OP_CHECKSIG: u8 = 0xac;

/// Longest push that fits in a bare length opcode.
pub const MAX_DIRECT_PUSH: usize = 76;

/// Size of an uncompressed public key.
pub const PUBKEY_SIZE: usize = 65;

/// Size of the P2PK output script: push opcode, key, OP_CHECKSIG.
pub const OUTPUT_SCRIPT_SIZE: usize = PUBKEY_SIZE + 2;

/// Longest timestamp whose input script still fits the coinbase's one-byte
/// script length: 255 minus the prefix, OP_PUSHDATA1 and the length byte.
pub const MAX_COINBASE_TIMESTAMP: usize = u8::MAX as usize - INPUT_SCRIPT_PREFIX.len() - 2;

/// Build the coinbase input script embedding `timestamp`.
///
/// Layout: `04 ffff001d 01 04 [4c] <len> <timestamp>`. Lengths are UTF-8
/// byte lengths; OP_PUSHDATA1 is inserted for timestamps over 76 bytes.
///
/// Any timestamp up to 255 bytes encodes, but only those up to
/// [`MAX_COINBASE_TIMESTAMP`] produce a script a coinbase can carry.
pub fn build_input_script(timestamp: &str) -> Result<Vec<u8>> {
    let text = timestamp.as_bytes();
    let len = u8::try_from(text.len()).map_err(|_| {
        GenesisError::Encoding(format!(
            "timestamp is {} bytes, at most 255 fit in a single push",
            text.len()
        ))
    })?;

    let mut script = Vec::with_capacity(INPUT_SCRIPT_PREFIX.len() + 2 + text.len());
    script.extend_from_slice(&INPUT_SCRIPT_PREFIX);
    if text.len() > MAX_DIRECT_PUSH {
        script.push(OP_PUSHDATA1);
    }
    script.push(len);
    script.extend_from_slice(text);

    Ok(script)
}

/// Build a pay-to-pubkey output script from a hex-encoded 65-byte key.
pub fn build_output_script(pubkey_hex: &str) -> Result<Vec<u8>> {
    let pubkey = hex::decode(pubkey_hex.trim())
        .map_err(|e| GenesisError::Encoding(format!("invalid pubkey hex: {}", e)))?;

    if pubkey.len() != PUBKEY_SIZE {
        return Err(GenesisError::Encoding(format!(
            "pubkey must be {} bytes, got {}",
            PUBKEY_SIZE,
            pubkey.len()
        )));
    }

    let mut script = Vec::with_capacity(OUTPUT_SCRIPT_SIZE);
    script.push(PUBKEY_SIZE as u8);
    script.extend_from_slice(&pubkey);
    script.push(OP_CHECKSIG);

    Ok(script)
}
