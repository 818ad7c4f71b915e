//! Genesis coinbase transaction construction.
//!
//! The genesis coinbase has exactly one input, spending nothing, whose script
//! carries the timestamp message, and one pay-to-pubkey output.

use crate::error::{GenesisError, Result};
use crate::hash::double_sha256;
use crate::script::OUTPUT_SCRIPT_SIZE;

/// Transaction version used by the genesis coinbase.
pub const COINBASE_TX_VERSION: u32 = 1;

/// Previous output index marking a coinbase input.
pub const COINBASE_PREV_INDEX: u32 = 0xFFFF_FFFF;

/// Input sequence number (final).
pub const COINBASE_SEQUENCE: u32 = 0xFFFF_FFFF;

/// Serialized size of everything except the input script.
pub const COINBASE_FIXED_SIZE: usize = 127;

/// The genesis coinbase transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseTransaction {
    /// Input script (timestamp message).
    input_script: Vec<u8>,
    /// Output script (P2PK).
    output_script: Vec<u8>,
    /// Output value in base units.
    value: i64,
}

impl CoinbaseTransaction {
    /// Create the coinbase transaction.
    ///
    /// Script lengths are encoded in single bytes and the output script
    /// length is fixed at 0x43, so both are checked here.
    pub fn new(input_script: Vec<u8>, output_script: Vec<u8>, value: i64) -> Result<Self> {
        if input_script.len() > u8::MAX as usize {
            return Err(GenesisError::Encoding(format!(
                "input script is {} bytes, at most 255 allowed",
                input_script.len()
            )));
        }
        if output_script.len() != OUTPUT_SCRIPT_SIZE {
            return Err(GenesisError::Encoding(format!(
                "output script must be {} bytes, got {}",
                OUTPUT_SCRIPT_SIZE,
                output_script.len()
            )));
        }

        Ok(CoinbaseTransaction {
            input_script,
            output_script,
            value,
        })
    }

    /// The input script.
    pub fn input_script(&self) -> &[u8] {
        &self.input_script
    }

    /// The output script.
    pub fn output_script(&self) -> &[u8] {
        &self.output_script
    }

    /// The output value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Serialize the transaction.
    pub fn serialize(&self) -> Vec<u8> {
        let mut raw_tx = Vec::with_capacity(COINBASE_FIXED_SIZE + self.input_script.len());

        // Version (4 bytes, little-endian)
        raw_tx.extend_from_slice(&COINBASE_TX_VERSION.to_le_bytes());

        // Input count - always 1 for coinbase
        raw_tx.push(0x01);

        // Input: Previous output (null for coinbase)
        raw_tx.extend_from_slice(&[0u8; 32]);
        raw_tx.extend_from_slice(&COINBASE_PREV_INDEX.to_le_bytes());

        // Input script
        raw_tx.push(self.input_script.len() as u8);
        raw_tx.extend_from_slice(&self.input_script);

        // Sequence (4 bytes)
        raw_tx.extend_from_slice(&COINBASE_SEQUENCE.to_le_bytes());

        // Output count
        raw_tx.push(0x01);

        // Output value (8 bytes, signed little-endian)
        raw_tx.extend_from_slice(&self.value.to_le_bytes());

        // Output script
        raw_tx.push(OUTPUT_SCRIPT_SIZE as u8);
        raw_tx.extend_from_slice(&self.output_script);

        // Locktime (4 bytes)
        raw_tx.extend_from_slice(&0u32.to_le_bytes());

        raw_tx
    }

    /// Transaction ID (double SHA256 of the serialization, internal order).
    pub fn txid(&self) -> [u8; 32] {
        double_sha256(&self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_to_display_hex;
    use crate::script::{build_input_script, build_output_script};

    const SATOSHI_PUBKEY: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";

    fn genesis_coinbase() -> CoinbaseTransaction {
        let input = build_input_script(
            "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks",
        )
        .unwrap();
        let output = build_output_script(SATOSHI_PUBKEY).unwrap();
        CoinbaseTransaction::new(input, output, 5_000_000_000).unwrap()
    }

    #[test]
    fn test_genesis_coinbase_txid() {
        let tx = genesis_coinbase();

        assert_eq!(
            hash_to_display_hex(&tx.txid()),
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
        );
    }

    #[test]
    fn test_serialized_layout() {
        let tx = genesis_coinbase();
        let raw = tx.serialize();
        let script_len = tx.input_script().len();

        assert_eq!(raw.len(), COINBASE_FIXED_SIZE + script_len);

        // Version 1
        assert_eq!(&raw[0..4], &[0x01, 0x00, 0x00, 0x00]);
        // One input spending the null outpoint
        assert_eq!(raw[4], 0x01);
        assert_eq!(&raw[5..37], &[0u8; 32]);
        assert_eq!(&raw[37..41], &[0xff; 4]);
        assert_eq!(raw[41] as usize, script_len);

        let after_script = 42 + script_len;
        assert_eq!(&raw[after_script..after_script + 4], &[0xff; 4]);
        assert_eq!(raw[after_script + 4], 0x01);
        assert_eq!(
            &raw[after_script + 5..after_script + 13],
            &5_000_000_000i64.to_le_bytes()
        );
        assert_eq!(raw[after_script + 13], 0x43);
        assert_eq!(&raw[raw.len() - 4..], &[0u8; 4]);
    }

    #[test]
    fn test_negative_value_is_twos_complement() {
        let tx = CoinbaseTransaction::new(vec![0x00], vec![0u8; OUTPUT_SCRIPT_SIZE], -1).unwrap();
        let raw = tx.serialize();

        // 4 + 1 + 32 + 4 + 1 + 1 + 4 + 1 = 48
        assert_eq!(&raw[48..56], &[0xff; 8]);
    }

    #[test]
    fn test_rejects_malformed_scripts() {
        assert!(matches!(
            CoinbaseTransaction::new(vec![0u8; 256], vec![0u8; OUTPUT_SCRIPT_SIZE], 0),
            Err(GenesisError::Encoding(_))
        ));
        assert!(matches!(
            CoinbaseTransaction::new(vec![0u8; 10], vec![0u8; 35], 0),
            Err(GenesisError::Encoding(_))
        ));
    }
}
