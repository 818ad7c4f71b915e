//! Property-based tests using proptest.
//!
//! These check the encoding invariants that must hold for every input, not
//! just the Bitcoin genesis parameters.

use genesis_core::block::NONCE_OFFSET;
use genesis_core::coinbase::COINBASE_FIXED_SIZE;
use genesis_core::script::{MAX_COINBASE_TIMESTAMP, OP_PUSHDATA1};
use genesis_core::{
    build_input_script, build_output_script, with_nonce, BlockHeader, CoinbaseTransaction,
    DifficultyTarget, GenesisBlock, GenesisError, GenesisParams,
};
use num_bigint::BigUint;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Arbitrary 32-byte hashes.
fn arb_hash() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

/// Arbitrary headers with any field values.
fn arb_header() -> impl Strategy<Value = BlockHeader> {
    (any::<i32>(), arb_hash(), arb_hash(), any::<u32>(), any::<u32>(), any::<u32>()).prop_map(
        |(version, prev_block_hash, merkle_root, time, bits, nonce)| BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            time,
            bits,
            nonce,
        },
    )
}

/// Hex-encoded 65-byte public keys.
fn arb_pubkey_hex() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), 65).prop_map(hex::encode)
}

/// Compact bits with a usable exponent and non-zero mantissa.
fn arb_valid_bits() -> impl Strategy<Value = u32> {
    (3u32..=0x40, 1u32..=0x00ff_ffff).prop_map(|(exponent, mantissa)| exponent << 24 | mantissa)
}

// ============================================================================
// Scripts and transaction
// ============================================================================

proptest! {
    #[test]
    fn output_script_wraps_key(pubkey in arb_pubkey_hex()) {
        let script = build_output_script(&pubkey).unwrap();

        prop_assert_eq!(script.len(), 67);
        prop_assert_eq!(script[0], 0x41);
        prop_assert_eq!(hex::encode(&script[1..66]), pubkey);
        prop_assert_eq!(script[66], 0xac);
    }

    #[test]
    fn short_timestamps_use_direct_push(timestamp in "[ -~]{0,76}") {
        let script = build_input_script(&timestamp).unwrap();

        prop_assert_eq!(script.len(), 8 + timestamp.len());
        prop_assert_eq!(script[7] as usize, timestamp.len());
        prop_assert_eq!(&script[8..], timestamp.as_bytes());
    }

    #[test]
    fn long_timestamps_use_pushdata1(timestamp in "[ -~]{77,255}") {
        let script = build_input_script(&timestamp).unwrap();

        prop_assert_eq!(script.len(), 9 + timestamp.len());
        prop_assert_eq!(script[7], OP_PUSHDATA1);
        prop_assert_eq!(script[8] as usize, timestamp.len());
    }

    #[test]
    fn transaction_size_tracks_input_script(
        timestamp in "[ -~]{0,246}",
        pubkey in arb_pubkey_hex(),
        value in any::<i64>(),
    ) {
        let input = build_input_script(&timestamp).unwrap();
        let input_len = input.len();
        let output = build_output_script(&pubkey).unwrap();
        let tx = CoinbaseTransaction::new(input, output, value).unwrap();

        prop_assert_eq!(tx.serialize().len(), COINBASE_FIXED_SIZE + input_len);
    }

    #[test]
    fn oversize_coinbase_timestamps_are_rejected(len in (MAX_COINBASE_TIMESTAMP + 1)..=255usize) {
        let params = GenesisParams {
            time: 1231006505,
            timestamp: "a".repeat(len),
            ..Default::default()
        };
        prop_assert!(matches!(GenesisBlock::build(&params), Err(GenesisError::Encoding(_))));
    }
}

// ============================================================================
// Header encoding
// ============================================================================

proptest! {
    #[test]
    fn header_roundtrip(header in arb_header()) {
        let bytes = header.serialize();
        prop_assert_eq!(BlockHeader::deserialize(&bytes), header);
    }

    #[test]
    fn nonce_patching_matches_direct_encoding(
        header in arb_header(),
        first in any::<u32>(),
        second in any::<u32>(),
    ) {
        let patched = with_nonce(&with_nonce(&header.serialize(), first), second);
        let direct = BlockHeader { nonce: second, ..header }.serialize();

        prop_assert_eq!(patched, direct);
        prop_assert_eq!(&patched[..NONCE_OFFSET], &header.serialize()[..NONCE_OFFSET]);
    }
}

// ============================================================================
// Difficulty
// ============================================================================

proptest! {
    #[test]
    fn target_follows_compact_formula(bits in arb_valid_bits()) {
        let target = DifficultyTarget::from_bits(bits).unwrap();
        let exponent = bits >> 24;
        let mantissa = bits & 0x00ff_ffff;

        let expected = BigUint::from(mantissa) * BigUint::from(256u32).pow(exponent - 3);
        prop_assert_eq!(target.value(), &expected);
    }

    #[test]
    fn threshold_agrees_with_integer_compare(bits in arb_valid_bits(), digest in arb_hash()) {
        let target = DifficultyTarget::from_bits(bits).unwrap();
        let threshold = target.threshold(32);

        prop_assert_eq!(threshold.is_met_by(&digest), target.is_met_by(&digest));
    }

    #[test]
    fn small_exponents_are_rejected(exponent in 0u32..3, mantissa in 0u32..=0x00ff_ffff) {
        prop_assert!(DifficultyTarget::from_bits(exponent << 24 | mantissa).is_err());
    }
}
