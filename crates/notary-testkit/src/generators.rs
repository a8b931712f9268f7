//! Proptest generators for property-based testing.

use proptest::prelude::*;

use notary_core::{Address, Cid, Keypair, TransactionParams, MAX_NOTE_LEN};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    keypair().prop_map(|kp| Address::from_public_key(kp.public_key()))
}

/// Generate a payment amount, including zero.
pub fn amount() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), 1u64..1_000_000_000u64]
}

/// Generate a note that fits in a transaction.
pub fn note() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=MAX_NOTE_LEN)
}

/// Generate a lease, sometimes absent.
pub fn lease() -> impl Strategy<Value = Option<[u8; 32]>> {
    prop::option::of(any::<[u8; 32]>())
}

/// Generate a deployment name as used in notarization notes.
pub fn deployment_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_-]{0,31}"
}

/// Generate a CID for arbitrary content.
pub fn cid() -> impl Strategy<Value = Cid> {
    prop::collection::vec(any::<u8>(), 0..256).prop_map(|bytes| Cid::for_bytes(&bytes))
}

/// Generate suggested parameters with a valid window.
pub fn params() -> impl Strategy<Value = TransactionParams> {
    (0u64..10, 1_000u64..10_000, any::<bool>(), 1u64..1_000_000, 1u64..1_000).prop_map(
        |(fee, min_fee, flat_fee, first_valid, window)| TransactionParams {
            fee,
            min_fee,
            flat_fee,
            first_valid,
            last_valid: first_valid + window,
            genesis_id: "memnet-v1".into(),
            genesis_hash: [0x11; 32],
        },
    )
}
