//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Empty optional fields are omitted rather than encoded as null
//!
//! The same transaction always produces identical bytes, so signatures and
//! transaction ids are stable across platforms.

use ciborium::value::{Integer, Value};

use crate::address::Address;
use crate::crypto::{PublicKey, Signature};
use crate::error::{CoreError, Result};
use crate::transaction::{GroupId, SignedTransaction, Transaction};

/// Transaction field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const TYPE: u64 = 0;
    pub const SENDER: u64 = 1;
    pub const RECEIVER: u64 = 2;
    pub const AMOUNT: u64 = 3;
    pub const FEE: u64 = 4;
    pub const FIRST_VALID: u64 = 5;
    pub const LAST_VALID: u64 = 6;
    pub const GENESIS_ID: u64 = 7;
    pub const GENESIS_HASH: u64 = 8;
    pub const NOTE: u64 = 9;
    pub const LEASE: u64 = 10;
    pub const GROUP: u64 = 11;

    pub const SIGNED_TXN: u64 = 0;
    pub const SIGNED_SIG: u64 = 1;
}

const PAYMENT_TYPE: &str = "pay";

/// Encode a transaction to canonical CBOR bytes.
pub fn canonical_bytes(txn: &Transaction) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &transaction_to_cbor_value(txn));
    buf
}

/// Encode a signed transaction for submission.
///
/// Format: map `{0: transaction, 1: signature}`.
pub fn signed_transaction_bytes(stxn: &SignedTransaction) -> Vec<u8> {
    let value = Value::Map(vec![
        (key(keys::SIGNED_TXN), transaction_to_cbor_value(&stxn.txn)),
        (key(keys::SIGNED_SIG), Value::Bytes(stxn.signature.0.to_vec())),
    ]);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

fn key(k: u64) -> Value {
    Value::Integer(k.into())
}

/// Convert a transaction to a CBOR Value (map with integer keys).
fn transaction_to_cbor_value(txn: &Transaction) -> Value {
    let mut entries = Vec::with_capacity(12);

    entries.push((key(keys::TYPE), Value::Text(PAYMENT_TYPE.into())));
    entries.push((
        key(keys::SENDER),
        Value::Bytes(txn.sender.public_key().0.to_vec()),
    ));
    entries.push((
        key(keys::RECEIVER),
        Value::Bytes(txn.receiver.public_key().0.to_vec()),
    ));
    entries.push((key(keys::AMOUNT), Value::Integer(txn.amount.into())));
    entries.push((key(keys::FEE), Value::Integer(txn.fee.into())));
    entries.push((key(keys::FIRST_VALID), Value::Integer(txn.first_valid.into())));
    entries.push((key(keys::LAST_VALID), Value::Integer(txn.last_valid.into())));
    entries.push((key(keys::GENESIS_ID), Value::Text(txn.genesis_id.clone())));
    entries.push((key(keys::GENESIS_HASH), Value::Bytes(txn.genesis_hash.to_vec())));

    if !txn.note.is_empty() {
        entries.push((key(keys::NOTE), Value::Bytes(txn.note.clone())));
    }
    if let Some(lease) = &txn.lease {
        entries.push((key(keys::LEASE), Value::Bytes(lease.to_vec())));
    }
    if let Some(group) = &txn.group {
        entries.push((key(keys::GROUP), Value::Bytes(group.0.to_vec())));
    }

    Value::Map(entries)
}

/// Recursively encode a CBOR value.
///
/// Only the value shapes produced by this module are supported.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item);
            }
        }
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        other => unreachable!("transaction encoding never produces {other:?}"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

/// Decode a signed transaction from its wire bytes.
///
/// The input must be exactly the canonical encoding of the decoded value.
pub fn decode_signed_transaction(bytes: &[u8]) -> Result<SignedTransaction> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let map = as_map(&value, "signed transaction")?;
    let txn = match lookup(map, keys::SIGNED_TXN) {
        Some(v) => cbor_value_to_transaction(v)?,
        None => return Err(malformed("missing transaction")),
    };
    let signature = match lookup(map, keys::SIGNED_SIG) {
        Some(Value::Bytes(b)) if b.len() == 64 => {
            let mut arr = [0u8; 64];
            arr.copy_from_slice(b);
            Signature(arr)
        }
        _ => return Err(malformed("invalid signature")),
    };

    let stxn = SignedTransaction { txn, signature };
    if signed_transaction_bytes(&stxn) != bytes {
        return Err(malformed("non-canonical encoding"));
    }
    Ok(stxn)
}

fn malformed(msg: &str) -> CoreError {
    CoreError::MalformedTransaction(msg.into())
}

fn as_map<'a>(value: &'a Value, what: &str) -> Result<&'a [(Value, Value)]> {
    match value {
        Value::Map(m) => Ok(m),
        _ => Err(CoreError::MalformedTransaction(format!("{what}: expected map"))),
    }
}

fn lookup(map: &[(Value, Value)], key: u64) -> Option<&Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Integer(i) if u64::try_from(*i).ok() == Some(key)))
        .map(|(_, v)| v)
}

fn get_u64(map: &[(Value, Value)], key: u64, name: &str) -> Result<u64> {
    match lookup(map, key) {
        Some(Value::Integer(i)) => {
            u64::try_from(*i).map_err(|_| malformed(&format!("{name} out of range")))
        }
        _ => Err(malformed(&format!("missing {name}"))),
    }
}

fn get_bytes32(map: &[(Value, Value)], key: u64, name: &str) -> Result<Option<[u8; 32]>> {
    match lookup(map, key) {
        Some(Value::Bytes(b)) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            Ok(Some(arr))
        }
        None => Ok(None),
        _ => Err(malformed(&format!("invalid {name}"))),
    }
}

fn required_bytes32(map: &[(Value, Value)], key: u64, name: &str) -> Result<[u8; 32]> {
    get_bytes32(map, key, name)?.ok_or_else(|| malformed(&format!("missing {name}")))
}

/// Convert a CBOR Value (map) back to a Transaction.
fn cbor_value_to_transaction(value: &Value) -> Result<Transaction> {
    let map = as_map(value, "transaction")?;

    match lookup(map, keys::TYPE) {
        Some(Value::Text(t)) if t == PAYMENT_TYPE => {}
        _ => return Err(malformed("unsupported transaction type")),
    }

    let sender = Address::from_public_key(PublicKey(required_bytes32(map, keys::SENDER, "sender")?));
    let receiver =
        Address::from_public_key(PublicKey(required_bytes32(map, keys::RECEIVER, "receiver")?));

    let genesis_id = match lookup(map, keys::GENESIS_ID) {
        Some(Value::Text(s)) => s.clone(),
        _ => return Err(malformed("missing genesis_id")),
    };

    let note = match lookup(map, keys::NOTE) {
        Some(Value::Bytes(b)) => b.clone(),
        None => Vec::new(),
        _ => return Err(malformed("invalid note")),
    };

    Ok(Transaction {
        sender,
        receiver,
        amount: get_u64(map, keys::AMOUNT, "amount")?,
        fee: get_u64(map, keys::FEE, "fee")?,
        first_valid: get_u64(map, keys::FIRST_VALID, "first_valid")?,
        last_valid: get_u64(map, keys::LAST_VALID, "last_valid")?,
        genesis_id,
        genesis_hash: required_bytes32(map, keys::GENESIS_HASH, "genesis_hash")?,
        note,
        lease: get_bytes32(map, keys::LEASE, "lease")?,
        group: get_bytes32(map, keys::GROUP, "group")?.map(GroupId),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::transaction::{PaymentBuilder, TransactionParams};

    fn sample(note: &[u8]) -> (Keypair, Transaction) {
        let kp = Keypair::from_seed(&[0x42; 32]);
        let params = TransactionParams {
            fee: 0,
            min_fee: 1_000,
            flat_fee: true,
            first_valid: 1,
            last_valid: 1_001,
            genesis_id: "memnet-v1".into(),
            genesis_hash: [0xaa; 32],
        };
        let sender = Address::from_public_key(kp.public_key());
        let txn = PaymentBuilder::new(sender, sender, 0, params)
            .note(note.to_vec())
            .build()
            .unwrap();
        (kp, txn)
    }

    #[test]
    fn test_canonical_encoding_deterministic() {
        let (_, txn) = sample(b"hello");
        assert_eq!(canonical_bytes(&txn), canonical_bytes(&txn.clone()));
    }

    #[test]
    fn test_empty_note_omitted() {
        let (_, with) = sample(b"x");
        let (_, without) = sample(b"");
        // key 9 plus a one-byte length plus the byte itself
        assert_eq!(canonical_bytes(&with).len(), canonical_bytes(&without).len() + 3);
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 1 << 32);
        assert_eq!(buf[0], 0x1b);
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn test_map_key_ordering() {
        let mut buf = Vec::new();
        let entries = vec![
            (key(8), Value::Integer(80.into())),
            (key(0), Value::Integer(0.into())),
            (key(5), Value::Integer(50.into())),
        ];
        encode_map_canonical(&mut buf, &entries);

        assert_eq!(buf[0], 0xa3);
        assert_eq!(buf[1], 0x00);
        assert_eq!(buf[3], 0x05);
        assert_eq!(buf[6], 0x08);
    }

    #[test]
    fn test_signed_roundtrip_preserves_note() {
        let (kp, txn) = sample(b"app:j{\"k\":1}");
        let signed = txn.sign(&kp);
        let decoded = decode_signed_transaction(&signed_transaction_bytes(&signed)).unwrap();
        assert_eq!(decoded.txn.note(), b"app:j{\"k\":1}");
        assert_eq!(decoded.signature, signed.signature);
    }

    #[test]
    fn test_decode_rejects_trailing_garbage_and_noncanonical() {
        let (kp, txn) = sample(b"");
        let mut bytes = signed_transaction_bytes(&txn.sign(&kp));
        bytes.push(0x00);
        assert!(decode_signed_transaction(&bytes).is_err());

        assert!(decode_signed_transaction(&[0xa0]).is_err());
        assert!(decode_signed_transaction(b"not cbor").is_err());
    }
}
