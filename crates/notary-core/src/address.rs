//! Ledger addresses.
//!
//! An address is the 32-byte public key followed by a 4-byte checksum (the
//! last four bytes of its Blake3 hash), rendered as unpadded uppercase base32.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::crypto::{base32_decode, base32_encode, PublicKey};
use crate::error::CoreError;

/// Length of the checksum appended to the public key.
const CHECKSUM_LEN: usize = 4;

/// Length of the rendered address string.
pub const ADDRESS_LEN: usize = 58;

/// A ledger account address, derived from a public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(PublicKey);

impl Address {
    /// Derive the address for a public key.
    pub const fn from_public_key(key: PublicKey) -> Self {
        Self(key)
    }

    /// The public key this address encodes.
    pub const fn public_key(&self) -> &PublicKey {
        &self.0
    }

    /// The all-zero address (no key holds it).
    pub const ZERO: Self = Self(PublicKey([0u8; 32]));

    fn checksum(key: &PublicKey) -> [u8; CHECKSUM_LEN] {
        let hash = blake3::hash(key.as_bytes());
        let mut sum = [0u8; CHECKSUM_LEN];
        sum.copy_from_slice(&hash.as_bytes()[32 - CHECKSUM_LEN..]);
        sum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = Vec::with_capacity(32 + CHECKSUM_LEN);
        bytes.extend_from_slice(self.0.as_bytes());
        bytes.extend_from_slice(&Self::checksum(&self.0));
        f.write_str(&base32_encode(&bytes, true))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.to_string();
        write!(f, "Address({}...)", &s[..8])
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LEN {
            return Err(CoreError::InvalidAddress(format!(
                "expected {} characters, got {}",
                ADDRESS_LEN,
                s.len()
            )));
        }
        if s.bytes().any(|c| c.is_ascii_lowercase()) {
            return Err(CoreError::InvalidAddress("addresses are uppercase".into()));
        }
        let bytes = base32_decode(s)
            .ok_or_else(|| CoreError::InvalidAddress("not base32".into()))?;
        if bytes.len() != 32 + CHECKSUM_LEN {
            return Err(CoreError::InvalidAddress("wrong decoded length".into()));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes[..32]);
        let key = PublicKey(key);

        if bytes[32..] != Self::checksum(&key) {
            return Err(CoreError::InvalidAddress("checksum mismatch".into()));
        }
        Ok(Self(key))
    }
}

impl TryFrom<&str> for Address {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PublicKey> for Address {
    fn from(key: PublicKey) -> Self {
        Self(key)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
