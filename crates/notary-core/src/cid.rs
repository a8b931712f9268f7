//! Content identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::crypto::base32_encode;

/// A content identifier as returned by a pinning service.
///
/// The string is opaque to this crate; the only local constructor that
/// derives one from content is [`Cid::for_bytes`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    /// Wrap a CID string. Returns `None` for an empty string.
    pub fn new(s: impl Into<String>) -> Option<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// CIDv1 for raw bytes (raw codec, sha2-256 multihash, base32 multibase).
    ///
    /// Format: `b` + base32lower(0x01 || 0x55 || 0x12 || 0x20 || sha256(data))
    pub fn for_bytes(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut cid_bytes = Vec::with_capacity(36);
        cid_bytes.push(0x01); // CIDv1
        cid_bytes.push(0x55); // raw codec
        cid_bytes.push(0x12); // sha2-256 multihash
        cid_bytes.push(0x20); // 32 bytes
        cid_bytes.extend_from_slice(&digest);
        Self(format!("b{}", base32_encode(&cid_bytes, false)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
