//! In-memory implementation of the PinningTransport trait.
//!
//! This is primarily for testing. CIDs are derived from the uploaded bytes,
//! so identical content always pins to the same CID.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use notary_core::Cid;

use crate::error::Result;
use crate::transport::{PinRequest, PinResponse, PinningTransport};

/// One upload seen by [`MemoryPinning`].
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub display_name: String,
    pub size: usize,
    /// CID the content hashes to, whether or not the upload succeeded.
    pub cid: Cid,
}

/// Content-addressed fake pinning service.
#[derive(Default)]
pub struct MemoryPinning {
    inner: Mutex<MemoryPinningInner>,
}

#[derive(Default)]
struct MemoryPinningInner {
    uploads: Vec<Upload>,
    pinned: HashMap<Cid, Bytes>,
    scripted: VecDeque<PinResponse>,
    required_token: Option<String>,
}

impl MemoryPinning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer 401 to any request not carrying `token`.
    pub fn requiring_token(token: impl Into<String>) -> Self {
        let pinning = Self::default();
        pinning.lock().required_token = Some(token.into());
        pinning
    }

    fn lock(&self) -> MutexGuard<'_, MemoryPinningInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer the next request with `status` and `body` instead of pinning.
    pub fn respond_with(&self, status: u16, body: impl Into<String>) {
        self.lock().scripted.push_back(PinResponse {
            status,
            body: body.into(),
        });
    }

    /// Number of upload requests received.
    pub fn call_count(&self) -> usize {
        self.lock().uploads.len()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.lock().uploads.clone()
    }

    /// Content pinned under `cid`.
    pub fn content(&self, cid: &Cid) -> Option<Bytes> {
        self.lock().pinned.get(cid).cloned()
    }
}

#[async_trait]
impl PinningTransport for MemoryPinning {
    async fn pin(&self, request: PinRequest) -> Result<PinResponse> {
        let mut inner = self.lock();
        let cid = Cid::for_bytes(&request.bytes);
        inner.uploads.push(Upload {
            file_name: request.file_name,
            display_name: request.display_name,
            size: request.bytes.len(),
            cid: cid.clone(),
        });

        if let Some(scripted) = inner.scripted.pop_front() {
            return Ok(scripted);
        }

        if let Some(token) = &inner.required_token {
            if request.credential.expose() != token {
                return Ok(PinResponse {
                    status: 401,
                    body: r#"{"error":{"reason":"INVALID_CREDENTIALS"}}"#.into(),
                });
            }
        }

        let body = serde_json::json!({
            "IpfsHash": cid.as_str(),
            "PinSize": request.bytes.len(),
            "isDuplicate": inner.pinned.contains_key(&cid),
        })
        .to_string();
        inner.pinned.insert(cid, request.bytes);

        Ok(PinResponse { status: 200, body })
    }
}
