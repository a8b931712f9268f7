//! PinningTransport trait: one upload request, one raw response.
//!
//! Status interpretation lives in the publisher, so every transport reports
//! the service's answer verbatim.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::credential::Credential;
use crate::error::Result;

/// A single upload.
#[derive(Debug, Clone)]
pub struct PinRequest {
    pub bytes: Bytes,
    /// File name sent with the content part.
    pub file_name: String,
    /// Name recorded in the service's pin metadata.
    pub display_name: String,
    pub credential: Credential,
}

/// Raw service answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinResponse {
    pub status: u16,
    pub body: String,
}

impl PinResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async interface to a pinning service.
#[async_trait]
pub trait PinningTransport: Send + Sync {
    /// Perform the upload.
    ///
    /// Returns `Err` only when no HTTP response was received; service errors
    /// come back as a non-2xx [`PinResponse`].
    async fn pin(&self, request: PinRequest) -> Result<PinResponse>;
}

#[async_trait]
impl<T: PinningTransport + ?Sized> PinningTransport for Arc<T> {
    async fn pin(&self, request: PinRequest) -> Result<PinResponse> {
        (**self).pin(request).await
    }
}
