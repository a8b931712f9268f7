//! HTTP transport: multipart upload over reqwest.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::config::PinConfig;
use crate::error::Result;
use crate::transport::{PinRequest, PinResponse, PinningTransport};

/// Uploads to a Pinata-compatible `pinFileToIPFS` endpoint.
#[derive(Debug, Clone)]
pub struct HttpPinningTransport {
    client: Client,
    endpoint: String,
}

impl HttpPinningTransport {
    /// Build a transport with the configured endpoint and request timeout.
    pub fn new(config: &PinConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PinningTransport for HttpPinningTransport {
    async fn pin(&self, request: PinRequest) -> Result<PinResponse> {
        let size = request.bytes.len();
        let metadata = serde_json::json!({ "name": request.display_name }).to_string();

        let form = Form::new()
            .part(
                "file",
                Part::bytes(request.bytes.to_vec()).file_name(request.file_name),
            )
            .text("pinataMetadata", metadata);

        debug!(endpoint = %self.endpoint, size, "uploading artifact");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(request.credential.expose())
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "pinning service responded");

        Ok(PinResponse { status, body })
    }
}
