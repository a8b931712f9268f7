//! Artifact publisher: upload one file, get back its content identifier.

use std::path::Path;

use bytes::Bytes;
use notary_core::Cid;
use tracing::{debug, info, warn};

use crate::config::PinConfig;
use crate::credential::Credential;
use crate::error::{PinError, Result};
use crate::transport::{PinRequest, PinningTransport};

/// Uploads artifacts through a [`PinningTransport`].
///
/// Each call to [`publish`](Self::publish) performs at most one upload and
/// never retries. The returned CID is taken from the service as-is.
pub struct ArtifactPublisher<T: PinningTransport> {
    config: PinConfig,
    transport: T,
    credential: Option<Credential>,
}

impl<T: PinningTransport> ArtifactPublisher<T> {
    pub fn new(config: PinConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            credential: None,
        }
    }

    /// Use `credential` instead of reading `config.credential_var`.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn config(&self) -> &PinConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetchable URL for `cid`.
    pub fn gateway_url(&self, cid: &Cid) -> String {
        format!("{}{}", self.config.gateway_base, cid)
    }

    fn resolve_credential(&self) -> Result<Credential> {
        match &self.credential {
            Some(credential) => Ok(credential.clone()),
            None => Credential::from_env(&self.config.credential_var),
        }
    }

    /// Upload the file at `path` and return its CID.
    ///
    /// `display_name` is recorded in the service's metadata; it defaults to
    /// the file name.
    pub async fn publish(&self, path: impl AsRef<Path>, display_name: Option<&str>) -> Result<Cid> {
        let path = path.as_ref();
        let credential = self.resolve_credential()?;
        let limit = self.config.max_artifact_bytes;

        let io_err = |source| PinError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = tokio::fs::metadata(path).await.map_err(io_err)?.len();
        if size > limit {
            warn!(path = %path.display(), size, limit, "artifact too large");
            return Err(PinError::ArtifactTooLarge { size, limit });
        }

        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        // The file may have grown since the metadata read.
        let size = bytes.len() as u64;
        if size > limit {
            return Err(PinError::ArtifactTooLarge { size, limit });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_owned());
        let display_name = display_name.unwrap_or(file_name.as_str()).to_owned();

        debug!(path = %path.display(), size, name = %display_name, "publishing artifact");
        let response = self
            .transport
            .pin(PinRequest {
                bytes: Bytes::from(bytes),
                file_name,
                display_name: display_name.clone(),
                credential,
            })
            .await?;

        if !response.is_success() {
            warn!(status = response.status, body = %response.body, "pinning service error");
            return Err(PinError::from_status(response.status, response.body));
        }

        let cid = parse_cid(&response.body)?;
        info!(cid = %cid, name = %display_name, size, "artifact pinned");
        Ok(cid)
    }
}

/// Extract the `IpfsHash` field of a success body.
fn parse_cid(body: &str) -> Result<Cid> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| PinError::MalformedResponse(format!("invalid JSON: {e}")))?;

    match value.get("IpfsHash") {
        Some(serde_json::Value::String(s)) => Cid::new(s.as_str())
            .ok_or_else(|| PinError::MalformedResponse("IpfsHash is empty".into())),
        Some(other) => Err(PinError::MalformedResponse(format!(
            "IpfsHash is not a string: {other}"
        ))),
        None => Err(PinError::MalformedResponse(format!(
            "missing IpfsHash in {body}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryPinning;

    fn publisher(pinning: Arc<MemoryPinning>) -> ArtifactPublisher<Arc<MemoryPinning>> {
        ArtifactPublisher::new(PinConfig::default(), pinning)
            .with_credential(Credential::new("test-jwt").unwrap())
    }

    fn artifact(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_parse_cid() {
        assert_eq!(parse_cid(r#"{"IpfsHash":"bafy123"}"#).unwrap().as_str(), "bafy123");
        assert!(matches!(parse_cid("{}"), Err(PinError::MalformedResponse(_))));
        assert!(matches!(
            parse_cid(r#"{"IpfsHash":42}"#),
            Err(PinError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_cid(r#"{"IpfsHash":""}"#),
            Err(PinError::MalformedResponse(_))
        ));
        assert!(matches!(parse_cid("<html>"), Err(PinError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_same_bytes_same_cid() {
        let pinning = Arc::new(MemoryPinning::new());
        let publisher = publisher(Arc::clone(&pinning));

        let a = artifact(b"{\"name\":\"demo\"}");
        let b = artifact(b"{\"name\":\"demo\"}");
        let first = publisher.publish(a.path(), Some("demo")).await.unwrap();
        let second = publisher.publish(b.path(), Some("demo")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, Cid::for_bytes(b"{\"name\":\"demo\"}"));
        assert_eq!(pinning.call_count(), 2);
    }

    #[tokio::test]
    async fn test_oversized_artifact_never_uploaded() {
        let pinning = Arc::new(MemoryPinning::new());
        let config = PinConfig {
            max_artifact_bytes: 8,
            ..PinConfig::default()
        };
        let publisher = ArtifactPublisher::new(config, Arc::clone(&pinning))
            .with_credential(Credential::new("test-jwt").unwrap());

        let file = artifact(&[0u8; 9]);
        let err = publisher.publish(file.path(), None).await.unwrap_err();
        assert!(matches!(err, PinError::ArtifactTooLarge { size: 9, limit: 8 }));
        assert_eq!(pinning.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_before_io() {
        let pinning = Arc::new(MemoryPinning::new());
        let config = PinConfig {
            credential_var: "NOTARY_PIN_TEST_NO_SUCH_VAR".into(),
            ..PinConfig::default()
        };
        let publisher = ArtifactPublisher::new(config, Arc::clone(&pinning));

        let err = publisher
            .publish("/nonexistent/spec.json", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PinError::MissingCredential(_)));
        assert_eq!(pinning.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let pinning = Arc::new(MemoryPinning::new());
        let err = publisher(Arc::clone(&pinning))
            .publish("/nonexistent/spec.json", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PinError::Io { .. }));
        assert_eq!(pinning.call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_errors_are_mapped() {
        let pinning = Arc::new(MemoryPinning::new());
        let publisher = publisher(Arc::clone(&pinning));
        let file = artifact(b"spec");

        for (status, expect) in [(400u16, "BadRequest"), (401, "Unauthorized"), (500, "Internal")] {
            pinning.respond_with(status, format!("status {status}"));
            let err = publisher.publish(file.path(), None).await.unwrap_err();
            assert_eq!(err.status(), Some(status));
            assert!(format!("{err:?}").contains(expect));
        }
    }

    #[tokio::test]
    async fn test_display_name_defaults_to_file_name() {
        let pinning = Arc::new(MemoryPinning::new());
        let file = artifact(b"spec");
        publisher(Arc::clone(&pinning))
            .publish(file.path(), None)
            .await
            .unwrap();

        let upload = &pinning.uploads()[0];
        assert_eq!(upload.display_name, upload.file_name);
        assert_eq!(
            Some(upload.file_name.as_str()),
            file.path().file_name().and_then(|n| n.to_str())
        );
    }

    #[test]
    fn test_gateway_url() {
        let publisher = publisher(Arc::new(MemoryPinning::new()));
        let cid = Cid::new("bafyabc").unwrap();
        assert_eq!(
            publisher.gateway_url(&cid),
            "https://gateway.pinata.cloud/ipfs/bafyabc"
        );
    }
}
