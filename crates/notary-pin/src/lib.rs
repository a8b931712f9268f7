//! # Notary Pin
//!
//! Publishes artifacts to a content-addressed pinning service and returns
//! the resulting content identifier.
//!
//! ## Key Types
//!
//! - [`ArtifactPublisher`] - Size check, credential resolution, one upload
//! - [`PinningTransport`] - The async trait for the upload itself
//! - [`HttpPinningTransport`] - Multipart upload over HTTPS
//! - [`MemoryPinning`] - Content-addressed fake for tests
//! - [`PinError`] - Closed error taxonomy keyed by HTTP status
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notary_pin::{ArtifactPublisher, HttpPinningTransport, PinConfig};
//!
//! async fn example() {
//!     let config = PinConfig::default();
//!     let transport = HttpPinningTransport::new(&config).unwrap();
//!     let publisher = ArtifactPublisher::new(config, transport);
//!
//!     // Reads the bearer token from PINATA_JWT.
//!     let cid = publisher.publish("app.arc32.json", Some("demo")).await.unwrap();
//!     println!("{}", publisher.gateway_url(&cid));
//! }
//! ```

pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod memory;
pub mod publisher;
pub mod transport;

pub use config::PinConfig;
pub use credential::Credential;
pub use error::{PinError, Result};
pub use http::HttpPinningTransport;
pub use memory::{MemoryPinning, Upload};
pub use publisher::ArtifactPublisher;
pub use transport::{PinRequest, PinResponse, PinningTransport};
