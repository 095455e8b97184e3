//! # rubber-http
//!
//! The transport collaborator of the rubber client: everything that touches
//! the network lives here, behind the [`Transport`] trait.
//!
//! - [`HttpTransport`]: reqwest-backed implementation with connection
//!   pooling, timeouts and gzip
//! - [`MockTransport`]: in-memory double that records requests, for tests
//! - [`RawResponse`]: status, headers, body, and the body parsed as JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rubber_http::{HttpTransport, Method, Transport, TransportConfig, TransportRequest};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(
//!         TransportConfig::builder()
//!             .timeout(Duration::from_secs(5))
//!             .build(),
//!     )?;
//!
//!     let response = transport
//!         .send(TransportRequest::new(Method::GET, "http://localhost:9200/_count"))
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod mock;
mod request;
mod response;
mod transport;

pub use config::{TransportConfig, TransportConfigBuilder};
pub use error::{Result, TransportError};
pub use mock::{MockFailure, MockTransport, RecordedRequest};
pub use request::{RequestOptions, TransportRequest};
pub use response::RawResponse;
pub use transport::{HttpTransport, Transport};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
