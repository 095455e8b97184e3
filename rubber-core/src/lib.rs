//! # rubber-core
//!
//! Resource resolution and response shaping for a document-store HTTP API.
//!
//! A [`Client`] scoped to an index and a document type turns names into
//! [`Resource`]s. A resource serializes its body, performs one request
//! through a [`Transport`](rubber_http::Transport) and wraps the response:
//! plain [`Envelope`]s for document, count and mapping requests,
//! [`SearchEnvelope`]s with parsed [`Record`] hits for searches.
//!
//! ## Features
//!
//! - **Path composition**: `index/type/name`, empty parts skipped
//! - **Special endpoints**: `search`, `count`, `mapping`, built once per client
//! - **Body serialization**: JSON maps, pre-serialized strings, and values
//!   implementing [`Indexable`]
//! - **Navigable hits**: `hit.get("id")` finds `_id`, `hit.path("source.title")`
//! - **Lifecycle hooks**: mirror saves and deletes of host records
//! - **Injectable transport**: swap in a [`MockTransport`](rubber_http::MockTransport) for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rubber_core::Client;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("blog", "article")?;
//!
//!     client.put("1", json!({"title": "Fearless concurrency"})).await?;
//!
//!     if let Some(response) = client
//!         .search()
//!         .get(json!({"query": {"match": {"title": "concurrency"}}}))
//!         .await?
//!     {
//!         for hit in response.results() {
//!             println!("{} {:?}", hit.get("id")?.as_str().unwrap_or("-"), hit.get("score")?.as_f64());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod record;
pub mod resource;
pub mod response;
pub mod serializer;

pub use client::{Client, ClientBuilder, Endpoint, SpecialResource};
pub use config::{ConfigError, DEFAULT_BASE_URL, Settings};
pub use error::{Result, RubberError};
pub use hooks::{HookRegistry, LifecycleHook, Model, ModelSignals};
pub use record::{Field, Record};
pub use resource::{InstanceResource, Resource, Wrapper};
pub use response::{Envelope, HitCollection, HitFactory, SearchEnvelope, Shards, record_hits};
pub use serializer::{Body, EMPTY_BODY, FieldValue, Indexable, encode_record_fields, serialize};
