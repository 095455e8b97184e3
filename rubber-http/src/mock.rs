//! In-memory transport double.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::{RawResponse, RequestOptions, Result, Transport, TransportError, TransportRequest};

/// A request seen by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP verb.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Serialized body.
    pub body: Option<String>,
    /// Pass-through options.
    pub options: RequestOptions,
}

/// Failure a [`MockTransport`] can be told to simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Simulate a refused connection.
    Connection(String),
    /// Simulate a timeout.
    Timeout(Duration),
}

impl MockFailure {
    fn to_error(&self) -> TransportError {
        match self {
            MockFailure::Connection(msg) => TransportError::Connection(msg.clone()),
            MockFailure::Timeout(after) => TransportError::Timeout(*after),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: StatusCode, body: Bytes },
    Fail(MockFailure),
}

/// Transport double that never touches the network.
///
/// Every request is recorded; every request is answered with the configured
/// reply. The default reply is `200 OK` with body `{}`. Clones share the
/// same record and reply.
///
/// ```
/// use rubber_http::{Method, MockTransport, Transport, TransportRequest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mock = MockTransport::new().with_body(r#"{"count": 3}"#);
/// let response = mock
///     .send(TransportRequest::new(Method::GET, "http://localhost:9200/_count"))
///     .await
///     .unwrap();
///
/// assert_eq!(response.json().unwrap()["count"], 3);
/// assert_eq!(mock.request_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    reply: Arc<Mutex<Reply>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a mock answering `200 OK` with `{}`.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new(Reply::Respond {
                status: StatusCode::OK,
                body: Bytes::from_static(b"{}"),
            })),
        }
    }

    /// Create a mock that fails every request.
    pub fn failing(failure: MockFailure) -> Self {
        let mock = Self::new();
        mock.set_failure(failure);
        mock
    }

    /// Answer with `200 OK` and the given body.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        self.set_response(StatusCode::OK, body);
        self
    }

    /// Answer with the given status and body.
    pub fn with_response(self, status: StatusCode, body: impl Into<Bytes>) -> Self {
        self.set_response(status, body);
        self
    }

    /// Replace the reply for subsequent requests.
    pub fn set_response(&self, status: StatusCode, body: impl Into<Bytes>) {
        *self.reply.lock() = Reply::Respond {
            status,
            body: body.into(),
        };
    }

    /// Fail subsequent requests.
    pub fn set_failure(&self, failure: MockFailure) {
        *self.reply.lock() = Reply::Fail(failure);
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Number of requests seen.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Forget recorded requests.
    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        self.requests.lock().push(RecordedRequest {
            method: request.method,
            url: request.url,
            body: request.body,
            options: request.options,
        });

        let reply = self.reply.lock().clone();
        match reply {
            Reply::Respond { status, body } => Ok(RawResponse::new(status, HeaderMap::new(), body)),
            Reply::Fail(failure) => Err(failure.to_error()),
        }
    }
}
