//! The transport seam and its reqwest implementation.

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use std::sync::Arc;
use tracing::debug;

use crate::{RawResponse, Result, TransportConfig, TransportError, TransportRequest};

/// Anything able to turn a [`TransportRequest`] into a [`RawResponse`].
///
/// Implementations perform exactly one round-trip per call: no retries, no
/// batching. An HTTP error status is returned as a response, only failures
/// to obtain a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and wait for the complete response.
    async fn send(&self, request: TransportRequest) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        (**self).send(request).await
    }
}

/// HTTP transport backed by a pooled reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    config: Arc<TransportConfig>,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .build()?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Create a transport with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(TransportConfig::default())
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        let TransportRequest {
            method,
            url,
            body,
            options,
        } = request;

        let parsed =
            url::Url::parse(&url).map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))?;

        let mut builder = self.inner.request(method.clone(), parsed);

        for (name, value) in &self.config.default_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = builder.header(CONTENT_TYPE, "application/json");
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let timeout = options.timeout.unwrap_or(self.config.timeout);
        if let Some(per_request) = options.timeout {
            builder = builder.timeout(per_request);
        }

        debug!(method = %method, url = %url, "Sending request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else if e.is_connect() {
                TransportError::Connection(e.to_string())
            } else {
                TransportError::Http(e)
            }
        })?;

        debug!(method = %method, url = %url, status = %response.status(), "Received response");

        RawResponse::from_reqwest(response)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(timeout)
                } else {
                    TransportError::Http(e)
                }
            })
    }
}
