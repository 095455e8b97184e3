//! Path-bound request objects.

use rubber_http::{Method, RawResponse, RequestOptions, Transport, TransportRequest};
use std::fmt;
use std::sync::Arc;
use tracing::error;

use crate::config::Settings;
use crate::error::Result;
use crate::response::Envelope;
use crate::serializer::{Body, Indexable, serialize};

/// Turns a raw response into the caller's view of it.
pub type Wrapper<T> = Arc<dyn Fn(RawResponse) -> T + Send + Sync>;

/// A path on the document store, with the verbs that act on it.
///
/// Each verb serializes its body, performs one round-trip through the
/// transport and hands the response to the wrapper. A transport failure is
/// logged and reported as `Ok(None)` unless the resource was built with
/// [`with_raise_on_error`](Self::with_raise_on_error), in which case it is returned as
/// an error. Serialization failures are always returned.
///
/// ```
/// use rubber_core::Resource;
/// use rubber_http::MockTransport;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rubber_core::Result<()> {
/// let mock = MockTransport::new().with_body(r#"{"count": 12}"#);
/// let count = Resource::new("tests/_count", Arc::new(mock.clone()))
///     .with_base_url("http://localhost:9200/");
///
/// let response = count.call(()).await?.unwrap();
/// assert_eq!(response.json().unwrap()["count"], 12);
/// assert_eq!(mock.last_request().unwrap().url, "http://localhost:9200/tests/_count");
/// # Ok(())
/// # }
/// ```
pub struct Resource<T = Envelope> {
    path: String,
    base_url: String,
    transport: Arc<dyn Transport>,
    wrapper: Wrapper<T>,
    raise_on_error: bool,
}

impl Resource<Envelope> {
    /// A resource answering with plain [`Envelope`]s.
    pub fn new(path: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self::with_wrapper(path, transport, Envelope::new)
    }
}

impl<T> Resource<T> {
    /// A resource routing responses through `wrapper`.
    ///
    /// The base URL and error mode start from the process settings.
    pub fn with_wrapper<F>(path: impl Into<String>, transport: Arc<dyn Transport>, wrapper: F) -> Self
    where
        F: Fn(RawResponse) -> T + Send + Sync + 'static,
    {
        Self::from_parts(path, transport, Arc::new(wrapper)).with_settings(&Settings::from_env())
    }

    pub(crate) fn from_parts(
        path: impl Into<String>,
        transport: Arc<dyn Transport>,
        wrapper: Wrapper<T>,
    ) -> Self {
        Self {
            path: path.into(),
            base_url: Settings::default().resolve_base_url(None),
            transport,
            wrapper,
            raise_on_error: false,
        }
    }

    /// Set the base URL. Any string is accepted, the empty one included.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Propagate transport failures instead of logging them.
    pub fn with_raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    /// Apply the base URL and error mode of `settings`.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.base_url = settings.resolve_base_url(None);
        self.raise_on_error = settings.raise_on_error;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn raise_on_error(&self) -> bool {
        self.raise_on_error
    }

    /// The request URL: base URL and path, concatenated as-is.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    pub async fn get<'b>(&self, body: impl Into<Body<'b>>) -> Result<Option<T>> {
        self.send(Method::GET, body.into(), RequestOptions::default()).await
    }

    pub async fn put<'b>(&self, body: impl Into<Body<'b>>) -> Result<Option<T>> {
        self.send(Method::PUT, body.into(), RequestOptions::default()).await
    }

    pub async fn post<'b>(&self, body: impl Into<Body<'b>>) -> Result<Option<T>> {
        self.send(Method::POST, body.into(), RequestOptions::default()).await
    }

    pub async fn delete<'b>(&self, body: impl Into<Body<'b>>) -> Result<Option<T>> {
        self.send(Method::DELETE, body.into(), RequestOptions::default()).await
    }

    pub async fn get_with<'b>(
        &self,
        body: impl Into<Body<'b>>,
        options: RequestOptions,
    ) -> Result<Option<T>> {
        self.send(Method::GET, body.into(), options).await
    }

    pub async fn put_with<'b>(
        &self,
        body: impl Into<Body<'b>>,
        options: RequestOptions,
    ) -> Result<Option<T>> {
        self.send(Method::PUT, body.into(), options).await
    }

    pub async fn post_with<'b>(
        &self,
        body: impl Into<Body<'b>>,
        options: RequestOptions,
    ) -> Result<Option<T>> {
        self.send(Method::POST, body.into(), options).await
    }

    pub async fn delete_with<'b>(
        &self,
        body: impl Into<Body<'b>>,
        options: RequestOptions,
    ) -> Result<Option<T>> {
        self.send(Method::DELETE, body.into(), options).await
    }

    /// Calling a resource is a GET; pass `()` for no body.
    pub async fn call<'b>(&self, body: impl Into<Body<'b>>) -> Result<Option<T>> {
        self.get(body).await
    }

    /// Serialize, send, wrap.
    pub async fn send(
        &self,
        method: Method,
        body: Body<'_>,
        options: RequestOptions,
    ) -> Result<Option<T>> {
        let payload = serialize(&body)?;
        let request = TransportRequest::new(method.clone(), self.url())
            .with_body(payload)
            .with_options(options);

        match self.transport.send(request).await {
            Ok(raw) => Ok(Some((self.wrapper)(raw))),
            Err(e) if self.raise_on_error => Err(e.into()),
            Err(e) => {
                error!(method = %method, path = %self.path, error = %e, "request failed");
                Ok(None)
            }
        }
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
            wrapper: Arc::clone(&self.wrapper),
            raise_on_error: self.raise_on_error,
        }
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("base_url", &self.base_url)
            .field("raise_on_error", &self.raise_on_error)
            .finish_non_exhaustive()
    }
}

/// A resource bound to one record.
///
/// `put` and `post` take no body: they always send the bound record.
pub struct InstanceResource<'r, R, T = Envelope> {
    resource: Resource<T>,
    instance: &'r R,
}

impl<'r, R, T> InstanceResource<'r, R, T>
where
    R: Indexable + Sync,
{
    pub fn new(resource: Resource<T>, instance: &'r R) -> Self {
        Self { resource, instance }
    }

    pub fn instance(&self) -> &'r R {
        self.instance
    }

    pub fn resource(&self) -> &Resource<T> {
        &self.resource
    }

    pub fn path(&self) -> &str {
        self.resource.path()
    }

    /// Index the bound record.
    pub async fn put(&self) -> Result<Option<T>> {
        self.put_with(RequestOptions::default()).await
    }

    pub async fn put_with(&self, options: RequestOptions) -> Result<Option<T>> {
        self.resource
            .send(Method::PUT, Body::Object(self.instance), options)
            .await
    }

    pub async fn post(&self) -> Result<Option<T>> {
        self.post_with(RequestOptions::default()).await
    }

    pub async fn post_with(&self, options: RequestOptions) -> Result<Option<T>> {
        self.resource
            .send(Method::POST, Body::Object(self.instance), options)
            .await
    }

    pub async fn get<'b>(&self, body: impl Into<Body<'b>>) -> Result<Option<T>> {
        self.resource.get(body).await
    }

    pub async fn delete<'b>(&self, body: impl Into<Body<'b>>) -> Result<Option<T>> {
        self.resource.delete(body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RubberError;
    use rubber_http::{MockFailure, MockTransport, StatusCode};
    use rubber_log::LogCapture;
    use serde_json::{Map, Value, json};
    use std::time::Duration;
    use tracing::Level;

    fn resource(mock: &MockTransport, path: &str) -> Resource {
        Resource::new(path, Arc::new(mock.clone())).with_base_url("http://localhost:9200/")
    }

    struct Article {
        title: &'static str,
    }

    impl Indexable for Article {
        fn as_mapping(&self) -> Option<Map<String, Value>> {
            let mut map = Map::new();
            map.insert("title".to_string(), json!(self.title));
            Some(map)
        }
    }

    #[tokio::test]
    async fn test_verbs_use_their_method() {
        let mock = MockTransport::new();
        let r = resource(&mock, "a/b/1");

        r.get(Body::Empty).await.unwrap();
        r.put(json!({"x": 1})).await.unwrap();
        r.post(Body::raw("{}")).await.unwrap();
        r.delete(()).await.unwrap();

        let methods: Vec<Method> = mock.requests().into_iter().map(|req| req.method).collect();
        assert_eq!(methods, vec![Method::GET, Method::PUT, Method::POST, Method::DELETE]);
    }

    #[tokio::test]
    async fn test_call_is_bodiless_get() {
        let mock = MockTransport::new();
        resource(&mock, "tests/_mapping").call(()).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.body.as_deref(), Some("{}"));
        assert_eq!(request.url, "http://localhost:9200/tests/_mapping");
    }

    #[tokio::test]
    async fn test_call_forwards_body() {
        let mock = MockTransport::new();
        resource(&mock, "tests/_search")
            .call(json!({"query": {"match_all": {}}}))
            .await
            .unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::GET);
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"query": {"match_all": {}}}));
    }

    #[tokio::test]
    async fn test_url_is_plain_concatenation() {
        let mock = MockTransport::new();
        let r = Resource::new("x/y", Arc::new(mock.clone())).with_base_url("");
        assert_eq!(r.url(), "x/y");

        let r = r.with_base_url("http://es:9200");
        assert_eq!(r.url(), "http://es:9200x/y");
    }

    #[tokio::test]
    async fn test_settings_apply() {
        let settings = Settings {
            elasticsearch_url: Some("http://configured:9200/".to_string()),
            raise_on_error: true,
            ..Default::default()
        };
        let r = Resource::new("a", Arc::new(MockTransport::new())).with_settings(&settings);
        assert_eq!(r.url(), "http://configured:9200/a");
        assert!(r.raise_on_error());
    }

    #[tokio::test]
    async fn test_options_are_forwarded() {
        let mock = MockTransport::new();
        let options = RequestOptions::new()
            .query("toto", "titi")
            .timeout(Duration::from_secs(1));

        resource(&mock, "tests/article/_mapping")
            .put_with(json!({"some": "mapping"}), options.clone())
            .await
            .unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.options, options);
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"some": "mapping"}));
    }

    #[tokio::test]
    async fn test_response_is_wrapped() {
        let mock = MockTransport::new().with_response(StatusCode::NOT_FOUND, r#"{"found":false}"#);
        let envelope = resource(&mock, "a/b/2").call(()).await.unwrap().unwrap();
        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);
        assert_eq!(envelope.json().unwrap()["found"], false);
    }

    #[tokio::test]
    async fn test_custom_wrapper() {
        let mock = MockTransport::new().with_body(r#"{"count": 4}"#);
        let r = Resource::with_wrapper("_count", Arc::new(mock.clone()), |raw: RawResponse| {
            raw.json().and_then(|j| j["count"].as_u64())
        });

        assert_eq!(r.call(()).await.unwrap(), Some(Some(4)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_logged_once() {
        let capture = LogCapture::new();
        let _guard = capture.set_default();

        let mock = MockTransport::failing(MockFailure::Connection("refused".into()));
        let result = resource(&mock, "tests/article/1").delete(()).await.unwrap();

        assert!(result.is_none());
        let errors = capture.events_at(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field("method"), Some("DELETE"));
        assert_eq!(errors[0].field("path"), Some("tests/article/1"));
    }

    #[tokio::test]
    async fn test_transport_failure_raises_when_asked() {
        let mock = MockTransport::failing(MockFailure::Timeout(Duration::from_secs(30)));
        let err = resource(&mock, "a")
            .with_raise_on_error(true)
            .get(())
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_serialization_failure_always_propagates() {
        struct Opaque;
        impl Indexable for Opaque {}

        let mock = MockTransport::new();
        let err = resource(&mock, "a").put(&Opaque).await.unwrap_err();

        assert!(matches!(err, RubberError::Unserializable(_)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_instance_put_sends_bound_record() {
        let mock = MockTransport::new();
        let article = Article { title: "Rust" };
        let instance = InstanceResource::new(resource(&mock, "tests/article/123"), &article);

        assert_eq!(instance.path(), "tests/article/123");
        instance.put().await.unwrap();
        instance.post().await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::PUT);
        assert_eq!(requests[0].url, "http://localhost:9200/tests/article/123");
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"title":"Rust"}"#));
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[1].body, requests[0].body);
    }

    #[tokio::test]
    async fn test_instance_get_and_delete_delegate() {
        let mock = MockTransport::new();
        let article = Article { title: "Rust" };
        let instance = InstanceResource::new(resource(&mock, "tests/article/123"), &article);

        instance.get(()).await.unwrap();
        instance.delete(()).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[1].method, Method::DELETE);
        assert_eq!(requests[1].body.as_deref(), Some("{}"));
    }
}
