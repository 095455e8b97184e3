//! Index/type-scoped client.

use async_trait::async_trait;
use rubber_http::{HttpTransport, RawResponse, Transport, TransportConfig};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, RubberError};
use crate::hooks::{HookRegistry, LifecycleHook, Model};
use crate::record::Record;
use crate::resource::{InstanceResource, Resource, Wrapper};
use crate::response::{Envelope, HitFactory, SearchEnvelope, record_hits};
use crate::serializer::Body;

/// Special endpoints reachable by name on a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    Count,
    Mapping,
}

impl Endpoint {
    /// Every special endpoint, in lookup order.
    pub const ALL: [Endpoint; 3] = [Endpoint::Search, Endpoint::Count, Endpoint::Mapping];

    /// Look up an endpoint by its attribute name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Search => "search",
            Endpoint::Count => "count",
            Endpoint::Mapping => "mapping",
        }
    }

    /// Path token of the endpoint.
    pub fn token(&self) -> &'static str {
        match self {
            Endpoint::Search => "_search",
            Endpoint::Count => "_count",
            Endpoint::Mapping => "_mapping",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A special endpoint resolved through [`Client::endpoint`].
pub enum SpecialResource<'c, H> {
    Search(&'c Resource<SearchEnvelope<H>>),
    Count(&'c Resource<Envelope>),
    Mapping(&'c Resource<Envelope>),
}

impl<H> SpecialResource<'_, H> {
    pub fn path(&self) -> &str {
        match self {
            SpecialResource::Search(r) => r.path(),
            SpecialResource::Count(r) | SpecialResource::Mapping(r) => r.path(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            SpecialResource::Search(_) => Endpoint::Search,
            SpecialResource::Count(_) => Endpoint::Count,
            SpecialResource::Mapping(_) => Endpoint::Mapping,
        }
    }
}

impl<H> fmt::Debug for SpecialResource<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SpecialResource")
            .field(&self.endpoint())
            .field(&self.path())
            .finish()
    }
}

/// A client scoped to an index and a document type.
///
/// Paths are built from the non-empty parts of `index/type/name`. The
/// special resources (search, count, mapping) are built on first use and
/// reused afterwards.
///
/// ```
/// use rubber_core::Client;
/// use rubber_http::MockTransport;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rubber_core::Result<()> {
/// let mock = MockTransport::new().with_body(r#"{"hits":{"total":1,"hits":[{"_id":"1"}]}}"#);
/// let client = Client::builder()
///     .index("tests")
///     .doc_type("article")
///     .base_url("http://localhost:9200/")
///     .transport(Arc::new(mock.clone()))
///     .build()?;
///
/// let response = client.search().get(json!({"query": {"match_all": {}}})).await?.unwrap();
/// assert_eq!(response.results()[0].get("id")?, "1");
/// assert_eq!(mock.last_request().unwrap().url, "http://localhost:9200/tests/article/_search");
/// # Ok(())
/// # }
/// ```
pub struct Client<H = Record> {
    index_name: String,
    type_name: String,
    base_url: String,
    transport: Arc<dyn Transport>,
    auto_index: bool,
    disable_auto_index: bool,
    raise_on_error: bool,
    hit_factory: HitFactory<H>,
    search: OnceLock<Resource<SearchEnvelope<H>>>,
    count: OnceLock<Resource<Envelope>>,
    mapping: OnceLock<Resource<Envelope>>,
}

impl Client<Record> {
    pub fn builder() -> ClientBuilder<Record> {
        ClientBuilder::new()
    }

    /// A client over HTTP, configured from the environment.
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Result<Self> {
        Self::builder().index(index).doc_type(doc_type).build()
    }

    /// A builder whose index and type default to the model's app label and
    /// model name.
    pub fn for_model<M: Model>() -> ClientBuilder<Record> {
        Self::builder()
            .index(M::app_label())
            .doc_type(M::model_name())
    }
}

impl<H: 'static> Client<H> {
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auto_index(&self) -> bool {
        self.auto_index && !self.disable_auto_index
    }

    pub fn raise_on_error(&self) -> bool {
        self.raise_on_error
    }

    /// Join the non-empty parts of `index/type/name` with `/`.
    pub fn makepath(&self, name: &str) -> String {
        [self.index_name.as_str(), self.type_name.as_str(), name]
            .into_iter()
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// A fresh resource at `makepath(name)`.
    pub fn resource(&self, name: &str) -> Resource<Envelope> {
        self.build_resource(self.makepath(name), envelope_wrapper())
    }

    /// Fetch a document.
    pub async fn get(&self, id: &str) -> Result<Option<Envelope>> {
        self.resource(id).call(()).await
    }

    /// Index a document.
    pub async fn put<'b>(&self, id: &str, body: impl Into<Body<'b>>) -> Result<Option<Envelope>> {
        self.resource(id).put(body).await
    }

    /// Delete a document.
    pub async fn delete(&self, id: &str) -> Result<Option<Envelope>> {
        self.resource(id).delete(Body::Empty).await
    }

    /// The `_search` resource. Responses carry parsed hits.
    pub fn search(&self) -> &Resource<SearchEnvelope<H>> {
        self.search.get_or_init(|| {
            let factory = Arc::clone(&self.hit_factory);
            let wrapper: Wrapper<SearchEnvelope<H>> =
                Arc::new(move |raw: RawResponse| SearchEnvelope::new(raw, &*factory));
            self.special(Endpoint::Search, wrapper)
        })
    }

    /// The `_count` resource.
    pub fn count(&self) -> &Resource<Envelope> {
        self.count
            .get_or_init(|| self.special(Endpoint::Count, envelope_wrapper()))
    }

    /// The `_mapping` resource.
    pub fn mapping(&self) -> &Resource<Envelope> {
        self.mapping
            .get_or_init(|| self.special(Endpoint::Mapping, envelope_wrapper()))
    }

    /// Resolve a special resource by name.
    pub fn endpoint(&self, name: &str) -> Result<SpecialResource<'_, H>> {
        match Endpoint::from_name(name) {
            Some(Endpoint::Search) => Ok(SpecialResource::Search(self.search())),
            Some(Endpoint::Count) => Ok(SpecialResource::Count(self.count())),
            Some(Endpoint::Mapping) => Ok(SpecialResource::Mapping(self.mapping())),
            None => Err(RubberError::UnknownAttribute(name.to_string())),
        }
    }

    /// A resource bound to `record`, at the path of its primary key.
    ///
    /// A record without a primary key maps to the index/type path itself.
    pub fn instance<'r, M: Model>(&self, record: &'r M) -> InstanceResource<'r, M> {
        let pk = record.pk().unwrap_or_default();
        InstanceResource::new(self.resource(&pk), record)
    }

    /// Connect this client to `registry` so saves and deletes of `M` are
    /// mirrored to the index. Does nothing, and returns `false`, when
    /// automatic indexing is off.
    pub fn register_hooks<M, R>(self: &Arc<Self>, registry: &R) -> bool
    where
        M: Model,
        R: HookRegistry<M> + ?Sized,
    {
        if !self.auto_index() {
            debug!(index = %self.index_name, doc_type = %self.type_name, "auto index disabled");
            return false;
        }
        registry.connect(Arc::clone(self) as Arc<dyn LifecycleHook<M>>);
        true
    }

    fn special<T>(&self, endpoint: Endpoint, wrapper: Wrapper<T>) -> Resource<T> {
        let path = self.makepath(endpoint.token());
        debug!(endpoint = %endpoint, path = %path, "special resource constructed");
        self.build_resource(path, wrapper)
    }

    fn build_resource<T>(&self, path: String, wrapper: Wrapper<T>) -> Resource<T> {
        Resource::from_parts(path, Arc::clone(&self.transport), wrapper)
            .with_base_url(self.base_url.clone())
            .with_raise_on_error(self.raise_on_error)
    }
}

fn envelope_wrapper() -> Wrapper<Envelope> {
    Arc::new(Envelope::new)
}

#[async_trait]
impl<M: Model, H: 'static> LifecycleHook<M> for Client<H> {
    async fn post_save(&self, instance: &M) -> Result<()> {
        let pk = instance.pk().unwrap_or_default();
        self.put(&pk, instance).await.map(|_| ())
    }

    async fn post_delete(&self, instance: &M) -> Result<()> {
        let pk = instance.pk().unwrap_or_default();
        self.delete(&pk).await.map(|_| ())
    }
}

impl<H> fmt::Debug for Client<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("index_name", &self.index_name)
            .field("type_name", &self.type_name)
            .field("base_url", &self.base_url)
            .field("auto_index", &self.auto_index)
            .field("raise_on_error", &self.raise_on_error)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder<H = Record> {
    index_name: Option<String>,
    type_name: Option<String>,
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    transport_config: Option<TransportConfig>,
    auto_index: bool,
    raise_on_error: Option<bool>,
    settings: Option<Settings>,
    hit_factory: HitFactory<H>,
}

impl Default for ClientBuilder<Record> {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder<Record> {
    pub fn new() -> Self {
        Self {
            index_name: None,
            type_name: None,
            base_url: None,
            transport: None,
            transport_config: None,
            auto_index: true,
            raise_on_error: None,
            settings: None,
            hit_factory: record_hits(),
        }
    }
}

impl<H: 'static> ClientBuilder<H> {
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn doc_type(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    /// Explicit base URL. Wins over the settings, even when empty.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use this transport instead of building an HTTP one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Configuration for the HTTP transport built when none is given.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = Some(config);
        self
    }

    pub fn auto_index(mut self, enabled: bool) -> Self {
        self.auto_index = enabled;
        self
    }

    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = Some(raise);
        self
    }

    /// Settings to use instead of reading the environment.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build search hits with `factory` instead of as [`Record`]s.
    pub fn hit_factory<H2, F>(self, factory: F) -> ClientBuilder<H2>
    where
        F: Fn(&Value) -> H2 + Send + Sync + 'static,
    {
        ClientBuilder {
            index_name: self.index_name,
            type_name: self.type_name,
            base_url: self.base_url,
            transport: self.transport,
            transport_config: self.transport_config,
            auto_index: self.auto_index,
            raise_on_error: self.raise_on_error,
            settings: self.settings,
            hit_factory: Arc::new(factory),
        }
    }

    pub fn build(self) -> Result<Client<H>> {
        let settings = self.settings.unwrap_or_else(Settings::from_env);
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.transport_config.unwrap_or_default())?),
        };

        Ok(Client {
            index_name: self.index_name.unwrap_or_default(),
            type_name: self.type_name.unwrap_or_default(),
            base_url: settings.resolve_base_url(self.base_url.as_deref()),
            transport,
            auto_index: self.auto_index,
            disable_auto_index: settings.disable_auto_index,
            raise_on_error: self.raise_on_error.unwrap_or(settings.raise_on_error),
            hit_factory: self.hit_factory,
            search: OnceLock::new(),
            count: OnceLock::new(),
            mapping: OnceLock::new(),
        })
    }
}
