// rubber - a thin client for document-store HTTP APIs
//
// Index/type-scoped clients compose request paths, resources issue one
// request per verb, and responses come back as typed envelopes with
// navigable hits.

// Re-export core functionality
pub use rubber_core::*;

// Re-export the transport layer
pub use rubber_http as http;
pub use rubber_http::{
    HttpTransport, MockFailure, MockTransport, RawResponse, RecordedRequest, RequestOptions,
    Transport, TransportConfig, TransportError,
};

#[cfg(feature = "log")]
pub use rubber_log as log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Body,
        Client,
        ClientBuilder,
        Envelope,
        Field,
        HitCollection,
        // Host integration
        HookRegistry,
        Indexable,
        LifecycleHook,
        Model,
        ModelSignals,
        Record,
        RequestOptions,
        Resource,
        Result,
        RubberError,
        SearchEnvelope,
        Settings,
        Transport,
    };
}
