//! Typed views over raw responses.
//!
//! The call site picks the wrapper: [`Envelope`] for document, count and
//! mapping requests, [`SearchEnvelope`] for searches. Nothing here inspects
//! the response to decide its own shape.

use rubber_http::{Bytes, HeaderMap, RawResponse, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::{Deref, Index};
use std::sync::Arc;

use crate::record::Record;

/// Builds one hit from its JSON object.
pub type HitFactory<H> = Arc<dyn Fn(&Value) -> H + Send + Sync>;

/// Factory producing [`Record`] hits. Non-object hits become empty records.
pub fn record_hits() -> HitFactory<Record> {
    Arc::new(|value: &Value| Record::from_value(value).unwrap_or_default())
}

/// A response with its status and metadata forwarded as-is.
#[derive(Debug, Clone)]
pub struct Envelope {
    raw: RawResponse,
}

impl Envelope {
    pub fn new(raw: RawResponse) -> Self {
        Self { raw }
    }

    pub fn status(&self) -> StatusCode {
        self.raw.status()
    }

    pub fn is_success(&self) -> bool {
        self.raw.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.raw.headers()
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.raw.header(name)
    }

    pub fn body(&self) -> &Bytes {
        self.raw.body()
    }

    pub fn text(&self) -> String {
        self.raw.text()
    }

    /// The parsed body, `None` when it was not JSON.
    pub fn json(&self) -> Option<&Value> {
        self.raw.json()
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        self.raw.json_as()
    }

    /// The wrapped response.
    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    pub fn into_raw(self) -> RawResponse {
        self.raw
    }
}

impl From<RawResponse> for Envelope {
    fn from(raw: RawResponse) -> Self {
        Self::new(raw)
    }
}

/// Ordered hits of a search response.
#[derive(Debug, Clone, PartialEq)]
pub struct HitCollection<H> {
    total: Option<u64>,
    max_score: Option<f64>,
    hits: Vec<H>,
}

impl<H> Default for HitCollection<H> {
    fn default() -> Self {
        Self {
            total: None,
            max_score: None,
            hits: Vec::new(),
        }
    }
}

impl<H> HitCollection<H> {
    /// Build from the JSON object found under `hits`. Missing or
    /// non-object input gives an empty collection.
    pub fn from_json(value: Option<&Value>, hit: impl Fn(&Value) -> H) -> Self {
        let Some(obj) = value.and_then(Value::as_object) else {
            return Self::default();
        };

        let total = obj.get("total").and_then(|t| {
            t.as_u64()
                .or_else(|| t.get("value").and_then(Value::as_u64))
        });
        let max_score = obj.get("max_score").and_then(Value::as_f64);
        let hits = obj
            .get("hits")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(&hit).collect())
            .unwrap_or_default();

        Self {
            total,
            max_score,
            hits,
        }
    }

    /// Total matches reported by the server, which may exceed `len()`.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn max_score(&self) -> Option<f64> {
        self.max_score
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&H> {
        self.hits.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, H> {
        self.hits.iter()
    }

    pub fn hits(&self) -> &[H] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<H> {
        self.hits
    }
}

impl<H> Index<usize> for HitCollection<H> {
    type Output = H;

    fn index(&self, index: usize) -> &H {
        &self.hits[index]
    }
}

impl<'a, H> IntoIterator for &'a HitCollection<H> {
    type Item = &'a H;
    type IntoIter = std::slice::Iter<'a, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

impl<H> IntoIterator for HitCollection<H> {
    type Item = H;
    type IntoIter = std::vec::IntoIter<H>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

/// Shard statistics of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shards {
    pub total: Option<u64>,
    pub successful: Option<u64>,
    pub failed: Option<u64>,
}

impl Shards {
    fn from_json(value: Option<&Value>) -> Self {
        let field = |name: &str| value.and_then(|v| v.get(name)).and_then(Value::as_u64);
        Self {
            total: field("total"),
            successful: field("successful"),
            failed: field("failed"),
        }
    }
}

/// A search response: the [`Envelope`] surface plus the parsed hits.
///
/// Everything is parsed once, at construction. A body that is not JSON
/// yields empty results rather than an error.
#[derive(Debug, Clone)]
pub struct SearchEnvelope<H = Record> {
    envelope: Envelope,
    results: HitCollection<H>,
    took: Option<u64>,
    timed_out: Option<bool>,
    shards: Shards,
}

impl<H> SearchEnvelope<H> {
    /// Wrap a response, building each hit with `hit`.
    pub fn new(raw: RawResponse, hit: impl Fn(&Value) -> H) -> Self {
        let json = raw.json();
        let results = HitCollection::from_json(json.and_then(|j| j.get("hits")), hit);
        let took = json.and_then(|j| j.get("took")).and_then(Value::as_u64);
        let timed_out = json.and_then(|j| j.get("timed_out")).and_then(Value::as_bool);
        let shards = Shards::from_json(json.and_then(|j| j.get("_shards")));

        Self {
            envelope: Envelope::new(raw),
            results,
            took,
            timed_out,
            shards,
        }
    }

    pub fn results(&self) -> &HitCollection<H> {
        &self.results
    }

    /// Milliseconds the search took on the server.
    pub fn took(&self) -> Option<u64> {
        self.took
    }

    pub fn timed_out(&self) -> Option<bool> {
        self.timed_out
    }

    pub fn shards(&self) -> Shards {
        self.shards
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn into_parts(self) -> (Envelope, HitCollection<H>) {
        (self.envelope, self.results)
    }
}

impl From<RawResponse> for SearchEnvelope<Record> {
    fn from(raw: RawResponse) -> Self {
        Self::new(raw, |v| Record::from_value(v).unwrap_or_default())
    }
}

impl<H> Deref for SearchEnvelope<H> {
    type Target = Envelope;

    fn deref(&self) -> &Envelope {
        &self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search(body: &str) -> SearchEnvelope {
        SearchEnvelope::from(RawResponse::ok(body.to_string()))
    }

    #[test]
    fn test_two_hits_in_order() {
        let response = search(
            r#"{"hits":{"total":2,"max_score":1.0,"hits":[{"_id":"1"},{"_id":"2"}]}}"#,
        );
        let results = response.results();

        assert_eq!(results.len(), 2);
        assert_eq!(results.total(), Some(2));
        assert_eq!(results.max_score(), Some(1.0));
        assert_eq!(results[0].get("id").unwrap(), "1");
        assert_eq!(results[1].get("id").unwrap(), "2");

        let ids: Vec<&str> = results
            .iter()
            .map(|hit| hit.get("id").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_malformed_body_gives_empty_results() {
        let response = search(";;;");
        assert_eq!(response.results().total(), None);
        assert_eq!(response.results().len(), 0);
        assert!(response.results().is_empty());
        assert!(response.json().is_none());
        assert_eq!(response.text(), ";;;");
    }

    #[test]
    fn test_missing_hits_key() {
        let response = search(r#"{"took":3}"#);
        assert!(response.results().is_empty());
        assert_eq!(response.took(), Some(3));
    }

    #[test]
    fn test_total_object_form() {
        let response = search(r#"{"hits":{"total":{"value":42,"relation":"eq"},"hits":[]}}"#);
        assert_eq!(response.results().total(), Some(42));
        assert!(response.results().is_empty());
    }

    #[test]
    fn test_search_metadata() {
        let response = search(
            r#"{"took":5,"timed_out":false,"_shards":{"total":5,"successful":4,"failed":1},"hits":{"hits":[]}}"#,
        );
        assert_eq!(response.took(), Some(5));
        assert_eq!(response.timed_out(), Some(false));
        assert_eq!(
            response.shards(),
            Shards {
                total: Some(5),
                successful: Some(4),
                failed: Some(1)
            }
        );
    }

    #[test]
    fn test_custom_hit_type() {
        let raw = RawResponse::ok(r#"{"hits":{"hits":[{"_id":"a"},{"_id":"b"}]}}"#);
        let response = SearchEnvelope::new(raw, |v| v["_id"].as_str().unwrap_or("").to_string());
        let ids: Vec<String> = response.into_parts().1.into_iter().collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_envelope_forwards_raw_surface() {
        let mut headers = HeaderMap::new();
        headers.insert("x-elastic-product", "Elasticsearch".parse().unwrap());
        let envelope = Envelope::new(RawResponse::new(
            StatusCode::NOT_FOUND,
            headers,
            r#"{"found":false}"#,
        ));

        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);
        assert!(!envelope.is_success());
        assert_eq!(envelope.header("x-elastic-product"), Some("Elasticsearch"));
        assert_eq!(envelope.json(), Some(&json!({"found": false})));
        assert_eq!(envelope.body().as_ref(), br#"{"found":false}"#);
    }

    #[test]
    fn test_search_derefs_to_envelope() {
        let response = search(r#"{"hits":{"hits":[]}}"#);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.envelope().is_success());
    }

    #[test]
    fn test_record_hits_factory() {
        let factory = record_hits();
        assert_eq!(factory(&json!({"_id": "9"})).get("id").unwrap(), "9");
        assert!(factory(&json!("scalar")).is_empty());
    }
}
