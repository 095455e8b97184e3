//! Request body serialization.
//!
//! A [`Body`] is what callers hand to a verb. It is encoded by [`serialize`]
//! following a fixed priority order:
//!
//! 1. a JSON mapping is encoded canonically;
//! 2. a value with its own indexed-JSON form is used verbatim;
//! 3. a host record is encoded from its field mapping, with dates and
//!    times in ISO-8601;
//! 4. a pre-serialized string passes through unchanged.
//!
//! An absent body encodes as `{}`: write verbs always carry a body.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{Result, RubberError};

/// Encoding of an absent body.
pub const EMPTY_BODY: &str = "{}";

/// Serialization capabilities a domain value may offer.
///
/// Every method defaults to `None`; implement the ones that apply. They are
/// consulted in declaration order and the first `Some` wins.
///
/// ```
/// use rubber_core::{Body, Indexable, serialize};
///
/// struct Tag(&'static str);
///
/// impl Indexable for Tag {
///     fn to_indexed_json(&self) -> Option<String> {
///         Some(format!(r#"{{"tag":"{}"}}"#, self.0))
///     }
/// }
///
/// let tag = Tag("rust");
/// assert_eq!(serialize(&Body::from(&tag)).unwrap(), r#"{"tag":"rust"}"#);
/// ```
pub trait Indexable {
    /// The value viewed as a plain JSON mapping.
    fn as_mapping(&self) -> Option<Map<String, Value>> {
        None
    }

    /// A ready-made JSON document, used without re-encoding.
    fn to_indexed_json(&self) -> Option<String> {
        None
    }

    /// Field mapping of a host-framework record.
    fn record_fields(&self) -> Option<BTreeMap<String, FieldValue>> {
        None
    }

    /// Name reported when no capability applies.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Indexable + ?Sized> Indexable for &T {
    fn as_mapping(&self) -> Option<Map<String, Value>> {
        (**self).as_mapping()
    }

    fn to_indexed_json(&self) -> Option<String> {
        (**self).to_indexed_json()
    }

    fn record_fields(&self) -> Option<BTreeMap<String, FieldValue>> {
        (**self).record_fields()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl Indexable for Map<String, Value> {
    fn as_mapping(&self) -> Option<Map<String, Value>> {
        Some(self.clone())
    }
}

/// A field value of a host record.
///
/// Dates and times keep their type so they can be encoded the way the host
/// framework's JSON encoder would.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time without zone
    DateTime(NaiveDateTime),
    /// Date and time with offset
    DateTimeTz(DateTime<FixedOffset>),
    /// Anything already in JSON form
    Json(Value),
}

impl FieldValue {
    /// Encode as a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Time(t) => Value::String(format_time(t)),
            FieldValue::DateTime(dt) => Value::String(format_naive_datetime(dt)),
            FieldValue::DateTimeTz(dt) => Value::String(format_datetime_tz(dt)),
            FieldValue::Json(v) => v.clone(),
        }
    }
}

// Leap seconds carry nanos past 1_000_000_000; `%S` already prints 60.
fn millis_suffix(nanos: u32) -> String {
    let micros = (nanos % 1_000_000_000) / 1_000;
    if micros == 0 {
        String::new()
    } else {
        format!(".{:03}", micros / 1_000)
    }
}

fn format_time(t: &NaiveTime) -> String {
    format!("{}{}", t.format("%H:%M:%S"), millis_suffix(t.nanosecond()))
}

fn format_naive_datetime(dt: &NaiveDateTime) -> String {
    format!(
        "{}{}",
        dt.format("%Y-%m-%dT%H:%M:%S"),
        millis_suffix(dt.nanosecond())
    )
}

fn format_datetime_tz(dt: &DateTime<FixedOffset>) -> String {
    let offset = if dt.offset().local_minus_utc() == 0 {
        "Z".to_string()
    } else {
        dt.format("%:z").to_string()
    };
    format!("{}{}", format_naive_datetime(&dt.naive_local()), offset)
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value.into())
                }
            }
        )*
    };
}

field_value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f64 => Float,
    String => Text,
    &str => Text,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeTz,
    Value => Json,
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTimeTz(value.fixed_offset())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A request body.
#[derive(Clone, Default)]
pub enum Body<'a> {
    /// No body; encodes as `{}`.
    #[default]
    Empty,
    /// A JSON mapping.
    Map(Map<String, Value>),
    /// Any other JSON value.
    Json(Value),
    /// An already serialized document.
    Raw(String),
    /// A value dispatched through its [`Indexable`] capabilities.
    Object(&'a (dyn Indexable + Sync)),
}

impl<'a> Body<'a> {
    /// A pre-serialized body.
    pub fn raw(json: impl Into<String>) -> Self {
        Body::Raw(json.into())
    }

    /// A body dispatched through [`Indexable`].
    pub fn object(value: &'a (dyn Indexable + Sync)) -> Self {
        Body::Object(value)
    }

    /// Convert any serde value into a body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Body<'static>> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Whether this is the empty body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl std::fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Body::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Body::Raw(s) => f.debug_tuple("Raw").field(s).finish(),
            Body::Object(o) => f.debug_tuple("Object").field(&o.type_name()).finish(),
        }
    }
}

impl From<Value> for Body<'_> {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Body::Empty,
            Value::Object(map) => Body::Map(map),
            Value::String(raw) => Body::Raw(raw),
            other => Body::Json(other),
        }
    }
}

impl From<Map<String, Value>> for Body<'_> {
    fn from(map: Map<String, Value>) -> Self {
        Body::Map(map)
    }
}

impl From<String> for Body<'_> {
    fn from(json: String) -> Self {
        Body::Raw(json)
    }
}

impl From<()> for Body<'_> {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

impl<'a, I: Indexable + Sync> From<&'a I> for Body<'a> {
    fn from(value: &'a I) -> Self {
        Body::Object(value)
    }
}

/// Encode a body as the JSON string sent on the wire.
pub fn serialize(body: &Body<'_>) -> Result<String> {
    match body {
        Body::Empty => Ok(EMPTY_BODY.to_string()),
        Body::Map(map) => Ok(serde_json::to_string(map)?),
        Body::Json(value) => Ok(serde_json::to_string(value)?),
        Body::Raw(json) => Ok(json.clone()),
        Body::Object(value) => serialize_object(*value),
    }
}

fn serialize_object(value: &(dyn Indexable + Sync)) -> Result<String> {
    if let Some(map) = value.as_mapping() {
        return Ok(serde_json::to_string(&map)?);
    }
    if let Some(json) = value.to_indexed_json() {
        return Ok(json);
    }
    if let Some(fields) = value.record_fields() {
        return encode_record_fields(&fields);
    }
    Err(RubberError::Unserializable(value.type_name().to_string()))
}

/// Encode a host record's field mapping.
pub fn encode_record_fields(fields: &BTreeMap<String, FieldValue>) -> Result<String> {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    Ok(serde_json::to_string(&map)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    struct Custom;

    impl Indexable for Custom {
        fn to_indexed_json(&self) -> Option<String> {
            Some(r#"{"custom":true}"#.to_string())
        }
    }

    struct HostRecord;

    impl Indexable for HostRecord {
        fn record_fields(&self) -> Option<BTreeMap<String, FieldValue>> {
            let mut fields = BTreeMap::new();
            fields.insert("foo".to_string(), FieldValue::from("bar"));
            Some(fields)
        }
    }

    struct CustomRecord;

    impl Indexable for CustomRecord {
        fn to_indexed_json(&self) -> Option<String> {
            Some(r#"{"from":"custom"}"#.to_string())
        }

        fn record_fields(&self) -> Option<BTreeMap<String, FieldValue>> {
            let mut fields = BTreeMap::new();
            fields.insert("from".to_string(), FieldValue::from("record"));
            Some(fields)
        }
    }

    struct MappingAndCustom;

    impl Indexable for MappingAndCustom {
        fn as_mapping(&self) -> Option<Map<String, Value>> {
            let mut map = Map::new();
            map.insert("from".to_string(), json!("mapping"));
            Some(map)
        }

        fn to_indexed_json(&self) -> Option<String> {
            Some(r#"{"from":"custom"}"#.to_string())
        }
    }

    struct Opaque;

    impl Indexable for Opaque {}

    #[test]
    fn test_mapping_round_trip() {
        let value = json!({"foo": "bar", "nested": {"n": [1, 2, 3]}});
        let encoded = serialize(&Body::from(value.clone())).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        assert_eq!(serialize(&Body::Empty).unwrap(), "{}");
        assert_eq!(serialize(&Body::from(Value::Null)).unwrap(), "{}");
        assert_eq!(serialize(&Body::from(())).unwrap(), "{}");
    }

    #[test]
    fn test_json_string_value_passes_through() {
        let pre = r#"{"a":1}"#.to_string();
        assert_eq!(serialize(&Body::from(json!(pre))).unwrap(), pre);
        assert_eq!(serialize(&Body::json(&pre).unwrap()).unwrap(), pre);
        assert_eq!(serialize(&Body::from(json!(3))).unwrap(), "3");
    }

    #[test]
    fn test_string_passes_through() {
        let pre = r#"{"foo": "bar"}"#.to_string();
        assert_eq!(serialize(&Body::from(pre.clone())).unwrap(), pre);
        assert_eq!(serialize(&Body::raw("not even json")).unwrap(), "not even json");
    }

    #[test]
    fn test_custom_capability_used_verbatim() {
        assert_eq!(serialize(&Body::from(&Custom)).unwrap(), r#"{"custom":true}"#);
    }

    #[test]
    fn test_host_record_fields() {
        assert_eq!(serialize(&Body::from(&HostRecord)).unwrap(), r#"{"foo":"bar"}"#);
    }

    #[test]
    fn test_custom_wins_over_record_fields() {
        assert_eq!(
            serialize(&Body::from(&CustomRecord)).unwrap(),
            r#"{"from":"custom"}"#
        );
    }

    #[test]
    fn test_mapping_wins_over_custom() {
        assert_eq!(
            serialize(&Body::from(&MappingAndCustom)).unwrap(),
            r#"{"from":"mapping"}"#
        );
    }

    #[test]
    fn test_no_capability_is_an_error() {
        let err = serialize(&Body::from(&Opaque)).unwrap_err();
        assert!(matches!(err, RubberError::Unserializable(ref name) if name.ends_with("Opaque")));
    }

    #[test]
    fn test_non_object_json() {
        assert_eq!(serialize(&Body::from(json!([1, 2]))).unwrap(), "[1,2]");
        assert_eq!(serialize(&Body::from(json!(true))).unwrap(), "true");
    }

    #[test]
    fn test_body_from_serialize() {
        #[derive(Serialize)]
        struct Query {
            size: u32,
        }

        let body = Body::json(&Query { size: 10 }).unwrap();
        assert!(matches!(body, Body::Map(_)));
        assert_eq!(serialize(&body).unwrap(), r#"{"size":10}"#);
    }

    #[test]
    fn test_map_is_indexable() {
        let mut map = Map::new();
        map.insert("a".to_string(), json!(1));
        assert_eq!(serialize(&Body::from(&map)).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_datetime_encoding() {
        let date = NaiveDate::from_ymd_opt(2012, 8, 2).unwrap();
        let plain = date.and_hms_opt(8, 30, 11).unwrap();
        let precise = date.and_hms_micro_opt(8, 30, 11, 562_123).unwrap();

        assert_eq!(FieldValue::from(date).to_json(), json!("2012-08-02"));
        assert_eq!(FieldValue::from(plain).to_json(), json!("2012-08-02T08:30:11"));
        assert_eq!(
            FieldValue::from(precise).to_json(),
            json!("2012-08-02T08:30:11.562")
        );

        let utc = Utc.with_ymd_and_hms(2012, 8, 2, 9, 14, 38).unwrap();
        assert_eq!(FieldValue::from(utc).to_json(), json!("2012-08-02T09:14:38Z"));

        let paris = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2012, 8, 2, 11, 14, 38)
            .unwrap();
        assert_eq!(
            FieldValue::from(paris).to_json(),
            json!("2012-08-02T11:14:38+02:00")
        );

        let time = NaiveTime::from_hms_milli_opt(23, 5, 1, 250).unwrap();
        assert_eq!(FieldValue::from(time).to_json(), json!("23:05:01.250"));

        let leap = NaiveTime::from_hms_milli_opt(23, 59, 59, 1_500).unwrap();
        assert_eq!(FieldValue::from(leap).to_json(), json!("23:59:60.500"));
        let leap_whole = date.and_hms_milli_opt(23, 59, 59, 1_000).unwrap();
        assert_eq!(
            FieldValue::from(leap_whole).to_json(),
            json!("2012-08-02T23:59:60")
        );
    }

    #[test]
    fn test_optional_fields() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3i64)), FieldValue::Int(3));
    }
}
