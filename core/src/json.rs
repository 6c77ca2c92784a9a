//! Lenient, all-or-nothing decoding from untyped JSON objects.
//!
//! # Design
//! Server payloads are decoded field by field instead of through
//! `#[derive(Deserialize)]`: a record whose required field is missing or has
//! the wrong JSON type yields `None` and is skipped, while optional fields
//! simply come back empty. Arrays are more forgiving than single objects:
//! `decode_vec` drops malformed elements and keeps the rest.

use serde_json::{Map, Value};

/// A keyed JSON object as produced by `serde_json`.
pub type JsonObject = Map<String, Value>;

/// A value that can be constructed from a keyed JSON object.
pub trait JsonMappable: Sized {
    /// Build an instance from `json`, or `None` if any required field is
    /// missing or mistyped.
    fn from_json(json: &JsonObject) -> Option<Self>;

    /// Build an instance from an untyped value. Anything other than an
    /// object yields `None`.
    fn from_value(value: Option<&Value>) -> Option<Self> {
        value.and_then(Value::as_object).and_then(Self::from_json)
    }
}

/// Decode an array of mappable records.
///
/// Returns `None` unless `value` is a non-empty array whose elements are all
/// objects. Objects that fail to decode are dropped from the output.
pub fn decode_vec<T: JsonMappable>(value: Option<&Value>) -> Option<Vec<T>> {
    let items = value.and_then(Value::as_array)?;
    if items.is_empty() {
        return None;
    }

    let objects: Vec<&JsonObject> = items.iter().map(Value::as_object).collect::<Option<_>>()?;
    let decoded: Vec<T> = objects
        .into_iter()
        .enumerate()
        .filter_map(|(index, object)| {
            let item = T::from_json(object);
            if item.is_none() {
                tracing::trace!(index, "dropping malformed element");
            }
            item
        })
        .collect();

    Some(decoded)
}

pub(crate) fn string(json: &JsonObject, key: &str) -> Option<String> {
    json.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Integer fields accept floats only when they have no fractional part.
pub(crate) fn int(json: &JsonObject, key: &str) -> Option<i64> {
    let value = json.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Accepts integers as well as floats.
pub(crate) fn double(json: &JsonObject, key: &str) -> Option<f64> {
    json.get(key).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Named {
        name: String,
        count: i64,
    }

    impl JsonMappable for Named {
        fn from_json(json: &JsonObject) -> Option<Self> {
            Some(Named {
                name: string(json, "name")?,
                count: int(json, "count")?,
            })
        }
    }

    #[test]
    fn from_value_requires_an_object() {
        assert!(Named::from_value(Some(&json!([1, 2]))).is_none());
        assert!(Named::from_value(Some(&json!("name"))).is_none());
        assert!(Named::from_value(None).is_none());
        let named = Named::from_value(Some(&json!({"name": "a", "count": 1}))).unwrap();
        assert_eq!(named, Named { name: "a".into(), count: 1 });
    }

    #[test]
    fn mistyped_required_field_fails_the_record() {
        assert!(Named::from_value(Some(&json!({"name": "a", "count": "1"}))).is_none());
        assert!(Named::from_value(Some(&json!({"name": "a", "count": 1.5}))).is_none());
        assert!(Named::from_value(Some(&json!({"count": 1}))).is_none());
    }

    #[test]
    fn integral_floats_decode_as_integers() {
        let named = Named::from_value(Some(&json!({"name": "a", "count": 120.0}))).unwrap();
        assert_eq!(named.count, 120);
        assert!(Named::from_value(Some(&json!({"name": "a", "count": 1e300}))).is_none());
    }

    #[test]
    fn decode_vec_drops_malformed_elements() {
        let value = json!([
            {"name": "a", "count": 1},
            {"name": "b"},
            {"name": "c", "count": 3}
        ]);
        let items: Vec<Named> = decode_vec(Some(&value)).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "c");
    }

    #[test]
    fn decode_vec_rejects_empty_arrays() {
        assert!(decode_vec::<Named>(Some(&json!([]))).is_none());
    }

    #[test]
    fn decode_vec_rejects_non_object_elements() {
        let value = json!([{"name": "a", "count": 1}, 7]);
        assert!(decode_vec::<Named>(Some(&value)).is_none());
    }

    #[test]
    fn decode_vec_keeps_an_all_dropped_array_as_empty() {
        let value = json!([{"name": "a"}]);
        let items: Vec<Named> = decode_vec(Some(&value)).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn double_accepts_integers() {
        let object = json!({"lat": 37, "lng": -122.5});
        let object = object.as_object().unwrap();
        assert_eq!(double(object, "lat"), Some(37.0));
        assert_eq!(double(object, "lng"), Some(-122.5));
    }
}
