use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::property::SimpleProperty;

/// A typed value flowing through the fuzzer: request parameters, request
/// bodies, and values extracted from response bodies are all `Resource`s.
///
/// Arrays and objects recursively contain `Resource`s. `Clone` is the deep
/// copy operator required by §3 (owned data, no interior sharing).
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Object(BTreeMap<String, Resource>),
    Array(Vec<Resource>),
    Empty,
    /// A value whose schema/shape didn't classify into any of the above
    /// (e.g. a schema-less `additionalProperties: true` fragment). Carries
    /// the raw JSON so no information is lost.
    Unknown(Value),
}

impl Resource {
    /// The `SimpleProperty` tag for this resource.
    pub fn property_type(&self) -> SimpleProperty {
        match self {
            Resource::String(_) => SimpleProperty::String,
            Resource::Integer(_) => SimpleProperty::Integer,
            Resource::Float(_) => SimpleProperty::Float,
            Resource::Boolean(_) => SimpleProperty::Boolean,
            Resource::Object(_) => SimpleProperty::Object,
            Resource::Array(_) => SimpleProperty::Array,
            Resource::Empty => SimpleProperty::Empty,
            Resource::Unknown(_) => SimpleProperty::Unknown,
        }
    }

    /// JSON projection of this resource.
    pub fn to_json(&self) -> Value {
        match self {
            Resource::String(s) => Value::String(s.clone()),
            Resource::Integer(i) => Value::Number((*i).into()),
            Resource::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Resource::Boolean(b) => Value::Bool(*b),
            Resource::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                Value::Object(out)
            }
            Resource::Array(items) => Value::Array(items.iter().map(Resource::to_json).collect()),
            Resource::Empty => Value::Null,
            Resource::Unknown(v) => v.clone(),
        }
    }

    /// Reconstruct a `Resource` from a JSON value (inverse of `to_json` for
    /// every non-`Unknown` variant; genuinely schema-less values round-trip
    /// through `Unknown` only when they can't be classified, which cannot
    /// happen here since every JSON value classifies into one of the other
    /// variants).
    pub fn from_value(value: &Value) -> Resource {
        match value {
            Value::Null => Resource::Empty,
            Value::Bool(b) => Resource::Boolean(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Resource::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Resource::Integer(u as i64)
                } else {
                    Resource::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => Resource::String(s.clone()),
            Value::Array(items) => Resource::Array(items.iter().map(Resource::from_value).collect()),
            Value::Object(map) => Resource::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Resource::from_value(v)))
                    .collect(),
            ),
        }
    }

    /// 64-bit content hash. Depends only on the JSON projection: equal
    /// projections hash equal (§8).
    pub fn content_hash(&self) -> u64 {
        let canonical = canonical_json_string(&self.to_json());
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        hasher.finish()
    }

    /// Raw string accessor, used to build the string projection of request
    /// parameters (§3: scalar maps are a string projection of the resource
    /// views).
    pub fn raw_string(&self) -> String {
        match self {
            Resource::String(s) => s.clone(),
            Resource::Integer(i) => i.to_string(),
            Resource::Float(f) => f.to_string(),
            Resource::Boolean(b) => b.to_string(),
            Resource::Empty => String::new(),
            Resource::Array(items) => items
                .iter()
                .map(Resource::raw_string)
                .collect::<Vec<_>>()
                .join(","),
            Resource::Object(_) | Resource::Unknown(_) => {
                serde_json::to_string(&self.to_json()).unwrap_or_default()
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Resource::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Resource::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Resource::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Resource::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Serialize with sorted object keys so the hash only depends on content,
/// never on insertion order. `BTreeMap` already sorts `Object`'s keys, and
/// `serde_json::to_string` on a `Value::Object` built from it preserves
/// that order, so this is just an explicit name for what `to_json` already
/// guarantees — kept separate in case `Value`'s own map type changes.
fn canonical_json_string(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_json_for_every_non_unknown_variant() {
        let cases = vec![
            Resource::String("hi".into()),
            Resource::Integer(42),
            Resource::Boolean(true),
            Resource::Empty,
            Resource::Array(vec![Resource::Integer(1), Resource::Integer(2)]),
            Resource::Object(BTreeMap::from([
                ("a".to_string(), Resource::String("x".into())),
                ("b".to_string(), Resource::Integer(7)),
            ])),
        ];
        for r in cases {
            let json = r.to_json();
            let back = Resource::from_value(&json);
            assert_eq!(r, back, "round trip failed for {r:?}");
        }
    }

    #[test]
    fn hash_depends_only_on_json_projection() {
        let a = Resource::Object(BTreeMap::from([
            ("x".to_string(), Resource::Integer(1)),
            ("y".to_string(), Resource::Integer(2)),
        ]));
        let mut b_map = BTreeMap::new();
        b_map.insert("y".to_string(), Resource::Integer(2));
        b_map.insert("x".to_string(), Resource::Integer(1));
        let b = Resource::Object(b_map);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn array_raw_string_is_comma_joined_not_json() {
        let r = Resource::Array(vec![
            Resource::String("a".into()),
            Resource::String("b".into()),
        ]);
        assert_eq!(r.raw_string(), "a,b");
    }

    #[test]
    fn of_value_round_trip_via_from_value() {
        let v = json!({"id": "x", "count": 3, "ok": true, "tags": ["a","b"]});
        let r = Resource::from_value(&v);
        assert_eq!(r.to_json(), v);
    }
}
