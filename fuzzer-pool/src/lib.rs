//! The resource pool (spec §3/§4): a dual-indexed store of values fed by an
//! optional seed dictionary and by successful responses, consumed by the
//! value strategy.

use dashmap::DashMap;
use fuzzer_model::{Resource, SimpleProperty};
use serde::Deserialize;
use serde_json::Value;

/// Dual-indexed pool: every insertion updates `by_name` and `by_type`
/// together so the two indices never drift apart (§3, §8 invariant).
///
/// `DashMap` gives a `Clone`-able, interior-mutable map without a manual
/// `Arc<Mutex<_>>` wrapper, even though this pool is only ever mutated from
/// the single loop thread — it's the map type this codebase reaches for
/// elsewhere too.
#[derive(Debug, Default)]
pub struct ResourcePool {
    by_name: DashMap<String, Vec<Resource>>,
    by_type: DashMap<SimpleProperty, Vec<Resource>>,
}

/// One entry of the seed dictionary file (§6): `{"name": ..., "value": ...}`.
#[derive(Debug, Deserialize)]
pub struct SeedEntry {
    pub name: String,
    pub value: Value,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only mutator: insert `resource` under `name`, updating both
    /// indices atomically (no intermediate state where one index knows
    /// about the resource and the other doesn't).
    pub fn insert(&self, name: impl Into<String>, resource: Resource) {
        let ty = resource.property_type();
        self.by_name.entry(name.into()).or_default().push(resource.clone());
        self.by_type.entry(ty).or_default().push(resource);
    }

    /// Recursively insert a JSON value extracted from a response body
    /// (§4.4): every nested object key becomes a pool name, every scalar
    /// becomes a typed `Resource`; the root value is also inserted whole
    /// under `root_name`.
    pub fn insert_from_json(&self, root_name: &str, value: &Value) {
        self.insert(root_name.to_string(), Resource::from_value(value));
        self.insert_nested(value);
    }

    fn insert_nested(&self, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    self.insert(key.clone(), Resource::from_value(v));
                    self.insert_nested(v);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.insert_nested(item);
                }
            }
            _ => {}
        }
    }

    /// Seed the pool from a `--fuzz-value-dict-file` document (§6): each
    /// entry is inserted by name and by its derived type.
    pub fn seed(&self, entries: Vec<SeedEntry>) {
        for entry in entries {
            self.insert(entry.name, Resource::from_value(&entry.value));
        }
    }

    pub fn by_name(&self, name: &str) -> Vec<Resource> {
        self.by_name.get(name).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn by_type(&self, ty: SimpleProperty) -> Vec<Resource> {
        self.by_type.get(&ty).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_name.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_keeps_both_indices_in_sync() {
        let pool = ResourcePool::new();
        pool.insert("id", Resource::String("x".into()));
        assert_eq!(pool.by_name("id"), vec![Resource::String("x".into())]);
        assert_eq!(pool.by_type(SimpleProperty::String), vec![Resource::String("x".into())]);
    }

    #[test]
    fn insert_from_json_recurses_into_nested_keys() {
        let pool = ResourcePool::new();
        pool.insert_from_json("order", &json!({"id": "o1", "item": {"sku": "s1"}}));

        assert_eq!(pool.by_name("id"), vec![Resource::String("o1".into())]);
        assert_eq!(pool.by_name("sku"), vec![Resource::String("s1".into())]);
        assert_eq!(pool.by_name("order").len(), 1);
    }

    #[test]
    fn seed_dictionary_inserts_by_name_and_type() {
        let pool = ResourcePool::new();
        pool.seed(vec![SeedEntry {
            name: "count".into(),
            value: json!(3),
        }]);
        assert_eq!(pool.by_name("count"), vec![Resource::Integer(3)]);
        assert_eq!(pool.by_type(SimpleProperty::Integer), vec![Resource::Integer(3)]);
    }
}
