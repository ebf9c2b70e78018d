use fuzzer_model::{Resource, SimpleProperty};
use fuzzer_pool::ResourcePool;
use rand::Rng;
use serde_json::Value;

use crate::weighted::WeightedChoice;

/// One of the three value sources a schema node can be filled from (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Random,
    Pool,
    Mutation,
}

/// Weights for the `{RANDOM, POOL, MUTATION}` coin, default `{1, 7, 2}` (§4.2).
#[derive(Debug, Clone, Copy)]
pub struct ValueStrategyConfig {
    pub random_weight: u32,
    pub pool_weight: u32,
    pub mutation_weight: u32,
}

impl Default for ValueStrategyConfig {
    fn default() -> Self {
        Self {
            random_weight: 1,
            pool_weight: 7,
            mutation_weight: 2,
        }
    }
}

/// `generate(name, schema) -> Resource` (§4.2): the schema-directed value
/// synthesizer used by the Case Manager to populate every request field.
pub struct ValueStrategy {
    sources: WeightedChoice<ValueSource>,
}

impl ValueStrategy {
    pub fn new(config: ValueStrategyConfig) -> Self {
        let sources = WeightedChoice::new(vec![
            (ValueSource::Random, config.random_weight),
            (ValueSource::Pool, config.pool_weight),
            (ValueSource::Mutation, config.mutation_weight),
        ]);
        Self { sources }
    }

    /// Produce a typed `Resource` for `name`/`schema`, drawing from the
    /// weighted source coin at every schema node it recurses into.
    pub fn generate(
        &self,
        name: &str,
        schema: &Value,
        pool: &ResourcePool,
        rng: &mut impl Rng,
    ) -> Resource {
        let ty = SimpleProperty::of_schema(schema);

        if let Some(resource) = self.try_apply_value_source(name, schema, ty, pool, rng) {
            return resource;
        }

        match ty {
            SimpleProperty::Object => self.generate_object(schema, pool, rng),
            SimpleProperty::Array => self.generate_array(name, schema, pool, rng),
            SimpleProperty::String => Resource::String(String::new()),
            SimpleProperty::Integer => Resource::Integer(0),
            SimpleProperty::Float => Resource::Float(0.0),
            SimpleProperty::Boolean => Resource::Boolean(false),
            SimpleProperty::Empty | SimpleProperty::Unknown => Resource::Empty,
        }
    }

    /// §4.2 step 1: try RANDOM / POOL / MUTATION in the order the weighted
    /// coin picked. Returns `None` ("not generated") when the chosen source
    /// can't produce a value for this node, leaving the caller to recurse
    /// structurally.
    fn try_apply_value_source(
        &self,
        name: &str,
        schema: &Value,
        ty: SimpleProperty,
        pool: &ResourcePool,
        rng: &mut impl Rng,
    ) -> Option<Resource> {
        match self.sources.choose(rng) {
            ValueSource::Random => random_primitive(ty, rng),
            ValueSource::Pool => pool_value(name, ty, pool, rng),
            // Unimplemented hook (§4.2): mutation-as-a-source is reserved
            // for the Mutate Strategy, invoked separately by the Case
            // Manager (§4.1.2); this source always falls through.
            ValueSource::Mutation => None,
        }
    }

    fn generate_object(&self, schema: &Value, pool: &ResourcePool, rng: &mut impl Rng) -> Resource {
        let mut map = std::collections::BTreeMap::new();
        if let Some(props) = schema.get("properties").and_then(Value::as_object) {
            for (prop_name, prop_schema) in props {
                map.insert(prop_name.clone(), self.generate(prop_name, prop_schema, pool, rng));
            }
        }
        Resource::Object(map)
    }

    /// Arrays are not themselves a value-source target (§4.2): a singleton
    /// array is built by recursing into `items` under the *same* name.
    fn generate_array(&self, name: &str, schema: &Value, pool: &ResourcePool, rng: &mut impl Rng) -> Resource {
        let items_schema = schema.get("items").cloned().unwrap_or(Value::Null);
        Resource::Array(vec![self.generate(name, &items_schema, pool, rng)])
    }
}

/// RANDOM source: only defined for primitive schemas (§4.2).
fn random_primitive(ty: SimpleProperty, rng: &mut impl Rng) -> Option<Resource> {
    match ty {
        SimpleProperty::String => Some(Resource::String(random_alnum_string(rng, 8))),
        SimpleProperty::Integer => Some(Resource::Integer(rng.gen_range(-1000..1000))),
        SimpleProperty::Float => Some(Resource::Float(rng.gen_range(-1000.0..1000.0))),
        SimpleProperty::Boolean => Some(Resource::Boolean(rng.gen_bool(0.5))),
        _ => None,
    }
}

/// POOL source (§4.2): `byName` first, falling back to `byType`; a random
/// element of whichever list is non-empty is chosen.
fn pool_value(name: &str, ty: SimpleProperty, pool: &ResourcePool, rng: &mut impl Rng) -> Option<Resource> {
    let by_name = pool.by_name(name);
    if !by_name.is_empty() {
        return by_name.choose_one(rng);
    }
    let by_type = pool.by_type(ty);
    if !by_type.is_empty() {
        return by_type.choose_one(rng);
    }
    None
}

trait ChooseOne {
    fn choose_one(self, rng: &mut impl Rng) -> Option<Resource>;
}

impl ChooseOne for Vec<Resource> {
    fn choose_one(self, rng: &mut impl Rng) -> Option<Resource> {
        if self.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.len());
        self.into_iter().nth(idx)
    }
}

fn random_alnum_string(rng: &mut impl Rng, len: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pool_weight_zero_falls_through_to_structural_default() {
        let strategy = ValueStrategy::new(ValueStrategyConfig {
            random_weight: 0,
            pool_weight: 1,
            mutation_weight: 0,
        });
        let pool = ResourcePool::new();
        let mut rng = rand::thread_rng();
        let resource = strategy.generate("id", &json!({"type": "string"}), &pool, &mut rng);
        assert_eq!(resource, Resource::String(String::new()));
    }

    #[test]
    fn pool_hit_by_name_is_used_when_present() {
        let strategy = ValueStrategy::new(ValueStrategyConfig {
            random_weight: 0,
            pool_weight: 1,
            mutation_weight: 0,
        });
        let pool = ResourcePool::new();
        pool.insert("id", Resource::String("seeded".into()));
        let mut rng = rand::thread_rng();
        let resource = strategy.generate("id", &json!({"type": "string"}), &pool, &mut rng);
        assert_eq!(resource, Resource::String("seeded".into()));
    }

    #[test]
    fn object_recursion_builds_one_entry_per_declared_property() {
        let strategy = ValueStrategy::new(ValueStrategyConfig {
            random_weight: 0,
            pool_weight: 0,
            mutation_weight: 1,
        });
        let pool = ResourcePool::new();
        let mut rng = rand::thread_rng();
        let schema = json!({"type": "object", "properties": {"a": {"type": "string"}, "b": {"type": "integer"}}});
        let resource = strategy.generate("root", &schema, &pool, &mut rng);
        match resource {
            Resource::Object(map) => {
                assert_eq!(map.get("a"), Some(&Resource::String(String::new())));
                assert_eq!(map.get("b"), Some(&Resource::Integer(0)));
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn array_recurses_into_items_under_the_same_name() {
        let strategy = ValueStrategy::new(ValueStrategyConfig {
            random_weight: 0,
            pool_weight: 0,
            mutation_weight: 1,
        });
        let pool = ResourcePool::new();
        let mut rng = rand::thread_rng();
        let schema = json!({"type": "array", "items": {"type": "integer"}});
        let resource = strategy.generate("tags", &schema, &pool, &mut rng);
        assert_eq!(resource, Resource::Array(vec![Resource::Integer(0)]));
    }
}
