use fuzzer_model::Resource;
use rand::Rng;

use crate::weighted::WeightedChoice;

/// One of the three mutation plans a resource node can be routed through
/// (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutatePlan {
    RandomPrimitive,
    StructureObject,
    None,
}

/// Weights for the `{RANDOM_PRIMITIVE, STRUCTURE_OBJECT, NONE}` coin,
/// default `{1, 0, 3}`, plus the string byte-mutation bounds (§4.3).
#[derive(Debug, Clone, Copy)]
pub struct MutateConfig {
    pub random_primitive_weight: u32,
    pub structure_object_weight: u32,
    pub none_weight: u32,
    pub string_mut_prob: f64,
    pub string_max_mut: usize,
}

impl Default for MutateConfig {
    fn default() -> Self {
        Self {
            random_primitive_weight: 1,
            structure_object_weight: 0,
            none_weight: 3,
            string_mut_prob: 0.1,
            string_max_mut: 5,
        }
    }
}

/// `mutate(Resource) -> Resource` (§4.3): mutates a resource tree in place.
pub struct MutateStrategy {
    plans: WeightedChoice<MutatePlan>,
    config: MutateConfig,
}

impl MutateStrategy {
    pub fn new(config: MutateConfig) -> Self {
        let plans = WeightedChoice::new(vec![
            (MutatePlan::RandomPrimitive, config.random_primitive_weight),
            (MutatePlan::StructureObject, config.structure_object_weight),
            (MutatePlan::None, config.none_weight),
        ]);
        Self { plans, config }
    }

    /// Mutates `resource` in place and returns the same reference.
    pub fn mutate<'a>(&self, resource: &'a mut Resource, rng: &mut impl Rng) -> &'a mut Resource {
        let plan = self.plans.choose(rng);
        self.apply(plan, resource, rng);
        resource
    }

    /// Routing rule (§4.3): random-primitive plans apply only to primitive
    /// resources, structure plans only to objects, arrays are never mutated
    /// *as arrays* but traversed element-wise, and every other combination
    /// degrades to a no-op.
    fn apply(&self, plan: MutatePlan, resource: &mut Resource, rng: &mut impl Rng) {
        match resource {
            Resource::Array(items) => {
                for item in items.iter_mut() {
                    self.mutate(item, rng);
                }
            }
            Resource::Object(_) => {
                // Structure mutation is a reserved extension point (§4.3);
                // no-op permitted regardless of which plan fired.
            }
            Resource::Integer(i) if plan == MutatePlan::RandomPrimitive => {
                *i = rng.gen_range(-1000..1000);
            }
            Resource::Float(f) if plan == MutatePlan::RandomPrimitive => {
                *f = rng.gen_range(-1000.0..1000.0);
            }
            Resource::Boolean(b) if plan == MutatePlan::RandomPrimitive => {
                *b = rng.gen_bool(0.5);
            }
            Resource::String(s) if plan == MutatePlan::RandomPrimitive => {
                mutate_string_bytes(s, self.config.string_mut_prob, self.config.string_max_mut, rng);
            }
            _ => {}
        }
    }
}

/// Byte-wise string mutation (§4.3): for each byte, with probability
/// `string_mut_prob`, replace it with a random printable alphanumeric,
/// capped at `string_max_mut` total replacements.
fn mutate_string_bytes(s: &mut String, prob: f64, max_mut: usize, rng: &mut impl Rng) {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut bytes: Vec<u8> = s.as_bytes().to_vec();
    let mut mutations = 0;
    for byte in bytes.iter_mut() {
        if mutations >= max_mut {
            break;
        }
        if rng.gen_bool(prob) {
            *byte = CHARSET[rng.gen_range(0..CHARSET.len())];
            mutations += 1;
        }
    }
    *s = String::from_utf8_lossy(&bytes).into_owned();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_weight_one_never_changes_hash() {
        let strategy = MutateStrategy::new(MutateConfig {
            random_primitive_weight: 0,
            structure_object_weight: 0,
            none_weight: 1,
            ..MutateConfig::default()
        });
        let mut rng = rand::thread_rng();
        let mut resource = Resource::String("hello".into());
        let before = resource.content_hash();
        for _ in 0..20 {
            strategy.mutate(&mut resource, &mut rng);
        }
        assert_eq!(resource.content_hash(), before);
    }

    #[test]
    fn string_mutation_never_exceeds_the_hamming_bound() {
        let strategy = MutateStrategy::new(MutateConfig {
            random_primitive_weight: 1,
            structure_object_weight: 0,
            none_weight: 0,
            ..MutateConfig::default()
        });
        let mut rng = rand::thread_rng();
        let original: String = "x".repeat(100);
        for _ in 0..1000 {
            let mut resource = Resource::String(original.clone());
            strategy.mutate(&mut resource, &mut rng);
            if let Resource::String(mutated) = &resource {
                let distance = original
                    .bytes()
                    .zip(mutated.bytes())
                    .filter(|(a, b)| a != b)
                    .count();
                assert!(distance <= 5, "distance {distance} exceeded bound");
            }
        }
    }

    #[test]
    fn arrays_are_traversed_element_wise_not_replaced() {
        let strategy = MutateStrategy::new(MutateConfig {
            random_primitive_weight: 1,
            structure_object_weight: 0,
            none_weight: 0,
            ..MutateConfig::default()
        });
        let mut rng = rand::thread_rng();
        let mut resource = Resource::Array(vec![Resource::Integer(1), Resource::Integer(2)]);
        strategy.mutate(&mut resource, &mut rng);
        match resource {
            Resource::Array(items) => assert_eq!(items.len(), 2),
            other => panic!("array mutation must not change shape, got {other:?}"),
        }
    }

    #[test]
    fn objects_are_never_mutated_since_structure_mutation_is_a_noop() {
        let strategy = MutateStrategy::new(MutateConfig {
            random_primitive_weight: 1,
            structure_object_weight: 1,
            none_weight: 0,
            ..MutateConfig::default()
        });
        let mut rng = rand::thread_rng();
        let mut map = std::collections::BTreeMap::new();
        map.insert("a".to_string(), Resource::Integer(1));
        let mut resource = Resource::Object(map.clone());
        let before = resource.content_hash();
        for _ in 0..20 {
            strategy.mutate(&mut resource, &mut rng);
        }
        assert_eq!(resource.content_hash(), before);
    }
}
