use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

/// A small weighted-choice table over a fixed set of variants. Mirrors the
/// "interface returning either a constant map or a parameterized function
/// map" design note (§9): callers only ever see `choose`, never branch on
/// which strategy produced a variant.
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    items: Vec<T>,
    index: WeightedIndex<u32>,
}

impl<T: Clone> WeightedChoice<T> {
    /// Build from `(item, weight)` pairs. Panics if all weights are zero or
    /// the list is empty — both are configuration errors, not runtime ones.
    pub fn new(weighted: Vec<(T, u32)>) -> Self {
        let (items, weights): (Vec<T>, Vec<u32>) = weighted.into_iter().unzip();
        let index = WeightedIndex::new(weights).expect("weighted choice requires at least one positive weight");
        Self { items, index }
    }

    pub fn choose(&self, rng: &mut impl Rng) -> T {
        self.items[self.index.sample(rng)].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weight_items_are_never_chosen() {
        let choice = WeightedChoice::new(vec![("a", 0u32), ("b", 1)]);
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            assert_eq!(choice.choose(&mut rng), "b");
        }
    }
}
