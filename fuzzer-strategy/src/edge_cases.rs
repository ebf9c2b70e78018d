//! Edge-case value generators (§4.3): available to callers that want
//! boundary-heavy values, but not part of the default mutation weight table.

use rand::seq::SliceRandom;
use rand::Rng;

const INT_EDGES: [i64; 5] = [0, 1, -1, i64::MIN, i64::MAX];
const FLOAT_EDGES: [f64; 7] = [0.0, 1.0, -1.0, 1e-9, -1e-9, f64::MAX, f64::MIN];
const STRING_EDGES: [&str; 4] = ["", " ", "%20", ".*"];

pub fn edge_integer(rng: &mut impl Rng) -> i64 {
    *INT_EDGES.choose(rng).expect("non-empty")
}

pub fn edge_float(rng: &mut impl Rng) -> f64 {
    *FLOAT_EDGES.choose(rng).expect("non-empty")
}

pub fn edge_string(rng: &mut impl Rng) -> String {
    (*STRING_EDGES.choose(rng).expect("non-empty")).to_string()
}

pub fn edge_boolean(rng: &mut impl Rng) -> bool {
    rng.gen_bool(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_integer_is_always_one_of_the_boundary_set() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            assert!(INT_EDGES.contains(&edge_integer(&mut rng)));
        }
    }

    #[test]
    fn edge_string_is_always_one_of_the_boundary_set() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            assert!(STRING_EDGES.contains(&edge_string(&mut rng).as_str()));
        }
    }
}
