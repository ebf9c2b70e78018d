use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::op_case::{MAX_OP_ENERGY, MIN_OP_ENERGY};

/// Energy update parameters (§4.1): on new coverage, energy rises by
/// `max(0, floor(Normal(gain_mean, gain_std)))` capped at `max`; otherwise
/// it decays by `max(0, floor(Normal(decay_mean, decay_std)))` floored at
/// `min`.
#[derive(Debug, Clone, Copy)]
pub struct EnergyConfig {
    pub min: i32,
    pub max: i32,
    pub gain_mean: f64,
    pub gain_std: f64,
    pub decay_mean: f64,
    pub decay_std: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            min: MIN_OP_ENERGY,
            max: MAX_OP_ENERGY,
            gain_mean: 5.0,
            gain_std: 2.0,
            decay_mean: 3.0,
            decay_std: 1.0,
        }
    }
}

/// Draw the next energy value for a scenario/op-case given whether this
/// execution gained new coverage (§4.1 step 1).
pub fn update_energy(current: i32, gained_new_coverage: bool, config: &EnergyConfig, rng: &mut impl Rng) -> i32 {
    if gained_new_coverage {
        let delta = non_negative_floor_sample(config.gain_mean, config.gain_std, rng);
        (current + delta).min(config.max)
    } else {
        let delta = non_negative_floor_sample(config.decay_mean, config.decay_std, rng);
        (current - delta).max(config.min)
    }
}

fn non_negative_floor_sample(mean: f64, std: f64, rng: &mut impl Rng) -> i32 {
    let normal = Normal::new(mean, std).expect("energy std dev must be positive");
    let sample = normal.sample(rng).floor();
    sample.max(0.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_never_exceeds_the_configured_max() {
        let config = EnergyConfig::default();
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let next = update_energy(config.max - 1, true, &config, &mut rng);
            assert!(next <= config.max);
        }
    }

    #[test]
    fn decay_never_drops_below_the_configured_min() {
        let config = EnergyConfig::default();
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let next = update_energy(config.min + 1, false, &config, &mut rng);
            assert!(next >= config.min);
        }
    }

    #[test]
    fn gain_is_monotonically_non_decreasing_from_zero() {
        let config = EnergyConfig::default();
        let mut rng = rand::thread_rng();
        let next = update_energy(0, true, &config, &mut rng);
        assert!(next >= 0);
    }
}
