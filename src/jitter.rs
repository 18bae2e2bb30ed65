use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of the bounded random offsets applied to model outputs.
pub trait JitterSource {
    /// Draws a value uniformly from `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Jitter drawn from a [`StdRng`].
pub struct RngJitter {
    rng: StdRng,
}

impl RngJitter {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl JitterSource for RngJitter {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..=high)
    }
}

/// Always returns the offset closest to zero, which disables jitter for any
/// range that contains zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        0.0_f64.clamp(low, high)
    }
}

/// Returns a constant offset, clamped into the requested range.
#[derive(Clone, Copy, Debug)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.0.clamp(low, high)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Default, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum JitterMode {
    #[default]
    Random,
    Seeded,
    Off,
}

impl JitterMode {
    pub fn label_with_seed(&self, seed: Option<u64>) -> String {
        match (self, seed) {
            (JitterMode::Seeded, Some(seed)) => format!("seeded({})", seed),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for JitterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JitterMode::Random => "random",
            JitterMode::Seeded => "seeded",
            JitterMode::Off => "off",
        };
        write!(f, "{}", label)
    }
}

pub fn build_jitter(mode: JitterMode, seed: Option<u64>) -> Box<dyn JitterSource> {
    match mode {
        JitterMode::Random => Box::new(RngJitter::from_entropy()),
        JitterMode::Seeded => Box::new(RngJitter::seeded(seed.unwrap_or(0))),
        JitterMode::Off => Box::new(NoJitter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_jitter_is_reproducible() {
        let mut a = RngJitter::seeded(42);
        let mut b = RngJitter::seeded(42);
        let draws_a: Vec<f64> = (0..8).map(|_| a.uniform(-0.1, 0.2)).collect();
        let draws_b: Vec<f64> = (0..8).map(|_| b.uniform(-0.1, 0.2)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn seeded_jitter_stays_in_range() {
        let mut jitter = RngJitter::seeded(7);
        for _ in 0..1_000 {
            let value = jitter.uniform(-0.05, 0.05);
            assert!((-0.05..=0.05).contains(&value));
        }
    }

    #[test]
    fn no_jitter_returns_zero_offset() {
        assert_eq!(NoJitter.uniform(-0.1, 0.2), 0.0);
        assert_eq!(NoJitter.uniform(0.5, 1.0), 0.5);
    }

    #[test]
    fn fixed_jitter_clamps_into_range() {
        let mut jitter = FixedJitter(0.15);
        assert_eq!(jitter.uniform(-0.1, 0.2), 0.15);
        assert_eq!(jitter.uniform(-0.1, 0.1), 0.1);
        assert_eq!(jitter.uniform(-0.05, 0.05), 0.05);
    }

    #[test]
    fn mode_labels_include_seed() {
        assert_eq!(JitterMode::Seeded.label_with_seed(Some(9)), "seeded(9)");
        assert_eq!(JitterMode::Off.label_with_seed(Some(9)), "off");
        assert_eq!(JitterMode::Random.label_with_seed(None), "random");
    }
}
