//! Random sources for optional question triggers

/// Decides whether an optional question fires
pub trait TriggerRoll {
    /// Returns true with probability `probability` (clamped to `0.0..=1.0`)
    fn chance(&mut self, probability: f64) -> bool;
}

/// Seeded random source
///
/// Deterministic for a given seed, which keeps quiz runs reproducible.
#[derive(Debug, Clone)]
pub struct SeededRoll {
    rng: fastrand::Rng,
}

impl SeededRoll {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Uniform value in `[0, 1)`
    pub fn next_unit(&mut self) -> f64 {
        self.rng.f64()
    }
}

impl TriggerRoll for SeededRoll {
    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability.clamp(0.0, 1.0)
    }
}

/// Always returns the same outcome
#[derive(Debug, Clone, Copy)]
pub struct FixedRoll(pub bool);

impl TriggerRoll for FixedRoll {
    fn chance(&mut self, _probability: f64) -> bool {
        self.0
    }
}
