//! Random Draw Service
//!
//! A single seeded stream shared by every system. Every rule that needs
//! randomness takes `&mut SimRng` explicitly, so a fixed seed replays a run.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Restart the stream from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.0 = SmallRng::seed_from_u64(seed);
    }

    /// Uniform real in [0, 1).
    pub fn unit(&mut self) -> f64 {
        self.0.gen()
    }

    /// Uniform real in [low, high]. Returns `low` for an empty range.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.0.gen_range(low..=high)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform integer in [low, high].
    pub fn between(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.0.gen_range(low..=high)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }

    /// Pick one element uniformly, `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.0)
    }

    /// Draw `amount` distinct elements without replacement.
    pub fn sample<T: Copy>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        items.choose_multiple(&mut self.0, amount).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reseed_replays_stream() {
        let mut rng = SimRng::seeded(42);
        let first: Vec<f64> = (0..20).map(|_| rng.unit()).collect();

        rng.reseed(42);
        let second: Vec<f64> = (0..20).map(|_| rng.unit()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = SimRng::seeded(7);
        for _ in 0..1000 {
            let v = rng.uniform(0.3, 0.7);
            assert!((0.3..=0.7).contains(&v));
        }
        assert_eq!(rng.uniform(0.5, 0.5), 0.5);
    }

    #[test]
    fn test_between_is_inclusive() {
        let mut rng = SimRng::seeded(3);
        let mut seen = [false; 3];
        for _ in 0..500 {
            seen[rng.between(1, 3) - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(rng.between(4, 4), 4);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut rng = SimRng::seeded(11);
        let items: Vec<u32> = (0..8).collect();
        let mut picked = rng.sample(&items, 5);
        assert_eq!(picked.len(), 5);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 5);

        assert_eq!(rng.sample(&items, 20).len(), 8);
        assert!(rng.choose::<u32>(&[]).is_none());
    }
}
