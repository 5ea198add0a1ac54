//! Neighbor-substitute sampling without replacement.
//!
//! For unit i with k_i neighbors the candidate pool is every other unit.
//! Each draw is a fresh partial Fisher-Yates pass over the pool, so the
//! first k_i positions form a uniform k_i-subset that never contains i.

use rand::seq::SliceRandom;
use rand::Rng;

/// Reusable candidate pool for one focal unit at a time.
#[derive(Debug, Clone)]
pub struct UnitSampler {
    n: usize,
    pool: Vec<usize>,
}

impl UnitSampler {
    /// Create a sampler over `n` units focused on `focal`.
    pub fn new(n: usize, focal: usize) -> Self {
        let mut sampler = Self {
            n,
            pool: Vec::with_capacity(n.saturating_sub(1)),
        };
        sampler.reset(focal);
        sampler
    }

    /// Refocus the sampler on another unit, reusing the allocation.
    pub fn reset(&mut self, focal: usize) {
        self.pool.clear();
        self.pool.extend((0..self.n).filter(|&j| j != focal));
    }

    /// Number of candidates (n - 1 when the focal unit is in range).
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Draw `k` distinct candidates. `k` must not exceed the pool size.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R, k: usize) -> &[usize] {
        debug_assert!(k <= self.pool.len());
        let (sample, _) = self.pool.partial_shuffle(rng, k);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_draw_excludes_focal() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let mut sampler = UnitSampler::new(10, 3);
        assert_eq!(sampler.pool_size(), 9);
        for _ in 0..200 {
            let s = sampler.draw(&mut rng, 4);
            assert_eq!(s.len(), 4);
            assert!(!s.contains(&3));
            let unique: HashSet<_> = s.iter().collect();
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn test_draw_whole_pool() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let mut sampler = UnitSampler::new(5, 0);
        let mut s = sampler.draw(&mut rng, 4).to_vec();
        s.sort_unstable();
        assert_eq!(s, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reset_changes_focal() {
        let mut sampler = UnitSampler::new(4, 0);
        sampler.reset(2);
        assert_eq!(sampler.pool_size(), 3);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        assert!(!sampler.draw(&mut rng, 3).contains(&2));
    }

    #[test]
    fn test_every_candidate_is_reachable() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        let mut sampler = UnitSampler::new(6, 5);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(sampler.draw(&mut rng, 1).iter().copied());
        }
        assert_eq!(seen, (0..5).collect::<HashSet<_>>());
    }
}
