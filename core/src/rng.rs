//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SimRng streams derived from the
//! master seed in SimConfig.
//!
//! Each consumer gets its own stream, seeded from
//! (master_seed XOR slot_index * golden-ratio constant), so adding a
//! new consumer never shifts an existing one's sequence.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG stream.
pub struct SimRng {
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(master_seed: u64, slot: RngSlot) -> Self {
        let derived_seed = master_seed ^ (slot as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self { inner: Pcg64Mcg::seed_from_u64(derived_seed) }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick an index from a weight table. Zero weights are never chosen
    /// unless every weight is zero, in which case index 0 is returned.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i;
            }
            roll -= w;
        }
        // Float rounding can leave roll marginally above the last bucket.
        weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries. Only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Weather = 0,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7, RngSlot::Weather);
        let mut b = SimRng::new(7, RngSlot::Weather);
        for _ in 0..32 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = SimRng::new(99, RngSlot::Weather);
        for _ in 0..200 {
            assert_eq!(rng.weighted_index(&[0.0, 3.0, 0.0]), 1);
        }
    }
}
