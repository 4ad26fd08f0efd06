//! Per-engine Xorshift64 PRNG.
//!
//! Each engine owns one generator, so two effects on the same page never share
//! random state. Seeding is explicit: tests and the CLI pass a fixed seed, the
//! browser binding derives one from `Math.random()`.

use serde::{Deserialize, Serialize};

/// Xorshift64 generator with shifts (13, 7, 17).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Replacement for a zero seed, which is a fixed point of xorshift.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a generator with the given seed. A seed of 0 is replaced by
    /// `0x5EED_DEAD_BEEF_CAFE`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Seeds from a host-supplied float in [0, 1), e.g. JavaScript's `Math.random()`.
    pub fn from_unit_f64(entropy: f64) -> Self {
        let entropy = if entropy.is_finite() { entropy.abs().fract() } else { 0.0 };
        Self::new((entropy * (1u64 << 53) as f64) as u64 ^ Self::FALLBACK_SEED.rotate_left(17))
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index into a collection of `len` items, or `None` when `len` is 0.
    pub fn next_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let i = (self.next_f64() * len as f64) as usize;
        Some(i.min(len - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        assert!((0..3).all(|_| rng.next_u64() != 0));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Xorshift64::new(7);
        let mut b = Xorshift64::new(7);
        for i in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64(), "diverged at {i}");
        }
    }

    #[test]
    fn from_unit_f64_tolerates_garbage() {
        for entropy in [0.0, 0.999, f64::NAN, f64::INFINITY, -3.25] {
            let mut rng = Xorshift64::from_unit_f64(entropy);
            assert_ne!(rng.next_u64(), 0, "entropy {entropy}");
        }
    }

    #[test]
    fn from_unit_f64_distinguishes_inputs() {
        let mut a = Xorshift64::from_unit_f64(0.25);
        let mut b = Xorshift64::from_unit_f64(0.75);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn next_index_of_empty_is_none() {
        let mut rng = Xorshift64::new(1);
        assert_eq!(rng.next_index(0), None);
    }

    #[test]
    fn next_index_of_one_is_always_zero() {
        let mut rng = Xorshift64::new(1);
        assert!((0..100).all(|_| rng.next_index(1) == Some(0)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v), "next_f64() = {v} for seed {seed}");
                }
            }

            #[test]
            fn next_index_in_bounds(seed: u64, len in 1_usize..10_000) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let i = rng.next_index(len).unwrap();
                    prop_assert!(i < len, "next_index({len}) = {i}");
                }
            }
        }
    }
}
