//! Fixed-seed pseudo-random stream (spec §4.1, §9).
//!
//! The spec deliberately does not require bit-for-bit reproduction of the
//! original generator's sequence, only: (a) a process-wide default stream
//! that every freshly-initialized context clones from, and (b) a
//! deterministic way to derive an independent child stream for the second
//! half of a `split_launch` from the parent's current state. A xorshift64*
//! generator satisfies both with a handful of lines.

/// Default seed used when `RandomFixedSeed` (or `Deterministic`) is set,
/// matching every context initialized under that option to the same
/// sequence.
const FIXED_SEED: u64 = 0x9E3779B97F4A7C15;

#[derive(Clone, Copy, Debug)]
pub struct RandomStream {
    state: u64,
}

impl RandomStream {
    pub fn seeded(seed: u64) -> Self {
        // xorshift64* requires a non-zero state.
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// `context_random_clone`: snapshots the process-wide default stream.
    /// When `fixed` is set every clone starts from the same state.
    pub fn clone_default(fixed: bool) -> Self {
        if fixed {
            Self::seeded(FIXED_SEED)
        } else {
            Self::seeded(process_entropy())
        }
    }

    pub fn reset(&mut self, seed: u64) {
        *self = Self::seeded(seed);
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    pub fn next_usize_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            (self.next_u64() % bound as u64) as usize
        }
    }

    /// Derives a fresh, independent stream from this one's current state,
    /// the same way `contextThreadLaunchSplit` seeds the second
    /// sub-context's generator from the parent's: two successive draws,
    /// one to perturb a process-function analog and one as the seed.
    pub fn derive_fresh(&mut self) -> RandomStream {
        let a = self.next_u64();
        let b = self.next_u64();
        RandomStream::seeded(a ^ b.rotate_left(32))
    }
}

fn process_entropy() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0xDEAD_BEEF_CAFE_F00D)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_seed_is_reproducible() {
        let mut a = RandomStream::clone_default(true);
        let mut b = RandomStream::clone_default(true);
        assert_eq!(a.next_u64(), b.next_u64());
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn derived_stream_differs_from_parent() {
        let mut parent = RandomStream::seeded(42);
        let parent_next = parent.next_u64();
        let mut parent2 = RandomStream::seeded(42);
        let child = parent2.derive_fresh();
        // consuming two draws from an independent clone must not reproduce
        // the single-draw value the parent would have produced
        assert_ne!(parent_next, child.state);
    }
}
