//! Promotion coin.

use rand_core::impls;
use rand_core::OsRng;
use rand_core::RngCore;
use rand_core::SeedableRng;

/// Fallback state; xorshift never leaves zero.
const NONZERO_STATE: u64 = 0x12345678_9abcdef0;

/// A 64-bit xorshift generator. Fast and good enough for coin flips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xorshift {
    state: u64,
}

impl Xorshift {
    /// Seed from the operating system.
    pub fn from_os() -> Xorshift {
        Xorshift::seed_from_u64(OsRng.next_u64())
    }
}

impl RngCore for Xorshift {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xorshift {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        let state = u64::from_le_bytes(seed);
        Xorshift {
            state: if state == 0 { NONZERO_STATE } else { state },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Xorshift::seed_from_u64(99);
        let mut b = Xorshift::seed_from_u64(99);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn zero_seed_still_advances() {
        let mut rng = Xorshift::from_seed([0; 8]);
        let first = rng.next_u64();
        assert_ne!(first, 0);
        assert_ne!(first, rng.next_u64());
    }

    #[test]
    fn coin_is_roughly_fair() {
        let mut rng = Xorshift::seed_from_u64(7);
        let heads = (0..10_000).filter(|_| rng.next_u32() & 1 == 1).count();
        assert!((4_500..5_500).contains(&heads), "heads = {}", heads);
    }
}
