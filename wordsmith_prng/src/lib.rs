// Deterministic, portable pseudo-random number generator for word generation.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled so that a given seed yields the same words on every platform
// and toolchain, which the generator tests and reproducible CLI runs rely on.
//
// `wordsmith_lang` never touches global randomness: every sampling call takes
// a `&mut WordRng`. Parallel generation derives one independent stream per
// word index with `WordRng::for_stream`, so results do not depend on how
// words are distributed across worker threads.
//
// **Critical constraint: determinism.** Every method on `WordRng` must produce
// identical output given the same prior state. Do not use floating-point
// arithmetic in the core generator, stdlib randomness, or any other source of
// non-determinism in this module.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG, the only source of randomness in word generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordRng {
    s: [u64; 4],
}

impl WordRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two `WordRng` instances created with the same seed produce identical
    /// output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create the generator for stream `stream` of a run seeded with `seed`.
    ///
    /// The stream index is mixed through SplitMix64 before seeding, so
    /// neighbouring indices get unrelated states. Word `i` of a run always
    /// draws from `for_stream(seed, i)`.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut mix = stream;
        Self::new(seed ^ splitmix64(&mut mix))
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }
}

/// SplitMix64, used for seeding and for stream derivation.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
