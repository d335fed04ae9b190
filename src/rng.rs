use std::collections::HashMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Named deterministic random streams, one per rule.
///
/// Each stream's seed is the scenario seed folded with a hash of the stream
/// name, so a stream's identity does not depend on which rule happens to
/// draw first. Same scenario seed, same stream name, same numbers.
pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> RuleRng<'_> {
        let seed = self.seed;
        let inner = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(derive_seed(seed, name)));
        RuleRng { inner }
    }
}

fn derive_seed(master: u64, name: &str) -> u64 {
    // FNV-1a over the stream name, folded into the master seed.
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    master ^ hash
}

/// Borrowed handle onto one named stream.
pub struct RuleRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl RuleRng<'_> {
    /// Uniform sample from an inclusive millisecond range.
    pub fn sample_delay_ms(&mut self, min_ms: u64, max_ms: u64) -> u64 {
        if min_ms >= max_ms {
            return min_ms;
        }
        self.inner.gen_range(min_ms..=max_ms)
    }
}

impl RngCore for RuleRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
