//! Benchmark utilities.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use ydb_ffi::Engine;

/// Seed shared by every benchmark so runs are comparable.
pub const SEED: u64 = 0x5944_4221;

/// A seeded generator.
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// Generate a random alphanumeric string of `len` characters.
pub fn random_string(rng: &mut impl Rng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate `count` random subscripts of up to `max_len` characters.
pub fn random_subscripts(rng: &mut impl Rng, count: usize, max_len: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let len = rng.gen_range(1..=max_len);
            random_string(rng, len)
        })
        .collect()
}

/// The engine benchmarks run against.
#[cfg(feature = "libyottadb")]
pub fn engine() -> Arc<dyn Engine> {
    Arc::new(ydb_ffi::NativeEngine::new())
}

/// The engine benchmarks run against.
#[cfg(not(feature = "libyottadb"))]
pub fn engine() -> Arc<dyn Engine> {
    Arc::new(ydb_ffi::InMemoryEngine::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_strings_repeat() {
        let a = random_string(&mut rng(), 16);
        let b = random_string(&mut rng(), 16);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn subscripts_respect_bounds() {
        let subs = random_subscripts(&mut rng(), 5, 8);
        assert_eq!(subs.len(), 5);
        assert!(subs.iter().all(|s| (1..=8).contains(&s.len())));
    }
}
