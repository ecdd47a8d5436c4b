//! The [`RandomSource`] handle and the process-wide instance.

use crate::seed::{create_byte_seed, UNSEEDED};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use uuid::Uuid;

enum Mode {
    Unseeded,
    Seeded { seed: u64, rng: StdRng },
}

/// Cloneable handle to a randomness source.
///
/// Clones share the same underlying generator. In seeded mode all draws are
/// serialized through one lock; interleaving draws from several tasks still
/// makes the output depend on scheduling, so reproducible runs should keep
/// a single drawing task or an externally fixed draw order.
#[derive(Clone)]
pub struct RandomSource {
    mode: Arc<RwLock<Mode>>,
}

impl RandomSource {
    /// Create a source that is not reproducible across runs.
    pub fn unseeded() -> Self {
        Self {
            mode: Arc::new(RwLock::new(Mode::Unseeded)),
        }
    }

    /// Create a reproducible source from an explicit seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            mode: Arc::new(RwLock::new(seeded_mode(seed))),
        }
    }

    /// Create a source from a seed argument, where [`UNSEEDED`] (`-1`) or any
    /// negative value selects unseeded mode.
    pub fn from_seed_arg(seed: i64) -> Self {
        if seed <= UNSEEDED {
            Self::unseeded()
        } else {
            Self::seeded(seed as u64)
        }
    }

    /// Re-seed this source (and every clone of it).
    ///
    /// UUIDs come from the same generator, so they are reseeded too.
    pub fn reseed(&self, seed: i64) {
        let mut mode = self.mode.write().unwrap_or_else(|e| e.into_inner());
        *mode = if seed <= UNSEEDED {
            Mode::Unseeded
        } else {
            seeded_mode(seed as u64)
        };
    }

    /// The seed in use, if seeded.
    pub fn seed(&self) -> Option<u64> {
        match *self.mode.read().unwrap_or_else(|e| e.into_inner()) {
            Mode::Unseeded => None,
            Mode::Seeded { seed, .. } => Some(seed),
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seed().is_some()
    }

    /// Uniform integer in `[0, n)`.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn int_n(&self, n: usize) -> usize {
        assert!(n > 0, "invalid argument to int_n: n must be positive");
        self.draw(|rng| rng.random_range(0..n))
    }

    /// Uniform 64-bit integer in `[0, n)`.
    ///
    /// # Panics
    ///
    /// Panics if `n <= 0`.
    pub fn int64_n(&self, n: i64) -> i64 {
        assert!(n > 0, "invalid argument to int64_n: n must be positive");
        self.draw(|rng| rng.random_range(0..n))
    }

    /// Uniform float in `[0, 1)`.
    pub fn float64(&self) -> f64 {
        self.draw(|rng| rng.random::<f64>())
    }

    /// Uniform float in `[0, 1)`.
    pub fn float32(&self) -> f32 {
        self.draw(|rng| rng.random::<f32>())
    }

    pub fn uint64(&self) -> u64 {
        self.draw(|rng| rng.next_u64())
    }

    /// Fisher-Yates shuffle of `n` elements through the `swap` callback.
    ///
    /// The swap sequence is drawn before any callback runs, so `swap` may
    /// itself draw from this source.
    pub fn shuffle(&self, n: usize, mut swap: impl FnMut(usize, usize)) {
        if n < 2 {
            return;
        }
        let swaps: Vec<(usize, usize)> = self.draw(|rng| {
            (1..n)
                .rev()
                .map(|i| (i, rng.random_range(0..=i)))
                .collect()
        });
        for (i, j) in swaps {
            swap(i, j);
        }
    }

    /// Random (v4) UUID built from this source's entropy.
    pub fn uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.draw(|rng| rng.fill_bytes(&mut bytes));
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }

    fn draw<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        let unseeded = matches!(
            *self.mode.read().unwrap_or_else(|e| e.into_inner()),
            Mode::Unseeded
        );
        if unseeded {
            return f(&mut rand::rng());
        }
        let mut mode = self.mode.write().unwrap_or_else(|e| e.into_inner());
        match &mut *mode {
            Mode::Seeded { rng, .. } => f(rng),
            Mode::Unseeded => f(&mut rand::rng()),
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::unseeded()
    }
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seed() {
            Some(seed) => write!(f, "RandomSource(seeded: {seed})"),
            None => write!(f, "RandomSource(unseeded)"),
        }
    }
}

fn seeded_mode(seed: u64) -> Mode {
    Mode::Seeded {
        seed,
        rng: StdRng::from_seed(create_byte_seed(seed)),
    }
}

static GLOBAL: OnceLock<RandomSource> = OnceLock::new();

/// The process-wide source, unseeded until [`set_global_seed`] is called.
pub fn global() -> RandomSource {
    GLOBAL.get_or_init(RandomSource::unseeded).clone()
}

/// Seed (or unseed, with `-1`) the process-wide source.
pub fn set_global_seed(seed: i64) {
    global().reseed(seed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sources_match() {
        let a = RandomSource::seeded(42);
        let b = RandomSource::seeded(42);

        for _ in 0..100 {
            assert_eq!(a.int_n(1000), b.int_n(1000));
            assert_eq!(a.uint64(), b.uint64());
            assert_eq!(a.float64(), b.float64());
        }
        assert_eq!(a.uuid(), b.uuid());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = RandomSource::seeded(1);
        let b = RandomSource::seeded(2);

        let xs: Vec<u64> = (0..8).map(|_| a.uint64()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.uint64()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_reseed_restarts_sequence() {
        let source = RandomSource::seeded(7);
        let first: Vec<usize> = (0..10).map(|_| source.int_n(100)).collect();
        let first_id = source.uuid();

        source.reseed(7);
        let second: Vec<usize> = (0..10).map(|_| source.int_n(100)).collect();
        let second_id = source.uuid();

        assert_eq!(first, second);
        assert_eq!(first_id, second_id);
    }

    #[test]
    fn test_clones_share_generator() {
        let a = RandomSource::seeded(3);
        let b = a.clone();
        let reference = RandomSource::seeded(3);

        let drawn = [a.uint64(), b.uint64()];
        let expected = [reference.uint64(), reference.uint64()];
        assert_eq!(drawn, expected);
    }

    #[test]
    fn test_from_seed_arg() {
        assert!(!RandomSource::from_seed_arg(-1).is_seeded());
        assert_eq!(RandomSource::from_seed_arg(0).seed(), Some(0));
        assert_eq!(RandomSource::from_seed_arg(99).seed(), Some(99));
    }

    #[test]
    fn test_ranges() {
        let source = RandomSource::unseeded();
        for _ in 0..1000 {
            assert!(source.int_n(5) < 5);
            let v = source.int64_n(3);
            assert!((0..3).contains(&v));
            let f = source.float64();
            assert!((0.0..1.0).contains(&f));
            let g = source.float32();
            assert!((0.0..1.0).contains(&g));
        }
    }

    #[test]
    #[should_panic(expected = "n must be positive")]
    fn test_int_n_zero_panics() {
        RandomSource::unseeded().int_n(0);
    }

    #[test]
    #[should_panic(expected = "n must be positive")]
    fn test_int64_n_negative_panics() {
        RandomSource::seeded(1).int64_n(-4);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let source = RandomSource::seeded(11);
        let mut values: Vec<u32> = (0..50).collect();
        source.shuffle(values.len(), |i, j| values.swap(i, j));

        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_callback_may_draw() {
        let source = RandomSource::seeded(5);
        let inner = source.clone();
        let mut calls = 0;
        source.shuffle(4, |_, _| {
            inner.int_n(10);
            calls += 1;
        });
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_uuid_is_v4() {
        let id = RandomSource::seeded(9).uuid();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_concurrent_unseeded_draws() {
        let source = RandomSource::unseeded();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = source.clone();
                std::thread::spawn(move || (0..1000).map(|_| s.int_n(10)).sum::<usize>())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap() < 10_000);
        }
    }
}
