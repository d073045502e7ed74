use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A uniform random source producing values in [0, 1)
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Fisher-Yates shuffle driven by any uniform source.
/// Walks from the last index down to 1, swapping with a uniformly chosen earlier slot.
pub fn shuffle<T, R: RandomSource + ?Sized>(array: &mut [T], source: &mut R) {
    for i in (1..array.len()).rev() {
        let j = ((source.next_unit() * (i + 1) as f64) as usize).min(i);
        array.swap(i, j);
    }
}

/// Map a seed string to a numeric seed.
/// Decimal strings are used as-is; anything else is hashed with 64-bit FNV-1a.
pub fn seed_from_str(seed: &str) -> u64 {
    let trimmed = seed.trim();
    if let Ok(n) = trimmed.parse::<u64>() {
        return n;
    }

    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    trimmed.bytes().fold(FNV_OFFSET, |h, b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

/// Seeded random number generator for reproducible simulations
#[derive(Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new GameRng with an optional seed
    /// If seed is None, generates a random seed
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            use rand::thread_rng;
            thread_rng().gen()
        });

        let rng = ChaCha8Rng::seed_from_u64(seed);
        GameRng { rng, seed }
    }

    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(Some(seed_from_str(seed)))
    }

    /// Independent sub-stream for one trial of a partitioned run.
    /// Same master seed and index always yield the same stream.
    pub fn for_trial(master_seed: u64, index: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(master_seed);
        rng.set_stream(index);
        GameRng {
            rng,
            seed: master_seed,
        }
    }

    /// Get the seed used for this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random number in range [0, 1)
    pub fn random(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Fisher-Yates shuffle for a mutable slice
    pub fn shuffle<T>(&mut self, array: &mut [T]) {
        shuffle(array, self);
    }
}

impl RandomSource for GameRng {
    fn next_unit(&mut self) -> f64 {
        self.random()
    }
}
