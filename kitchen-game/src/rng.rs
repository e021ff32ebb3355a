//! Deterministic RNG streams segregated by cooking domain.
use hmac::{Hmac, Mac};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Seedable source for every random decision a session makes.
///
/// Ingredient rolls and jackpot scheduling draw from separate streams so a
/// change in one never shifts the other.
#[derive(Debug, Clone)]
pub struct KitchenRng {
    seed: u64,
    ingredients: CountingRng<ChaCha20Rng>,
    jackpot: CountingRng<ChaCha20Rng>,
}

impl KitchenRng {
    /// Construct the streams from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            ingredients: CountingRng::new(derive_stream_seed(seed, b"ingredients")),
            jackpot: CountingRng::new(derive_stream_seed(seed, b"jackpot")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream used for slot picks and effect sampling.
    pub fn ingredients(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.ingredients
    }

    /// Stream used for jackpot trigger scheduling.
    pub fn jackpot(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.jackpot
    }

    /// Uniform index in `0..len`; `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.ingredients.gen_range(0..len)
    }

    /// Uniform integer in `min..=max` from the jackpot stream.
    pub fn jackpot_interval(&mut self, min: u32, max: u32) -> u32 {
        self.jackpot.gen_range(min..=max)
    }

    /// Total draws across all streams.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.ingredients.draws() + self.jackpot.draws()
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
