//! Deterministic random number streams.
//!
//! Each gameplay concern draws from its own [`Pcg32`] stream so that, for
//! example, spawning one extra collectible never shifts the reward rolls.
//! All streams share the world's base seed and differ by PCG stream id, so
//! the same seed always reproduces the same sequences on every platform.
//!
//! [`resolve_seed`] derives base seeds from tier-scoped parameters.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Bump when [`resolve_seed`] changes, so old seeds stay reproducible.
pub const SEED_HASH_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// RngStream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RngStream {
    WorldGen,
    Reward,
    Bonus,
    Collectible,
}

impl RngStream {
    pub const ALL: [RngStream; 4] = [
        RngStream::WorldGen,
        RngStream::Reward,
        RngStream::Bonus,
        RngStream::Collectible,
    ];

    /// PCG stream selector. Distinct per stream, so sequences never overlap.
    fn stream_id(self) -> u64 {
        match self {
            Self::WorldGen => 1,
            Self::Reward => 2,
            Self::Bonus => 3,
            Self::Collectible => 4,
        }
    }

    fn index(self) -> usize {
        self.stream_id() as usize - 1
    }
}

// ---------------------------------------------------------------------------
// RngStreams
// ---------------------------------------------------------------------------

/// One independent generator per [`RngStream`].
#[derive(Debug, Clone)]
pub struct RngStreams {
    base_seed: u64,
    streams: [Pcg32; 4],
}

impl RngStreams {
    pub fn new(base_seed: u64) -> Self {
        Self {
            base_seed,
            streams: RngStream::ALL.map(|s| Pcg32::new(base_seed, s.stream_id())),
        }
    }

    /// Rewind every stream to the start of `base_seed`'s sequences.
    pub fn reset(&mut self, base_seed: u64) {
        *self = Self::new(base_seed);
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// The generator backing `stream`. Use it through [`rand::Rng`].
    pub fn stream(&mut self, stream: RngStream) -> &mut Pcg32 {
        &mut self.streams[stream.index()]
    }

    pub fn next_u32(&mut self, stream: RngStream) -> u32 {
        self.stream(stream).gen()
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self, stream: RngStream) -> f32 {
        self.stream(stream).gen()
    }

    /// Uniform in `[min, max)`. Returns `min` when the range is empty.
    pub fn next_range(&mut self, stream: RngStream, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.stream(stream).gen_range(min..max)
    }

    /// Derive a standalone generator for a sub-task (one per stage, etc.)
    /// without disturbing the parent stream's future output beyond one draw.
    pub fn fork(&mut self, stream: RngStream) -> Pcg32 {
        let seed = self.stream(stream).gen::<u64>();
        Pcg32::seed_from_u64(seed)
    }
}

impl Default for RngStreams {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SEED)
    }
}

// ---------------------------------------------------------------------------
// Seed resolution
// ---------------------------------------------------------------------------

/// Deterministic seed for a tier, a category and a set of symbol ids.
///
/// Symbol order does not matter. The same inputs under a different tier give
/// a different seed.
///
/// The key is hashed with BLAKE3, not SHA-256, so seeds differ from those of
/// resolvers that hash the same key with SHA-256. Reproducibility holds
/// within this crate for a given [`SEED_HASH_VERSION`].
pub fn resolve_seed(tier: i32, category: i32, symbols: &[i32]) -> u64 {
    resolve_seed_versioned(SEED_HASH_VERSION, tier, category, symbols)
}

/// [`resolve_seed`] pinned to a specific hash version.
pub fn resolve_seed_versioned(version: u32, tier: i32, category: i32, symbols: &[i32]) -> u64 {
    let mut sorted = symbols.to_vec();
    sorted.sort_unstable();

    let mut input = format!("v{version}_t{tier}_c{category}_");
    for symbol in sorted {
        input.push_str(&format!("s{symbol}_"));
    }

    let hash = blake3::hash(input.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(seed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
