//! Seedable dice PRNG. SplitMix64 keeps per-trial cost low and every stream reproducible:
//! the same seed always yields the same faces. Not cryptographically secure.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// Number of faces on every die in the pool.
pub const FACES: u32 = 6;

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// One fair d6 face in `1..=6`. Modulo bias over 2^64 is below 1e-18 and ignored.
    #[inline]
    pub fn roll_d6(&mut self) -> u32 {
        (self.next_u64() % FACES as u64) as u32 + 1
    }

    /// Sum of `count` fair d6.
    #[inline]
    pub fn roll_sum(&mut self, count: u32) -> u32 {
        (0..count).map(|_| self.roll_d6()).sum()
    }
}

/// Draw a 64-bit seed from the operating system.
pub fn entropy_seed() -> Result<u64, getrandom::Error> {
    let mut buf = [0_u8; 8];
    getrandom::getrandom(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Mix a base seed with a stream index into an independent stream seed.
/// Used to give every candidate and every trial batch its own generator.
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut mixer = Rng::new(base ^ stream.wrapping_mul(SPLITMIX64_M1));
    mixer.next_u64()
}
