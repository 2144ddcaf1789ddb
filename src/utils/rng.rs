//! Deterministic xorshift generator for synthetic parameter blobs and images.
//!
//! Trained weights always come from a model file; this generator only exists
//! so that tests and benchmarks can build reproducible stand-ins without
//! shipping one.

/// Xorshift PRNG with a fixed, reproducible sequence per seed.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (if zero, use a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    /// Basic xorshift to generate u32.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Convert to [0, 1].
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }

    /// Uniform sample in [low, high].
    pub fn gen_range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }

    /// `count` uniform samples in [low, high].
    pub fn uniform_vec(&mut self, count: usize, low: f32, high: f32) -> Vec<f32> {
        (0..count).map(|_| self.gen_range_f32(low, high)).collect()
    }

    /// `count` raw pixel intensities, whole numbers in [0, 255].
    pub fn pixel_vec(&mut self, count: usize) -> Vec<f32> {
        (0..count).map(|_| (self.next_u32() % 256) as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimpleRng::new(7);
        let mut b = SimpleRng::new(7);
        assert_eq!(a.uniform_vec(16, -1.0, 1.0), b.uniform_vec(16, -1.0, 1.0));
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), rng.next_u32());
    }

    #[test]
    fn test_uniform_bounds() {
        let mut rng = SimpleRng::new(42);
        for value in rng.uniform_vec(1000, -0.5, 0.5) {
            assert!((-0.5..=0.5).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn test_pixels_are_whole_bytes() {
        let mut rng = SimpleRng::new(3);
        for value in rng.pixel_vec(500) {
            assert!((0.0..=255.0).contains(&value));
            assert_eq!(value.fract(), 0.0);
        }
    }
}
