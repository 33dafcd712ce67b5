//! Seedable random source for cell choice, kind selection and delay
//! sampling. Kept behind one type so tests can replay exact sequences with a
//! fixed seed; the browser harness seeds it from `performance.now()`.

/// splitmix64 generator. Not crypto secure; plenty for game variability.
pub struct GameRng {
    state: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from a millisecond clock reading (sub-ms fraction folded in so
    /// two rounds started close together still diverge).
    pub fn from_clock(now_ms: f64) -> Self {
        let whole = now_ms as u64;
        let frac = (now_ms.fract() * 1e6) as u64;
        Self::new(whole ^ frac.rotate_left(32) ^ 0x9e37_79b9_7f4a_7c15)
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [min, max).
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform index in [0, len). Returns 0 for an empty range.
    pub fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_f64() * len as f64) as usize % len
    }
}
