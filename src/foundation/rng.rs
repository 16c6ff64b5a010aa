/// Source of uniform random numbers for per-unit visual parameters.
///
/// Controllers take this as a boxed trait object so hosts can seed it and tests can script it.
pub trait UnitRandom {
    /// Next value in `[0, 1)`.
    fn next_f64_01(&mut self) -> f64;

    /// Next integer in `[0, bound)`; zero when `bound` is zero.
    fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        let v = (self.next_f64_01() * bound as f64).floor() as u64;
        v.min(bound - 1)
    }

    /// Fair coin flip.
    fn coin(&mut self) -> bool {
        self.next_f64_01() < 0.5
    }
}

/// Deterministic SplitMix64 generator.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Create a generator from a seed. Equal seeds yield equal sequences.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl UnitRandom for Rng64 {
    fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
