//! Reproducible pseudorandom source for RMHC. Seeded from a 32-bit integer; the same seed
//! always produces the same sequence of `uniform()`/`normal()` outputs, which is what makes
//! SLAM output reproducible end to end. Deliberately hand-rolled rather than delegated to a
//! platform RNG, per the specification's design note — a dependency on the host's default RNG
//! would make map/pose output vary across platforms even for identical inputs and seed.

/// `uniform()` is a 32-bit linear congruential generator (constants from Numerical Recipes,
/// chapter 7.1); `normal()` draws standard Gaussian variates from that stream with the
/// Marsaglia polar method (rejection sampling in the unit disk). The original C core of
/// tinySLAM instead uses Marsaglia's Ziggurat algorithm, which needs a large precomputed
/// table; polar Box-Muller reaches the same distribution from the same underlying uniform
/// stream without one, at the cost of an occasional rejected sample.
pub struct Prng {
    state: u32,
    spare: Option<f64>,
}

impl Prng {
    pub fn new(seed: u32) -> Self {
        Prng {
            state: seed,
            spare: None,
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        self.state
    }

    /// A uniform real strictly inside (0, 1).
    pub fn uniform(&mut self) -> f64 {
        (self.next_u32() as f64 + 1.0) / (u32::MAX as f64 + 2.0)
    }

    /// A standard Gaussian variate (mean 0, variance 1).
    pub fn normal(&mut self) -> f64 {
        if let Some(v) = self.spare.take() {
            return v;
        }

        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * scale);
                return u * scale;
            }
        }
    }
}
