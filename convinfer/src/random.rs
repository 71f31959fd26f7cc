use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::tensor::{numel, Shape3, Tensor};

/// Seeded generator of uniformly distributed tensors.
pub struct Random {
    rng: StdRng,
}

impl Random {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One tensor from a fresh generator seeded with `seed`.
    pub fn generate_with_seed(seed: u64, range: (f64, f64), shape: Shape3) -> Result<Tensor> {
        Self::with_seed(seed).next(range, shape)
    }

    /// Next tensor with values in `range.0..=range.1`.
    pub fn next(&mut self, range: (f64, f64), shape: Shape3) -> Result<Tensor> {
        self.next_values(range, numel(shape))
            .and_then(|data| Tensor::from_vec(shape, data))
    }

    /// Next `len` flat values, e.g. for a weight attribute.
    pub fn next_values(&mut self, range: (f64, f64), len: usize) -> Result<Vec<f64>> {
        if !(range.0 <= range.1) {
            return Err(anyhow!("invalid random range {:?}", range));
        }
        Ok((0..len)
            .map(|_| self.rng.gen_range(range.0..=range.1))
            .collect())
    }
}
