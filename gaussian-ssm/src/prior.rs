use candle_core::{Result, Tensor};
use candle_nn::VarBuilder;

use crate::normal::{check_positive_scale, scalar_f32, Normal};

/// Initial-state prior p(x₀) = N(μ, σ²)
///
/// μ is learnable, σ is fixed at construction.
pub struct Prior {
    /// Learnable mean μ, rank 0
    mean: Tensor,
    /// Fixed standard deviation σ, rank 0
    std: Tensor,
}

impl Prior {
    /// Create a prior with a learnable mean.
    ///
    /// # Arguments
    /// * `vb` - VarBuilder for creating trainable parameters
    /// * `init_mean` - Initial value for μ
    /// * `std` - Fixed σ (must be positive)
    pub fn new(vb: VarBuilder, init_mean: f32, std: f32) -> Result<Self> {
        check_positive_scale("prior std", std)?;
        let mean = vb.get_with_hints((), "mean", candle_nn::Init::Const(init_mean as f64))?;
        let std = Tensor::new(std, vb.device())?.to_dtype(vb.dtype())?;
        Ok(Self { mean, std })
    }

    /// N(μ, σ²) at the current parameter values
    pub fn forward(&self) -> Normal {
        Normal::new(self.mean.clone(), self.std.clone())
    }

    pub fn mean(&self) -> &Tensor {
        &self.mean
    }

    pub fn std(&self) -> &Tensor {
        &self.std
    }

    pub fn mean_value(&self) -> Result<f32> {
        scalar_f32(&self.mean)
    }

    pub fn std_value(&self) -> Result<f32> {
        scalar_f32(&self.std)
    }
}
