use candle_core::{Result, Tensor};
use candle_nn::VarBuilder;

use crate::normal::{check_positive_scale, scalar_f32, Normal};

/// Emission p(y | x) = N(x, σ²)
///
/// σ is learnable and stored as ln(σ) so the decoded scale stays positive.
pub struct Likelihood {
    /// Log standard deviation ln(σ), rank 0
    log_std: Tensor,
}

impl Likelihood {
    /// # Arguments
    /// * `vb` - VarBuilder for creating trainable parameters
    /// * `init_std` - Initial σ (stored as ln(σ), must be positive)
    pub fn new(vb: VarBuilder, init_std: f32) -> Result<Self> {
        check_positive_scale("emission std", init_std)?;
        let log_std = vb.get_with_hints((), "log_std", candle_nn::Init::Const(init_std.ln() as f64))?;
        Ok(Self { log_std })
    }

    /// N(latent, σ²)
    ///
    /// * `latent` - latent values of any shape; σ is broadcast over them
    pub fn forward(&self, latent: &Tensor) -> Result<Normal> {
        Ok(Normal::new(latent.clone(), self.std()?))
    }

    pub fn log_std(&self) -> &Tensor {
        &self.log_std
    }

    /// σ = exp(ln σ)
    pub fn std(&self) -> Result<Tensor> {
        self.log_std.exp()
    }

    pub fn std_value(&self) -> Result<f32> {
        scalar_f32(&self.std()?)
    }
}
