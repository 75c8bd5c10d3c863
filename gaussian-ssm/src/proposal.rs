use candle_core::{Result, Tensor};
use candle_nn::VarBuilder;

use crate::normal::{check_positive_scale, scalar_f32, Normal};

/// Inference network q(x | y) = N(a * y₀ + b, σ²)
///
/// The proposal mean is affine in the first observation of the sequence.
/// a, b and ln(σ) are all learnable.
pub struct InferenceNetwork {
    /// Slope a, rank 0
    mult: Tensor,
    /// Intercept b, rank 0
    bias: Tensor,
    /// Log standard deviation ln(σ), rank 0
    log_std: Tensor,
}

impl InferenceNetwork {
    /// # Arguments
    /// * `vb` - VarBuilder for creating trainable parameters
    /// * `init_mult` - Initial slope a
    /// * `init_bias` - Initial intercept b
    /// * `init_std` - Initial σ (stored as ln(σ), must be positive)
    pub fn new(vb: VarBuilder, init_mult: f32, init_bias: f32, init_std: f32) -> Result<Self> {
        check_positive_scale("proposal std", init_std)?;
        let mult = vb.get_with_hints((), "mult", candle_nn::Init::Const(init_mult as f64))?;
        let bias = vb.get_with_hints((), "bias", candle_nn::Init::Const(init_bias as f64))?;
        let log_std = vb.get_with_hints((), "log_std", candle_nn::Init::Const(init_std.ln() as f64))?;
        Ok(Self {
            mult,
            bias,
            log_std,
        })
    }

    /// Proposal given the observed sequence
    ///
    /// * `observations` - observations ordered in time; only the first
    ///   one (any shape, typically a batch `(B,)`) is used
    ///
    /// # Returns
    /// N(a * observations[0] + b, σ²), or an error if `observations` is empty
    pub fn forward(&self, observations: &[Tensor]) -> Result<Normal> {
        let Some(y0) = observations.first() else {
            candle_core::bail!("inference network needs at least one observation");
        };
        let loc = y0.broadcast_mul(&self.mult)?.broadcast_add(&self.bias)?;
        Ok(Normal::new(loc, self.std()?))
    }

    pub fn mult(&self) -> &Tensor {
        &self.mult
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    pub fn log_std(&self) -> &Tensor {
        &self.log_std
    }

    /// σ = exp(ln σ)
    pub fn std(&self) -> Result<Tensor> {
        self.log_std.exp()
    }

    pub fn mult_value(&self) -> Result<f32> {
        scalar_f32(&self.mult)
    }

    pub fn bias_value(&self) -> Result<f32> {
        scalar_f32(&self.bias)
    }

    pub fn std_value(&self) -> Result<f32> {
        scalar_f32(&self.std()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_identity_proposal() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);

        let proposal = InferenceNetwork::new(vb, 1.0, 0.0, 1.0)?;
        let y0 = Tensor::new(3.0_f32, &Device::Cpu)?;
        let dist = proposal.forward(&[y0])?;

        let loc: f32 = dist.loc().to_scalar()?;
        let scale: f32 = dist.scale().to_scalar()?;
        assert!((loc - 3.0).abs() < 1e-6);
        assert!((scale - 1.0).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn test_affine_in_first_observation_only() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);

        let proposal = InferenceNetwork::new(vb, 0.5, 1.0, 0.3)?;
        let y0 = Tensor::new(&[2.0_f32, -4.0], &Device::Cpu)?;
        let y1 = Tensor::new(&[100.0_f32, 100.0], &Device::Cpu)?;
        let dist = proposal.forward(&[y0, y1])?;

        let loc = dist.loc().to_vec1::<f32>()?;
        assert!((loc[0] - 2.0).abs() < 1e-6);
        assert!((loc[1] + 1.0).abs() < 1e-6);
        assert!((proposal.std_value()? - 0.3).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn test_empty_observations() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);

        let proposal = InferenceNetwork::new(vb, 1.0, 0.0, 1.0)?;
        assert!(proposal.forward(&[]).is_err());

        Ok(())
    }
}
