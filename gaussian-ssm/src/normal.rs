use candle_core::{DType, Device, Result, Tensor};

/// Reject a scale argument that cannot be a standard deviation.
pub(crate) fn check_positive_scale(name: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        candle_core::bail!("{} must be positive and finite, got {}", name, value);
    }
    Ok(())
}

/// Read a rank-0 tensor back as f32 (Metal doesn't support F64, so go through CPU)
pub fn scalar_f32(x: &Tensor) -> Result<f32> {
    x.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_scalar()
}

/// Normal distribution N(loc, scale²) over tensors.
///
/// `loc` and `scale` broadcast against each other, so a rank-0 scale can be
/// shared by a whole batch of locations. Both may carry gradients.
#[derive(Clone, Debug)]
pub struct Normal {
    loc: Tensor,
    scale: Tensor,
}

impl Normal {
    /// * `loc` - location μ
    /// * `scale` - standard deviation σ (positive, not checked here)
    pub fn new(loc: Tensor, scale: Tensor) -> Self {
        Self { loc, scale }
    }

    pub fn loc(&self) -> &Tensor {
        &self.loc
    }

    pub fn scale(&self) -> &Tensor {
        &self.scale
    }

    /// σ²
    pub fn variance(&self) -> Result<Tensor> {
        self.scale.sqr()
    }

    /// Elementwise log density
    ///
    /// log N(v; μ, σ²) = -0.5 * [(v - μ)²/σ² + 2*ln(σ) + ln(2π)]
    ///
    /// * `value` - anything that broadcasts with `loc` and `scale`,
    ///   e.g. samples of shape (S, B) against a loc of shape (B,)
    pub fn log_prob(&self, value: &Tensor) -> Result<Tensor> {
        let ln_2pi = (2.0 * std::f64::consts::PI).ln();

        let z_sq = value
            .broadcast_sub(&self.loc)?
            .broadcast_div(&self.scale)?
            .sqr()?;

        let log_scale = self.scale.log()?;

        (z_sq * (-0.5))?.broadcast_sub(&log_scale)? - 0.5 * ln_2pi
    }

    /// Reparameterised draws μ + σ * ε, ε ~ N(0, 1)
    ///
    /// # Returns
    /// Samples of shape (num_samples, ...) where `...` is the broadcast
    /// shape of `loc` and `scale`. Gradients flow back to both.
    pub fn rsample(&self, num_samples: usize) -> Result<Tensor> {
        let shape = self
            .loc
            .shape()
            .broadcast_shape_binary_op(self.scale.shape(), "rsample")?;

        let mut dims = vec![num_samples];
        dims.extend_from_slice(shape.dims());

        let eps = Tensor::randn(0_f32, 1_f32, dims, self.loc.device())?.to_dtype(self.loc.dtype())?;

        eps.broadcast_mul(&self.scale)?.broadcast_add(&self.loc)
    }

    /// Analytic KL(self || other), elementwise
    ///
    /// ln(σ₂/σ₁) + (σ₁² + (μ₁ - μ₂)²) / (2σ₂²) - 1/2
    pub fn kl_divergence(&self, other: &Normal) -> Result<Tensor> {
        let log_ratio = other.scale.log()?.broadcast_sub(&self.scale.log()?)?;
        let diff_sq = self.loc.broadcast_sub(&other.loc)?.sqr()?;
        let numer = self.variance()?.broadcast_add(&diff_sq)?;
        let denom = (other.variance()? * 2.0)?;
        log_ratio.broadcast_add(&numer.broadcast_div(&denom)?)? - 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(x: f32) -> Result<Tensor> {
        Tensor::new(x, &Device::Cpu)
    }

    #[test]
    fn test_log_prob_standard_normal() -> Result<()> {
        let normal = Normal::new(scalar(0.0)?, scalar(1.0)?);
        let value = Tensor::new(&[0.0_f32, 1.0, -2.0], &Device::Cpu)?;
        let log_prob = normal.log_prob(&value)?.to_vec1::<f32>()?;

        let ln_2pi = (2.0 * std::f32::consts::PI).ln();
        let expected = [-0.5 * ln_2pi, -0.5 - 0.5 * ln_2pi, -2.0 - 0.5 * ln_2pi];

        for (actual, expected) in log_prob.iter().zip(expected.iter()) {
            assert!((actual - expected).abs() < 1e-5, "Expected {}, got {}", expected, actual);
        }
        Ok(())
    }

    #[test]
    fn test_log_prob_scaled() -> Result<()> {
        // N(3; 1, 2²): z = 1, so -0.5 - ln 2 - 0.5 ln 2π
        let normal = Normal::new(scalar(1.0)?, scalar(2.0)?);
        let val: f32 = normal.log_prob(&scalar(3.0)?)?.to_scalar()?;
        let expected = -0.5 - 2_f32.ln() - 0.5 * (2.0 * std::f32::consts::PI).ln();
        assert!((val - expected).abs() < 1e-5, "Expected {}, got {}", expected, val);
        Ok(())
    }

    #[test]
    fn test_rsample_shape() -> Result<()> {
        let loc = Tensor::zeros(7, DType::F32, &Device::Cpu)?;
        let normal = Normal::new(loc, scalar(1.0)?);
        let samples = normal.rsample(4)?;
        assert_eq!(samples.dims(), &[4, 7]);
        Ok(())
    }

    #[test]
    fn test_rsample_moments() -> Result<()> {
        let normal = Normal::new(scalar(5.0)?, scalar(0.1)?);
        let samples = normal.rsample(10_000)?;
        let mean: f32 = samples.mean_all()?.to_scalar()?;
        assert!((mean - 5.0).abs() < 0.01, "sample mean {}", mean);
        Ok(())
    }

    #[test]
    fn test_kl_divergence() -> Result<()> {
        let p = Normal::new(scalar(0.3)?, scalar(0.7)?);
        let self_kl: f32 = p.kl_divergence(&p)?.to_scalar()?;
        assert!(self_kl.abs() < 1e-6);

        // KL(N(0,1) || N(1,1)) = 0.5
        let q = Normal::new(scalar(0.0)?, scalar(1.0)?);
        let r = Normal::new(scalar(1.0)?, scalar(1.0)?);
        let kl: f32 = q.kl_divergence(&r)?.to_scalar()?;
        assert!((kl - 0.5).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_check_positive_scale() {
        assert!(check_positive_scale("std", 1.0).is_ok());
        assert!(check_positive_scale("std", 0.0).is_err());
        assert!(check_positive_scale("std", -1.0).is_err());
        assert!(check_positive_scale("std", f32::NAN).is_err());
    }
}
