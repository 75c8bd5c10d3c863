use candle_core::{Result, Tensor};
use candle_nn::VarBuilder;

use crate::likelihood::Likelihood;
use crate::normal::{scalar_f32, Normal};
use crate::posterior::{get_proposal_params, ProposalParams};
use crate::prior::Prior;
use crate::proposal::InferenceNetwork;

/// Initial values of the toy model's parameters
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub init_prior_mean: f32,
    /// kept fixed during training
    pub prior_std: f32,
    pub init_obs_std: f32,
    pub init_mult: f32,
    pub init_bias: f32,
    pub init_proposal_std: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            init_prior_mean: 0.0,
            prior_std: 1.0,
            init_obs_std: 1.0,
            init_mult: 0.0,
            init_bias: 0.0,
            init_proposal_std: 1.0,
        }
    }
}

/// Scalar snapshot of all parameters, σ's already decoded from log-space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub prior_mean: f32,
    pub obs_std: f32,
    pub q_mult: f32,
    pub q_bias: f32,
    pub q_std: f32,
}

/// One-step Gaussian state-space model trained as an autoencoder
///
/// ```text
/// x ~ initial = N(μ₀, σ₀²)
/// y ~ emission(x) = N(x, σ²)
/// x ~ proposal(y) = N(a * y + b, s²)
/// ```
pub struct GaussianSsm {
    pub initial: Prior,
    pub emission: Likelihood,
    pub proposal: InferenceNetwork,
}

impl GaussianSsm {
    /// Build all three parts under `initial`, `emission` and `proposal`
    /// prefixes of the same `VarBuilder`.
    pub fn new(vb: VarBuilder, config: &ModelConfig) -> Result<Self> {
        let initial = Prior::new(vb.pp("initial"), config.init_prior_mean, config.prior_std)?;
        let emission = Likelihood::new(vb.pp("emission"), config.init_obs_std)?;
        let proposal = InferenceNetwork::new(
            vb.pp("proposal"),
            config.init_mult,
            config.init_bias,
            config.init_proposal_std,
        )?;
        Ok(Self {
            initial,
            emission,
            proposal,
        })
    }

    /// Monte Carlo ELBO per observation
    ///
    /// ELBO(y) = E_q[log p(x) + log p(y|x) - log q(x|y)], x ~ q(x|y)
    /// reparameterised so gradients reach every parameter.
    ///
    /// # Arguments
    /// * `observations` - time-ordered observations; `observations[0]` has shape (B,)
    /// * `num_particles` - number of draws K per observation
    ///
    /// # Returns
    /// ELBO estimates, shape (B,)
    pub fn elbo(&self, observations: &[Tensor], num_particles: usize) -> Result<Tensor> {
        let Some(y0) = observations.first() else {
            candle_core::bail!("elbo needs at least one observation");
        };

        let q = self.proposal.forward(observations)?;
        let x_kb = q.rsample(num_particles.max(1))?;

        let log_q = q.log_prob(&x_kb)?;
        let log_prior = self.initial.forward().log_prob(&x_kb)?;
        let log_lik = self.emission.forward(&x_kb)?.log_prob(y0)?;

        ((log_prior + log_lik)? - log_q)?.mean(0)
    }

    /// Exact posterior N(a* y₀ + b*, s*²) under the current prior and emission
    pub fn posterior(&self, observations: &[Tensor]) -> Result<Normal> {
        let Some(y0) = observations.first() else {
            candle_core::bail!("posterior needs at least one observation");
        };
        let opt = self.optimal_proposal()?;
        let loc = y0.affine(opt.multiplier as f64, opt.offset as f64)?;
        let scale = Tensor::new(opt.std, y0.device())?.to_dtype(y0.dtype())?;
        Ok(Normal::new(loc, scale))
    }

    /// Average KL(q(x|y) || p(x|y)) over the batch in `observations[0]`
    pub fn mean_posterior_kl(&self, observations: &[Tensor]) -> Result<f32> {
        let q = self.proposal.forward(observations)?;
        let p = self.posterior(observations)?;
        scalar_f32(&q.kl_divergence(&p)?.mean_all()?)
    }

    /// Closed-form optimal proposal at the current μ₀, σ₀ and σ
    pub fn optimal_proposal(&self) -> Result<ProposalParams<f32>> {
        Ok(get_proposal_params(
            self.initial.mean_value()?,
            self.initial.std_value()?,
            self.emission.std_value()?,
        ))
    }

    pub fn params(&self) -> Result<ModelParams> {
        Ok(ModelParams {
            prior_mean: self.initial.mean_value()?,
            obs_std: self.emission.std_value()?,
            q_mult: self.proposal.mult_value()?,
            q_bias: self.proposal.bias_value()?,
            q_std: self.proposal.std_value()?,
        })
    }
}
