//! Closed-form posterior of the linear-Gaussian model
//!
//! ```text
//! x ~ N(μ₀, σ₀²)
//! y | x ~ N(x, σ²)
//! x | y ~ N(a * y + b, s²)
//!
//! s² = 1 / (1/σ₀² + 1/σ²)
//! a  = s² / σ²
//! b  = s² * μ₀ / σ₀²
//! ```
//!
//! Used as ground truth for a learned `InferenceNetwork`.

use num_traits::Float;

/// Parameters of the exact posterior q*(x | y) = N(multiplier * y + offset, std²)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProposalParams<T> {
    pub multiplier: T,
    pub offset: T,
    pub std: T,
}

impl<T: Float> ProposalParams<T> {
    pub fn to_tuple(self) -> (T, T, T) {
        (self.multiplier, self.offset, self.std)
    }
}

/// Optimal proposal given the prior and the observation noise
///
/// * `prior_mean` - μ₀
/// * `prior_std` - σ₀
/// * `obs_std` - σ
///
/// No guard against zero scales: they give inf/NaN, as plain float
/// arithmetic does.
pub fn get_proposal_params<T: Float>(prior_mean: T, prior_std: T, obs_std: T) -> ProposalParams<T> {
    let prior_var = prior_std * prior_std;
    let obs_var = obs_std * obs_std;
    let posterior_var = T::one() / (T::one() / prior_var + T::one() / obs_var);
    ProposalParams {
        multiplier: posterior_var / obs_var,
        offset: posterior_var * prior_mean / prior_var,
        std: posterior_var.sqrt(),
    }
}

/// Exact log marginal likelihood log p(y) = log N(y; μ₀, σ₀² + σ²)
///
/// Every ELBO of this model is bounded above by this value.
pub fn log_evidence<T: Float>(prior_mean: T, prior_std: T, obs_std: T, y: T) -> T {
    let two = T::one() + T::one();
    let half = T::one() / two;
    let var = prior_std * prior_std + obs_std * obs_std;
    let diff = y - prior_mean;
    let two_pi = T::from(2.0 * std::f64::consts::PI).unwrap_or_else(T::nan);
    -half * ((two_pi * var).ln() + diff * diff / var)
}
