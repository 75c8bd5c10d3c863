use candle_core::{Device, Tensor};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

pub struct SimArgs {
    pub num_data: usize,
    pub prior_mean: f32,
    pub prior_std: f32,
    pub obs_std: f32,
    pub rseed: Option<u64>,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            num_data: 1000,
            prior_mean: 0.0,
            prior_std: 1.0,
            obs_std: 1.0,
            rseed: None,
        }
    }
}

pub struct SimOut {
    /// true latent states, shape (n,)
    pub latent: Tensor,
    /// observations, shape (n,)
    pub observations: Tensor,
}

/// Simulate data from the toy model
///
/// ```text
/// x(i) ~ N(prior_mean, prior_std²)
/// y(i) ~ N(x(i), obs_std²)
/// ```
///
pub fn simulate_observations(args: &SimArgs, device: &Device) -> anyhow::Result<SimOut> {
    let nn = args.num_data;
    let rseed = args.rseed.unwrap_or(42);

    let mut rng = rand::rngs::StdRng::seed_from_u64(rseed);

    let rnorm_x = Normal::new(args.prior_mean, args.prior_std)?;
    let rnorm_noise = Normal::new(0_f32, args.obs_std)?;

    let latent: Vec<f32> = (0..nn).map(|_| rnorm_x.sample(&mut rng)).collect();
    let observations: Vec<f32> = latent
        .iter()
        .map(|&x| x + rnorm_noise.sample(&mut rng))
        .collect();

    Ok(SimOut {
        latent: Tensor::from_vec(latent, nn, device)?,
        observations: Tensor::from_vec(observations, nn, device)?,
    })
}
