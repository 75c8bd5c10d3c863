use anyhow::Result;
use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use clap::Args;
use log::info;

use crate::model::{GaussianSsm, ModelConfig};
use crate::simulate::{simulate_observations, SimArgs};
use crate::train::{train, TrainConfig};

#[derive(Args, Debug, Clone)]
pub struct ToyArgs {
    /// Number of simulated observations
    #[arg(long, short = 'n', default_value_t = 1000)]
    pub num_data: usize,

    /// True prior mean used for simulation
    #[arg(long, default_value_t = 0.0)]
    pub prior_mean: f32,

    /// Prior standard deviation (simulation and model; not learned)
    #[arg(long, default_value_t = 1.0)]
    pub prior_std: f32,

    /// True observation noise used for simulation
    #[arg(long, default_value_t = 1.0)]
    pub obs_std: f32,

    /// Initial prior mean of the model
    #[arg(long, default_value_t = 0.0)]
    pub init_prior_mean: f32,

    /// Initial observation noise of the model
    #[arg(long, default_value_t = 1.0)]
    pub init_obs_std: f32,

    /// Initial proposal slope
    #[arg(long, default_value_t = 0.0)]
    pub init_mult: f32,

    /// Initial proposal intercept
    #[arg(long, default_value_t = 0.0)]
    pub init_bias: f32,

    /// Initial proposal standard deviation
    #[arg(long, default_value_t = 1.0)]
    pub init_proposal_std: f32,

    /// Learning rate
    #[arg(long, default_value_t = 1e-2)]
    pub learning_rate: f32,

    /// Number of training iterations
    #[arg(long, short = 'i', default_value_t = 1000)]
    pub iters: usize,

    /// Monte Carlo draws per observation
    #[arg(long, default_value_t = 1)]
    pub particles: usize,

    /// Print the ELBO every this many iterations
    #[arg(long, default_value_t = 100)]
    pub logging_interval: usize,

    /// Random seed for simulation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub show_progress: bool,

    /// Verbose logging
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

pub fn run(args: &ToyArgs) -> Result<()> {
    let device = Device::Cpu;

    let sim = simulate_observations(
        &SimArgs {
            num_data: args.num_data,
            prior_mean: args.prior_mean,
            prior_std: args.prior_std,
            obs_std: args.obs_std,
            rseed: Some(args.seed),
        },
        &device,
    )?;
    info!("Simulated {} observations", args.num_data);

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

    let model = GaussianSsm::new(
        vb,
        &ModelConfig {
            init_prior_mean: args.init_prior_mean,
            prior_std: args.prior_std,
            init_obs_std: args.init_obs_std,
            init_mult: args.init_mult,
            init_bias: args.init_bias,
            init_proposal_std: args.init_proposal_std,
        },
    )?;

    let train_config = TrainConfig {
        learning_rate: args.learning_rate,
        num_iterations: args.iters,
        num_particles: args.particles,
        logging_interval: args.logging_interval,
        device: device.clone(),
        show_progress: args.show_progress,
        verbose: args.verbose,
    };

    let observations = [sim.observations];
    let stats = train(&model, &varmap, &observations, &train_config)?;

    let learned = model.params()?;
    let optimal = model.optimal_proposal()?;

    info!(
        "prior mean: {:.4} (true {:.4}), obs std: {:.4} (true {:.4})",
        learned.prior_mean, args.prior_mean, learned.obs_std, args.obs_std
    );
    info!(
        "proposal mult: {:.4} vs {:.4}, bias: {:.4} vs {:.4}, std: {:.4} vs {:.4}",
        learned.q_mult,
        optimal.multiplier,
        learned.q_bias,
        optimal.offset,
        learned.q_std,
        optimal.std
    );
    info!(
        "KL(q || posterior): {:.6}, final ELBO: {:?}",
        model.mean_posterior_kl(&observations)?,
        stats.last_elbo()
    );

    Ok(())
}
