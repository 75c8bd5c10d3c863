use std::io::Write;

use candle_core::Tensor;
use candle_nn::{AdamW, Optimizer, VarMap};
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::info;

use crate::model::GaussianSsm;
use crate::training_stats::{TrainingStats, DEFAULT_LOGGING_INTERVAL};

pub struct TrainConfig {
    pub learning_rate: f32,
    pub num_iterations: usize,
    /// Monte Carlo draws per observation in each ELBO estimate
    pub num_particles: usize,
    pub logging_interval: usize,
    pub device: candle_core::Device,
    pub show_progress: bool,
    pub verbose: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            num_iterations: 1000,
            num_particles: 1,
            logging_interval: DEFAULT_LOGGING_INTERVAL,
            device: candle_core::Device::Cpu,
            show_progress: false,
            verbose: false,
        }
    }
}

/// Fit all model parameters by maximizing the ELBO with AdamW
///
/// * `model` - toy model whose parameters live in `variable_map`
/// * `variable_map` - all trainable variables
/// * `observations` - time-ordered observations, `observations[0]` of shape (B,)
/// * `train_config` - training configuration
///
/// Progress lines go to stdout every `logging_interval` iterations.
pub fn train(
    model: &GaussianSsm,
    variable_map: &VarMap,
    observations: &[Tensor],
    train_config: &TrainConfig,
) -> anyhow::Result<TrainingStats> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    train_to(model, variable_map, observations, train_config, &mut handle)
}

/// Same as [`train`], writing the progress lines to `out`
pub fn train_to<W: Write>(
    model: &GaussianSsm,
    variable_map: &VarMap,
    observations: &[Tensor],
    train_config: &TrainConfig,
    out: &mut W,
) -> anyhow::Result<TrainingStats> {
    if observations.is_empty() {
        anyhow::bail!("no observations to train on");
    }

    let observations = observations
        .iter()
        .map(|y| y.to_device(&train_config.device))
        .collect::<candle_core::Result<Vec<_>>>()?;

    let mut adam = AdamW::new_lr(
        variable_map.all_vars(),
        train_config.learning_rate.into(),
    )?;

    let pb = ProgressBar::new(train_config.num_iterations as u64);

    if !train_config.show_progress || train_config.verbose {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let mut stats = TrainingStats::new(train_config.logging_interval);

    info!("Training for {} iterations", train_config.num_iterations);

    for iter in 0..train_config.num_iterations {
        let elbo = model.elbo(&observations, train_config.num_particles)?;
        let loss = elbo.mean_all()?.neg()?;
        adam.backward_step(&loss)?;

        stats.record_to(iter, &elbo, model, out)?;
        pb.inc(1);

        if train_config.verbose && iter % stats.logging_interval == 0 {
            info!(
                "[{}] ELBO: {}",
                iter + 1,
                stats.last_elbo().ok_or(anyhow::anyhow!("elbo"))?
            );
        }
    }

    pb.finish_and_clear();
    Ok(stats)
}
