use std::io::Write;

use candle_core::Tensor;
use log::debug;

use crate::model::GaussianSsm;
use crate::normal::scalar_f32;

pub const DEFAULT_LOGGING_INTERVAL: usize = 100;

/// Per-iteration trace of the toy model's parameters and ELBO
///
/// Every call to [`TrainingStats::record`] appends exactly one value to
/// each of the seven histories, so they always have the same length.
#[derive(Debug, Clone)]
pub struct TrainingStats {
    pub prior_mean_history: Vec<f32>,
    pub obs_std_history: Vec<f32>,
    pub q_mult_history: Vec<f32>,
    pub q_bias_history: Vec<f32>,
    pub q_std_history: Vec<f32>,
    pub iteration_idx_history: Vec<usize>,
    pub elbo_history: Vec<f32>,
    pub logging_interval: usize,
}

impl Default for TrainingStats {
    fn default() -> Self {
        Self::new(DEFAULT_LOGGING_INTERVAL)
    }
}

impl TrainingStats {
    /// * `logging_interval` - print progress when the iteration index is a
    ///   multiple of this (0 is treated as 1)
    pub fn new(logging_interval: usize) -> Self {
        Self {
            prior_mean_history: vec![],
            obs_std_history: vec![],
            q_mult_history: vec![],
            q_bias_history: vec![],
            q_std_history: vec![],
            iteration_idx_history: vec![],
            elbo_history: vec![],
            logging_interval: logging_interval.max(1),
        }
    }

    /// Record one training iteration, printing progress to stdout
    ///
    /// * `iteration_idx` - iteration index within the epoch
    /// * `elbo` - per-sample ELBO estimates; their mean is stored
    /// * `model` - current model, read after the optimizer step
    pub fn record(
        &mut self,
        iteration_idx: usize,
        elbo: &Tensor,
        model: &GaussianSsm,
    ) -> anyhow::Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.record_to(iteration_idx, elbo, model, &mut handle)
    }

    /// Same as [`TrainingStats::record`], writing the progress line to `out`
    pub fn record_to<W: Write>(
        &mut self,
        iteration_idx: usize,
        elbo: &Tensor,
        model: &GaussianSsm,
        out: &mut W,
    ) -> anyhow::Result<()> {
        // read before pushing; histories must keep equal lengths
        let params = model.params()?;
        let elbo_mean = scalar_f32(&elbo.mean_all()?)?;

        self.prior_mean_history.push(params.prior_mean);
        self.obs_std_history.push(params.obs_std);
        self.q_mult_history.push(params.q_mult);
        self.q_bias_history.push(params.q_bias);
        self.q_std_history.push(params.q_std);
        self.elbo_history.push(elbo_mean);
        self.iteration_idx_history.push(iteration_idx);

        debug!("[{}] {:?}", iteration_idx, params);

        if iteration_idx % self.logging_interval == 0 {
            writeln!(out, "Iteration: {} - Elbo: {}", iteration_idx, elbo_mean)?;
        }
        Ok(())
    }

    /// Number of recorded iterations
    pub fn len(&self) -> usize {
        self.iteration_idx_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iteration_idx_history.is_empty()
    }

    pub fn last_elbo(&self) -> Option<f32> {
        self.elbo_history.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;
    use candle_core::{DType, Device};
    use candle_nn::{VarBuilder, VarMap};

    fn toy_model(varmap: &VarMap) -> candle_core::Result<GaussianSsm> {
        let vb = VarBuilder::from_varmap(varmap, DType::F32, &Device::Cpu);
        GaussianSsm::new(vb, &ModelConfig::default())
    }

    #[test]
    fn test_histories_stay_aligned() -> anyhow::Result<()> {
        let varmap = VarMap::new();
        let model = toy_model(&varmap)?;
        let mut stats = TrainingStats::new(100);
        let mut sink = Vec::new();

        let n = 17;
        for i in 0..n {
            let elbo = Tensor::new(&[-1.0_f32, -3.0], &Device::Cpu)?;
            stats.record_to(i, &elbo, &model, &mut sink)?;
        }

        assert_eq!(stats.len(), n);
        assert_eq!(stats.prior_mean_history.len(), n);
        assert_eq!(stats.obs_std_history.len(), n);
        assert_eq!(stats.q_mult_history.len(), n);
        assert_eq!(stats.q_bias_history.len(), n);
        assert_eq!(stats.q_std_history.len(), n);
        assert_eq!(stats.elbo_history.len(), n);
        assert_eq!(stats.iteration_idx_history, (0..n).collect::<Vec<_>>());
        assert_eq!(stats.last_elbo(), Some(-2.0));
        Ok(())
    }

    #[test]
    fn test_logging_interval() -> anyhow::Result<()> {
        let varmap = VarMap::new();
        let model = toy_model(&varmap)?;
        let mut stats = TrainingStats::new(100);
        let mut sink = Vec::new();

        let elbo = Tensor::new(&[-0.5_f32], &Device::Cpu)?;
        for i in 0..250 {
            stats.record_to(i, &elbo, &model, &mut sink)?;
        }

        let printed = String::from_utf8(sink)?;
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Iteration: 0 - Elbo: -0.5",
                "Iteration: 100 - Elbo: -0.5",
                "Iteration: 200 - Elbo: -0.5",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_records_decoded_scales() -> anyhow::Result<()> {
        let varmap = VarMap::new();
        let model = toy_model(&varmap)?;
        let mut stats = TrainingStats::default();
        let elbo = Tensor::new(&[0.0_f32], &Device::Cpu)?;
        stats.record_to(1, &elbo, &model, &mut std::io::sink())?;

        // log-std of 0 decodes to std 1
        assert!((stats.obs_std_history[0] - 1.0).abs() < 1e-6);
        assert!((stats.q_std_history[0] - 1.0).abs() < 1e-6);
        assert_eq!(stats.q_mult_history[0], 0.0);
        Ok(())
    }
}
