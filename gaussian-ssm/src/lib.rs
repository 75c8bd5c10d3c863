pub mod cli;
pub mod likelihood;
pub mod model;
pub mod normal;
pub mod posterior;
pub mod prior;
pub mod proposal;
pub mod simulate;
pub mod train;
pub mod training_stats;

pub use likelihood::Likelihood;
pub use model::{GaussianSsm, ModelConfig, ModelParams};
pub use normal::Normal;
pub use posterior::{get_proposal_params, log_evidence, ProposalParams};
pub use prior::Prior;
pub use proposal::InferenceNetwork;
pub use training_stats::TrainingStats;

pub use candle_core;
pub use candle_nn;
