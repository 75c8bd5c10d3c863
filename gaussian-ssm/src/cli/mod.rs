pub mod toy;

use clap::{Parser, Subcommand};

pub use toy::ToyArgs;

#[derive(Parser)]
#[command(name = "gaussian-ssm")]
#[command(about = "Toy linear-Gaussian state-space model for checking variational inference")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate data, fit the proposal and compare it with the exact posterior
    Toy(ToyArgs),
}
