use anyhow::Result;
use clap::Parser;
use gaussian_ssm::cli::{toy, Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Toy(args) => {
            toy::run(args)?;
        }
    }

    Ok(())
}
