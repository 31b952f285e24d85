use clap::Parser;
use pmp_model_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Discover => cli::registry::discover().await,
        Command::Validate => cli::registry::validate().await,
        Command::List(args) => cli::registry::list(args).await,
        Command::Activate(args) => cli::registry::activate(args).await,
        Command::Inspect(args) => cli::inspect::run(args).await,
    }
}
