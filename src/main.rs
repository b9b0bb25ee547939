use clap::Parser;
use polis_geocoder::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve(args) => cli::resolve::run(args).await,
        Command::Batch(args) => cli::batch::run(args).await,
        Command::Lookup(args) => cli::lookup::run(args).await,
        Command::Normalize(args) => cli::normalize::run(args).await,
        Command::Reprocess(args) => cli::reprocess::run(args).await,
    }
}
