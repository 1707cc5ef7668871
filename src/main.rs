use clap::Parser;
use pollen_mapper::cli::{run, Cli};
use pollen_mapper::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
