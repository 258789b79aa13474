mod cli;
mod client;
mod cookie;
mod model;
mod page;
mod session;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}
