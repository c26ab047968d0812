use anyhow::Result;
use clap::Parser;
use planit_fetch::{args::Args, logger};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();
    let args = Args::parse();

    planit_fetch::run(args).await
}
