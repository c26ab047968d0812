pub mod api_client;
pub mod args;
pub mod auth;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logger;
pub mod output;
pub mod runner;
pub mod scheduler;

use anyhow::Result;
use std::time::Duration;

use crate::{
    args::{Args, Command},
    config::Config,
    jobs::FetchJob,
    runner::Runner,
    scheduler::{OverlapPolicy, Scheduler, SubprocessSpec},
};

pub async fn run(args: Args) -> Result<()> {
    // Credentials are checked before anything touches the network.
    let config = Config::new(&args)?;

    match &args.command {
        Command::Data { limit } => {
            log::info!("Fetching up to {limit} records per collection");
            Runner::new(config)?.run(&FetchJob::data_jobs(*limit)).await?;
            Ok(())
        }
        Command::ApiHelp => {
            Runner::new(config)?.run(&FetchJob::help_jobs()).await?;
            Ok(())
        }
        Command::Schedule {
            interval,
            skip_if_running,
        } => {
            let overlap = if *skip_if_running {
                OverlapPolicy::SkipIfRunning
            } else {
                OverlapPolicy::Allow
            };
            let subprocess = SubprocessSpec::help_fetch(&args)?;
            Scheduler::new(subprocess, Duration::from_secs(*interval), overlap)
                .run()
                .await
        }
    }
}
