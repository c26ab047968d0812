use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 1000;
pub const DEFAULT_INTERVAL_SECS: u64 = 15 * 60;

/// Fetch accessplanit course data and API help into timestamped JSON files.
#[derive(Parser, Debug)]
#[command(name = "planit-fetch", version, about)]
pub struct Args {
    /// API host, e.g. https://example.accessplanit.com
    #[arg(short, long, global = true, env = "ACCESS_PLANIT_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        env = "ACCESS_PLANIT_USER",
        hide_env_values = true
    )]
    pub user: Option<String>,

    /// Password, or a path to a file containing it
    #[arg(
        short,
        long,
        global = true,
        env = "ACCESS_PLANIT_PASS",
        hide_env_values = true
    )]
    pub pass: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        default_value = "output",
        env = "ACCESS_PLANIT_OUTPUT_DIR"
    )]
    pub output_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch course templates and course dates once
    Data {
        /// Maximum number of records per collection
        #[arg(short, long, default_value_t = DEFAULT_LIMIT, value_parser = parse_limit)]
        limit: u32,
    },

    /// Fetch the courseDate and courseTemplate API help once
    ApiHelp,

    /// Run `api-help` in a child process now and then on every interval
    Schedule {
        /// Seconds between runs
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_INTERVAL_SECS,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval: u64,

        /// Skip a tick while the previous run is still going
        #[arg(long)]
        skip_if_running: bool,
    },
}

impl Args {
    pub fn parse_secret(input: &str) -> Result<String> {
        if Path::new(input).exists() {
            Ok(fs::read_to_string(input)?.trim().to_string())
        } else {
            Ok(input.to_string())
        }
    }
}

/// A malformed limit is rejected here rather than forwarded to the API.
pub fn parse_limit(input: &str) -> Result<u32, String> {
    let value: u32 = input
        .trim()
        .parse()
        .map_err(|_| format!("`{input}` is not a whole number"))?;

    if !(1..=MAX_LIMIT).contains(&value) {
        return Err(format!("must be between 1 and {MAX_LIMIT}, got {value}"));
    }

    Ok(value)
}
