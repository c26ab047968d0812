use crate::args::Args;
use crate::config::{PASS_ENV, USER_ENV};
use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    path::PathBuf,
    process::{ExitStatus, Stdio},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    process::Command,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

/// Program and arguments for one isolated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub envs: Vec<(&'static str, String)>,
}

impl SubprocessSpec {
    /// Re-invoke this binary with `api-help`, forwarding the options the child needs.
    pub fn help_fetch(args: &Args) -> Result<Self> {
        let program = std::env::current_exe().context("failed to locate own executable")?;

        let mut child_args: Vec<OsString> = vec!["api-help".into()];
        if let Some(base_url) = &args.base_url {
            child_args.push("--base-url".into());
            child_args.push(base_url.into());
        }
        child_args.push("--output-dir".into());
        child_args.push(args.output_dir.clone().into_os_string());

        let envs = [(USER_ENV, &args.user), (PASS_ENV, &args.pass)]
            .into_iter()
            .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
            .collect();

        Ok(Self {
            program,
            args: child_args,
            envs,
        })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (*k, v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Start a new run even while an earlier one is still going.
    Allow,
    SkipIfRunning,
}

#[derive(Debug)]
pub struct Scheduler {
    subprocess: SubprocessSpec,
    interval: Duration,
    overlap: OverlapPolicy,
    in_flight: Arc<AtomicUsize>,
    runs: u64,
}

impl Scheduler {
    pub fn new(subprocess: SubprocessSpec, interval: Duration, overlap: OverlapPolicy) -> Self {
        Self {
            subprocess,
            interval,
            overlap,
            in_flight: Arc::new(AtomicUsize::new(0)),
            runs: 0,
        }
    }

    /// Run immediately, then once per interval. Only returns if the process is killed.
    pub async fn run(mut self) -> Result<()> {
        log::info!(
            "Scheduling {} every {}s",
            self.subprocess.program.display(),
            self.interval.as_secs()
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // The handle is dropped; the run reports on its own.
            let _ = self.tick();
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawn one run unless the overlap policy says to skip it.
    pub fn tick(&mut self) -> Option<JoinHandle<Option<ExitStatus>>> {
        if self.overlap == OverlapPolicy::SkipIfRunning && self.in_flight() > 0 {
            log::warn!("Previous run still in progress, skipping this tick");
            return None;
        }

        self.runs += 1;
        let run = self.runs;

        let mut child = match self.subprocess.command().spawn() {
            Ok(child) => child,
            Err(err) => {
                log::error!(
                    "Run #{run}: failed to start {}: {err}",
                    self.subprocess.program.display()
                );
                return None;
            }
        };

        log::info!("Run #{run}: started (pid {})", child.id().unwrap_or_default());
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);

        Some(tokio::spawn(async move {
            let status = child.wait().await;
            in_flight.fetch_sub(1, Ordering::SeqCst);

            match status {
                Ok(status) if status.success() => {
                    crate::success!("Run #{run}: finished with exit code 0");
                    Some(status)
                }
                Ok(status) => {
                    match status.code() {
                        Some(code) => log::error!("Run #{run}: exited with code {code}"),
                        None => log::error!("Run #{run}: terminated by signal"),
                    }
                    Some(status)
                }
                Err(err) => {
                    log::error!("Run #{run}: failed to wait for child: {err}");
                    None
                }
            }
        }))
    }
}
