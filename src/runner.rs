use crate::api_client::ApiClient;
use crate::auth::Authenticator;
use crate::config::Config;
use crate::jobs::{FetchJob, JobOutcome};
use crate::output::OutputWriter;
use anyhow::Result;
use futures_util::future::join_all;

#[derive(Debug)]
pub struct Runner {
    client: ApiClient,
    writer: OutputWriter,
}

impl Runner {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(&config)?,
            writer: OutputWriter::new(config.output_dir.clone()),
        })
    }

    /// Fetch one token, then run every job to completion.
    ///
    /// Only token acquisition is fatal; job failures end up in the [`Summary`].
    pub async fn run(&self, jobs: &[FetchJob]) -> Result<Summary> {
        let config = self.client.config();
        let token = Authenticator::new(config, self.client.http().clone())
            .get_token()
            .await?;

        let outcomes = join_all(jobs.iter().map(|job| {
            job.run(&self.client, &config.endpoints, &token, &self.writer)
        }))
        .await;

        let summary = Summary { outcomes };
        summary.log();

        Ok(summary)
    }
}

#[derive(Debug)]
pub struct Summary {
    pub outcomes: Vec<JobOutcome>,
}

impl Summary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    fn log(&self) {
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(saved) => crate::success!("{}: ok ({})", outcome.kind, saved.path.display()),
                Err(err) => log::warn!("{}: failed ({err})", outcome.kind),
            }
        }

        let line = format!(
            "Finished: {} succeeded, {} failed",
            self.succeeded(),
            self.failed()
        );
        if self.failed() == 0 {
            crate::success!("{line}");
        } else {
            log::warn!("{line}");
        }
    }
}
