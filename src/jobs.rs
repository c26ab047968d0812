use crate::api_client::ApiClient;
use crate::auth::Token;
use crate::config::Endpoints;
use crate::output::OutputWriter;
use anyhow::Result;
use serde_json::Value;
use std::{fmt, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    CourseTemplates,
    CourseDates,
    CourseDateHelp,
    CourseTemplateHelp,
}

impl JobKind {
    /// Prefix of the output file name.
    pub fn slug(&self) -> &'static str {
        match self {
            JobKind::CourseTemplates => "course-templates",
            JobKind::CourseDates => "course-dates",
            JobKind::CourseDateHelp => "help-course-date",
            JobKind::CourseTemplateHelp => "help-course-template",
        }
    }

    pub fn endpoint<'a>(&self, endpoints: &'a Endpoints) -> &'a str {
        match self {
            JobKind::CourseTemplates => &endpoints.course_templates,
            JobKind::CourseDates => &endpoints.course_dates,
            JobKind::CourseDateHelp => &endpoints.course_date_help,
            JobKind::CourseTemplateHelp => &endpoints.course_template_help,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::CourseTemplates => "course templates",
            JobKind::CourseDates => "course dates",
            JobKind::CourseDateHelp => "courseDate API help",
            JobKind::CourseTemplateHelp => "courseTemplate API help",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub kind: JobKind,
    pub params: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResult {
    pub path: PathBuf,
    pub records: Option<usize>,
}

/// Settled result of one job. A failure here never affects sibling jobs.
#[derive(Debug)]
pub struct JobOutcome {
    pub kind: JobKind,
    pub result: Result<SavedResult>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl FetchJob {
    pub fn data_jobs(limit: u32) -> Vec<FetchJob> {
        vec![
            FetchJob {
                kind: JobKind::CourseTemplates,
                params: vec![("top", limit.to_string()), ("orderby", "Name asc".into())],
            },
            FetchJob {
                kind: JobKind::CourseDates,
                params: vec![
                    ("top", limit.to_string()),
                    ("orderby", "StartDate asc".into()),
                ],
            },
        ]
    }

    pub fn help_jobs() -> Vec<FetchJob> {
        [JobKind::CourseDateHelp, JobKind::CourseTemplateHelp]
            .into_iter()
            .map(|kind| FetchJob {
                kind,
                params: Vec::new(),
            })
            .collect()
    }

    pub async fn run(
        &self,
        client: &ApiClient,
        endpoints: &Endpoints,
        token: &Token,
        writer: &OutputWriter,
    ) -> JobOutcome {
        let result = self.fetch_and_save(client, endpoints, token, writer).await;
        if let Err(err) = &result {
            log::error!("Fetching {} failed: {err:#}", self.kind);
        }

        JobOutcome {
            kind: self.kind,
            result,
        }
    }

    async fn fetch_and_save(
        &self,
        client: &ApiClient,
        endpoints: &Endpoints,
        token: &Token,
        writer: &OutputWriter,
    ) -> Result<SavedResult> {
        log::info!("Fetching {}...", self.kind);

        let payload = client
            .request(self.kind.endpoint(endpoints), token, &self.params)
            .await?;

        let records = record_count(&payload);
        if let Some(count) = records {
            log::info!("Retrieved {count} {}", self.kind);
        }

        let path = writer.write(self.kind.slug(), &payload).await?;
        crate::success!("Saved {} to {}", self.kind, path.display());

        Ok(SavedResult { path, records })
    }
}

/// Size of the `results` list, or of the payload itself when it is a bare array.
pub fn record_count(payload: &Value) -> Option<usize> {
    payload
        .get("results")
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
        .map(Vec::len)
}
