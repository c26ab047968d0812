use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::{io::ErrorKind, path::PathBuf};
use tokio::{fs, io::AsyncWriteExt};

/// ISO 8601 with `:` and `.` swapped for `-` so it is safe in file names.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `payload` as pretty JSON to a new `<kind>-<timestamp>.json` file.
    pub async fn write(&self, kind: &str, payload: &Value) -> Result<PathBuf> {
        self.write_at(kind, payload, Utc::now()).await
    }

    async fn write_at(&self, kind: &str, payload: &Value, at: DateTime<Utc>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let mut contents = serde_json::to_vec_pretty(payload)?;
        contents.push(b'\n');

        let stem = format!("{kind}-{}", at.format(TIMESTAMP_FORMAT));
        let mut attempt = 0u32;
        loop {
            let path = self.dir.join(file_name(&stem, attempt));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&contents)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to create {}", path.display()))
                }
            }
        }
    }
}

fn file_name(stem: &str, attempt: u32) -> String {
    match attempt {
        0 => format!("{stem}.json"),
        n => format!("{stem}-{n}.json"),
    }
}
