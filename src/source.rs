//! Loading the appointment table from a remote URL or a local CSV file

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::{Appointment, CsvRecord};

pub const DEFAULT_DATA_URL: &str =
    "https://cdn.jsdelivr.net/gh/rafael-albuquerque07/consultas-medicas@main/consultas.csv";

/// Anything that can produce the full appointment table.
pub trait DataSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Appointment>>> + Send;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Parse CSV text into appointments.
///
/// Any bad row or missing column fails the whole load.
pub fn parse_csv(text: &str) -> Result<Vec<Appointment>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let mut appointments = Vec::new();
    for (i, row) in reader.deserialize::<CsvRecord>().enumerate() {
        // header is line 1
        let line = i + 2;
        let record = row.with_context(|| format!("malformed CSV row at line {}", line))?;
        let appointment = record
            .to_appointment()
            .with_context(|| format!("invalid record at line {}", line))?;
        appointments.push(appointment);
    }

    debug!("Parsed {} appointment rows", appointments.len());
    Ok(appointments)
}

/// HTTP GET of a CSV document
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

impl DataSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Appointment>> {
        info!("Fetching appointments from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", self.url))?;

        let text = response
            .text()
            .await
            .context("failed to read response body")?;
        parse_csv(&text)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// CSV file on local disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    async fn fetch(&self) -> Result<Vec<Appointment>> {
        info!("Reading appointments from {:?}", self.path);
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        parse_csv(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Either configured source, chosen at startup
pub enum Source {
    Http(HttpSource),
    File(FileSource),
}

impl DataSource for Source {
    async fn fetch(&self) -> Result<Vec<Appointment>> {
        match self {
            Source::Http(s) => s.fetch().await,
            Source::File(s) => s.fetch().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::Http(s) => s.describe(),
            Source::File(s) => s.describe(),
        }
    }
}
