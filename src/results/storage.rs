//! Results storage and retrieval
//!
//! Persists finished runs as JSON and exports them as JSON or CSV.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{ResultSet, TestRecord};

/// A finished run as written to disk
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    /// Unique run ID
    pub id: String,

    /// When the first test was admitted
    pub started_at: DateTime<Utc>,

    /// When the last test completed
    pub completed_at: DateTime<Utc>,

    /// Concurrency used, as displayed at startup
    pub jobs: String,

    /// Sorted result buckets
    pub results: ResultSet,

    /// Environment info
    pub environment: EnvironmentInfo,
}

/// Where a run happened
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub os: String,
    pub arch: String,
    pub engine: String,
    pub tool_version: String,
}

impl EnvironmentInfo {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            engine: engine.into(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StoredRun {
    pub fn new(
        started_at: DateTime<Utc>,
        jobs: impl Into<String>,
        results: ResultSet,
        environment: EnvironmentInfo,
    ) -> Self {
        Self {
            id: generate_run_id(started_at),
            started_at,
            completed_at: Utc::now(),
            jobs: jobs.into(),
            results,
            environment,
        }
    }

    pub fn passed(&self) -> bool {
        !self.results.has_failures()
    }
}

/// Generate unique run ID
fn generate_run_id(started_at: DateTime<Utc>) -> String {
    let timestamp = started_at.format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Brief run information
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub failed: usize,
    pub errored: usize,
}

/// Export format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Results storage manager
pub struct ResultsStorage {
    base_dir: PathBuf,
}

impl ResultsStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Storage under the platform data directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gui-tester")
            .join("results");
        Self::new(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.base_dir.join(format!("{run_id}.json"))
    }

    /// Save a run
    pub fn save(&self, run: &StoredRun) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create results directory: {}", self.base_dir.display())
        })?;

        let path = self.run_path(&run.id);
        let file = File::create(&path).context("Failed to create results file")?;
        serde_json::to_writer_pretty(BufWriter::new(file), run)
            .context("Failed to write results")?;

        info!("Saved run results to {}", path.display());
        Ok(path)
    }

    /// Load a run by ID
    pub fn load(&self, run_id: &str) -> Result<StoredRun> {
        load_from_path(&self.run_path(run_id))
    }

    /// All stored runs, newest first
    pub fn load_all(&self) -> Result<Vec<StoredRun>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match load_from_path(&path) {
                    Ok(run) => runs.push(run),
                    Err(e) => debug!("Failed to load {}: {:#}", path.display(), e),
                }
            }
        }

        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }

    pub fn list_runs(&self) -> Result<Vec<RunInfo>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|run| RunInfo {
                total: run.results.total(),
                failed: run.results.failed.len(),
                errored: run.results.errored.len(),
                id: run.id,
                started_at: run.started_at,
            })
            .collect())
    }

    pub fn latest(&self) -> Result<Option<StoredRun>> {
        Ok(self.load_all()?.into_iter().next())
    }
}

fn load_from_path(path: &Path) -> Result<StoredRun> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open results file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).context("Failed to parse results")
}

/// Export a run to `path`, picking the format from its extension
pub fn export(run: &StoredRun, path: &Path) -> Result<()> {
    let format = ExportFormat::from_extension(path).with_context(|| {
        format!(
            "Cannot export to {}: use a .json or .csv extension",
            path.display()
        )
    })?;

    match format {
        ExportFormat::Json => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), run)?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;

            writer.write_record(["test", "status", "failures", "duration_ms", "output"])?;
            for record in run.results.iter() {
                writer.write_record(csv_row(record))?;
            }
            writer.flush()?;
        }
    }

    info!("Exported results to {}", path.display());
    Ok(())
}

fn csv_row(record: &TestRecord) -> [String; 5] {
    let failures = match &record.outcome {
        crate::models::Outcome::Failed { failures, .. } => failures.to_string(),
        _ => String::new(),
    };
    [
        record.item.to_string(),
        record.outcome.kind().to_string(),
        failures,
        record.duration_ms.to_string(),
        record.outcome.text().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EngineReport, Outcome, WorkItem};
    use tempfile::tempdir;

    fn sample_run() -> StoredRun {
        let mut results = ResultSet::new();
        results.record(TestRecord::new(
            WorkItem::new("a.goml"),
            Outcome::from_report(EngineReport::passed("ok")),
            3,
        ));
        results.record(TestRecord::new(
            WorkItem::new("b.goml"),
            Outcome::from_report(EngineReport::new("2, \"quoted\" failures", 2)),
            4,
        ));
        StoredRun::new(Utc::now(), "2", results, EnvironmentInfo::new("browser-ui-test"))
    }

    #[test]
    fn test_generate_run_id() {
        let id = generate_run_id(Utc::now());
        assert_eq!(id.len(), "20260101_120000_0000".len());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path().join("results"));
        let run = sample_run();

        let path = storage.save(&run).unwrap();
        assert!(path.exists());
        assert_eq!(storage.load(&run.id).unwrap(), run);

        let listed = storage.list_runs().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total, 2);
        assert_eq!(listed[0].failed, 1);
        assert_eq!(storage.latest().unwrap().map(|r| r.id), Some(run.id));
    }

    #[test]
    fn test_empty_storage() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path().join("missing"));
        assert!(storage.list_runs().unwrap().is_empty());
        assert!(storage.latest().unwrap().is_none());
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.csv");
        export(&sample_run(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "b.goml");
        assert_eq!(&rows[1][1], "FAIL");
        assert_eq!(&rows[1][2], "2");
        assert_eq!(&rows[1][4], "2, \"quoted\" failures");
    }

    #[test]
    fn test_export_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        assert!(export(&sample_run(), &dir.path().join("run.xml")).is_err());
    }

    #[test]
    fn test_export_format_from_extension() {
        assert_eq!(
            ExportFormat::from_extension(Path::new("out.JSON")),
            Some(ExportFormat::Json)
        );
        assert_eq!(
            ExportFormat::from_extension(Path::new("out.csv")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(ExportFormat::from_extension(Path::new("out")), None);
    }
}
