use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::quiz::Score;

/// Column names of `results.csv`, shared with logs written by earlier
/// versions of the tool
pub const HEADER: [&str; 6] = [
    "arquivo_md",
    "data",
    "hora",
    "acertos",
    "erros",
    "total_perguntas",
];

/// One finished quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "arquivo_md")]
    pub source: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "hora")]
    pub time: NaiveTime,
    #[serde(rename = "acertos")]
    pub correct: u32,
    #[serde(rename = "erros")]
    pub wrong: u32,
    #[serde(rename = "total_perguntas")]
    pub total: u32,
}

impl ResultRecord {
    pub fn new(source: &str, at: NaiveDateTime, score: Score) -> Self {
        Self {
            source: source.to_string(),
            date: at.date(),
            // Whole seconds keep the column in HH:MM:SS form
            time: at.time().with_nanosecond(0).unwrap_or(at.time()),
            correct: score.correct as u32,
            wrong: score.wrong as u32,
            total: score.total as u32,
        }
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

/// Append-only `results.csv` of an exam
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write a fresh file holding only the header row
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create results file: {:?}", path))?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self::new(path))
    }

    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open results file: {:?}", self.path))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(record)?;
        writer.flush()?;

        tracing::debug!("Appended result for '{}' to {:?}", record.source, self.path);
        Ok(())
    }

    /// All readable rows; a missing file yields no rows and malformed rows
    /// are skipped
    pub fn load(&self) -> Result<Vec<ResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Failed to read results file: {:?}", self.path))?;

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<ResultRecord>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping row {} of {:?}: {}", i + 2, self.path, e),
            }
        }

        Ok(records)
    }
}
