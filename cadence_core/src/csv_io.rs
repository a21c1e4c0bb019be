//! CSV export and import of period history.
//!
//! Exports are written to a temp file, synced, then renamed into place.
//! Imports skip malformed rows with a warning instead of failing the file.
//!
//! Symptoms share one column, separated by `;`. A literal `;` or `\` inside
//! a symptom is escaped with a backslash.

use crate::{Error, Flow, PeriodRecord, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

const SYMPTOM_SEPARATOR: char = ';';
const SYMPTOM_ESCAPE: char = '\\';

/// A row in the CSV file
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: String,
    start_date: String,
    end_date: Option<String>,
    flow: Option<String>,
    symptoms: Option<String>,
    logged_at: Option<String>,
}

impl From<&PeriodRecord> for CsvRow {
    fn from(record: &PeriodRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            start_date: record.start_date.to_string(),
            end_date: record.end_date.map(|d| d.to_string()),
            flow: record.flow.map(|f| f.to_string()),
            symptoms: if record.symptoms.is_empty() {
                None
            } else {
                Some(encode_symptoms(&record.symptoms))
            },
            logged_at: Some(record.logged_at.to_rfc3339()),
        }
    }
}

fn encode_symptoms(symptoms: &[String]) -> String {
    let mut encoded = String::new();
    for (i, symptom) in symptoms.iter().enumerate() {
        if i > 0 {
            encoded.push(SYMPTOM_SEPARATOR);
        }
        for c in symptom.chars() {
            if c == SYMPTOM_SEPARATOR || c == SYMPTOM_ESCAPE {
                encoded.push(SYMPTOM_ESCAPE);
            }
            encoded.push(c);
        }
    }
    encoded
}

fn decode_symptoms(value: &str) -> Vec<String> {
    let mut symptoms = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        match c {
            SYMPTOM_ESCAPE => {
                // A trailing lone escape is kept as-is
                current.push(chars.next().unwrap_or(SYMPTOM_ESCAPE));
            }
            SYMPTOM_SEPARATOR => symptoms.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    symptoms.push(current);

    symptoms
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidInput(format!("invalid {} '{}': {}", field, value, e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<CsvRow> for PeriodRecord {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(row.id.trim())
            .map_err(|e| Error::InvalidInput(format!("invalid id '{}': {}", row.id, e)))?;

        let start_date = parse_date("start_date", &row.start_date)?;
        let end_date = non_empty(row.end_date)
            .map(|v| parse_date("end_date", &v))
            .transpose()?;
        let flow = non_empty(row.flow).map(|v| v.parse::<Flow>()).transpose()?;

        let symptoms = non_empty(row.symptoms)
            .map(|v| decode_symptoms(&v))
            .unwrap_or_default();

        let logged_at = non_empty(row.logged_at)
            .and_then(|v| DateTime::parse_from_rfc3339(v.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(PeriodRecord {
            id,
            start_date,
            end_date,
            flow,
            symptoms,
            logged_at,
        })
    }
}

/// Write `periods` to a CSV file at `path`, sorted by start date
///
/// Returns the number of rows written.
pub fn export_csv(periods: &[PeriodRecord], path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut sorted: Vec<&PeriodRecord> = periods.iter().collect();
    sorted.sort_by_key(|p| p.start_date);

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_writer(temp.as_file());
        for record in &sorted {
            writer.serialize(CsvRow::from(*record))?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} periods to {:?}", sorted.len(), path);
    Ok(sorted.len())
}

/// Read period records from a CSV file written by [`export_csv`]
///
/// Rows that fail to parse are logged and skipped.
pub fn import_csv(path: &Path) -> Result<Vec<PeriodRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        match result {
            Ok(row) => match PeriodRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping CSV row at line {}: {}", line, e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row at line {}: {}", line, e);
            }
        }
    }

    tracing::info!("Imported {} periods from {:?}", records.len(), path);
    Ok(records)
}
