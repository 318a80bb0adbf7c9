//! CSV history log
//!
//! One row per computed report so levels can be charted over a session.
//! Undefined levels are written as empty fields.

use std::fs::{self, OpenOptions};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{GexError, GexResult};
use crate::levels::GexReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub underlying: String,
    pub spot: f64,
    pub net_gex_millions: f64,
    pub zero_gamma: Option<f64>,
    pub put_wall: Option<f64>,
    pub call_wall: Option<f64>,
}

impl HistoryRecord {
    pub fn from_report(report: &GexReport) -> Self {
        Self {
            timestamp: report.timestamp,
            underlying: report.underlying.clone(),
            spot: report.spot,
            net_gex_millions: report.net_gex_millions(),
            zero_gamma: report.levels.zero_gamma,
            put_wall: report.levels.put_wall,
            call_wall: report.levels.call_wall,
        }
    }
}

fn csv_error(e: csv::Error) -> GexError {
    GexError::Serialization(e.to_string())
}

/// Append one report; the header goes in only when the file is new or empty
pub fn append_history(path: impl AsRef<Path>, report: &GexReport) -> GexResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer
        .serialize(HistoryRecord::from_report(report))
        .map_err(csv_error)?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), "history row appended");
    Ok(())
}

pub fn read_history(path: impl AsRef<Path>) -> GexResult<Vec<HistoryRecord>> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<HistoryRecord>, _>>()
        .map_err(csv_error)
}
