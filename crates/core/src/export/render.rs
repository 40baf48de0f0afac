//! Export artifact rendering.

use thiserror::Error;

use crate::closure::ExportClosure;
use crate::timesheet::TimeEntry;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The encoder rejected a record.
    #[error("failed to encode export: {0}")]
    Encoding(String),
}

impl From<csv::Error> for RenderError {
    fn from(err: csv::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Turns a snapshot of time entries into an export artifact.
pub trait ExportRenderer: Send + Sync {
    /// MIME type of the artifact.
    fn content_type(&self) -> &'static str;

    /// File extension of the artifact, without the dot.
    fn extension(&self) -> &'static str;

    /// Render the entries of one closure revision.
    fn render(&self, closure: &ExportClosure, entries: &[TimeEntry]) -> Result<Vec<u8>, RenderError>;
}

const CSV_HEADER: [&str; 9] = [
    "entry_id",
    "date",
    "project_id",
    "cost_center_id",
    "engineer_id",
    "concept_id",
    "hours",
    "notes",
    "post_export_adjustment",
];

/// Renders one header row plus one row per entry, sorted by date then id.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl ExportRenderer for CsvRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, _closure: &ExportClosure, entries: &[TimeEntry]) -> Result<Vec<u8>, RenderError> {
        let mut sorted: Vec<&TimeEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| (e.date, e.id));

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for entry in sorted {
            writer.write_record([
                entry.id.to_string(),
                entry.date.format("%Y-%m-%d").to_string(),
                entry.project_id.to_string(),
                entry.cost_center_id.to_string(),
                entry.engineer_id.to_string(),
                entry.concept_id.to_string(),
                entry.hours.normalize().to_string(),
                entry.notes.clone(),
                entry.post_export_adjustment.to_string(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| RenderError::Encoding(e.to_string()))
    }
}
