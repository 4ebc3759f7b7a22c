use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::dashboard::{PlayerSnapshot, SquadOverview};
use crate::error::ExportError;

pub mod json;
pub mod text;

/// Output formats for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
    Table,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            "table" => Ok(ExportFormat::Table),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Render one player's snapshot
pub fn render_snapshot(snapshot: &PlayerSnapshot, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => json::to_json_string(snapshot),
        ExportFormat::Text => text::snapshot_report(snapshot)
            .map_err(|e| ExportError::Serialization(e.to_string())),
        ExportFormat::Table => Ok(text::daily_load_table(snapshot)),
    }
}

/// Render the squad overview
pub fn render_overview(overview: &SquadOverview, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => json::to_json_string(overview),
        ExportFormat::Text => text::overview_report(overview)
            .map_err(|e| ExportError::Serialization(e.to_string())),
        ExportFormat::Table => Ok(text::overview_table(overview)),
    }
}

/// Write rendered output to a file, creating parent directories
pub fn write_output<P: AsRef<Path>>(content: &str, output_path: P) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    };

    write().map_err(|e| ExportError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
