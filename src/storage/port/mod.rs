pub mod export;
pub mod import;

use super::*;
use clap::ValueEnum;

pub use export::export_contacts;
pub use import::{RawContact, read_contacts};

/// Column order of CSV export, also expected as the CSV import header.
pub const CSV_HEADERS: [&str; 6] = ["name", "phone", "email", "address", "category", "created_date"];

pub const EXPORT_PREFIX: &str = "contacts_export_";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Txt,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }

    /// Format implied by a file extension, for the formats that can be imported.
    pub fn importable_from(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(AppError::Format(
                "Unsupported file format! Use .json or .csv files".to_string(),
            )),
        }
    }
}
