//! Output adapters: CSV download and the printable text summary.

pub mod csv;
pub mod report;

pub use self::csv::{parse_csv, to_csv, CSV_FILE_NAME};
pub use self::report::{build_report, Report, ReportPage};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("unexpected CSV header: {0}")]
    Header(String),

    #[error("invalid {column} value in row {row}: {value}")]
    Field {
        row: usize,
        column: String,
        value: String,
    },
}
