//! Report assembly for visit completeness runs.
//!
//! Reports are plain tables; the CLI renders them to the terminal and
//! [`to_csv_string`] / [`write_csv`] export them.

pub mod collection;
pub mod completeness;
pub mod error;
pub mod missing;
pub mod participants;
pub mod table;

pub use collection::{CollectionReport, CollectionRow, assemble_collection_report};
pub use completeness::ReportCompleteness;
pub use error::{ReportError, Result};
pub use missing::{
    MissingDisplay, MissingReport, MissingReportOptions, MissingReportRow,
    assemble_missing_report, write_missing_report_csv,
};
pub use participants::assemble_summary;
pub use table::{TabularReport, to_csv_string, write_csv};
