use std::fs;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::{ReportError, Result};

/// A report that can be rendered as rows of text cells.
pub trait TabularReport {
    fn header(&self) -> Vec<String>;

    fn records(&self) -> Vec<Vec<String>>;
}

/// Render `report` as CSV text.
pub fn to_csv_string<T: TabularReport + ?Sized>(report: &T) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    write_rows(&mut writer, report, Path::new("<memory>"))?;
    let bytes = writer.into_inner().map_err(|error| ReportError::Io {
        path: "<memory>".into(),
        source: error.into_error(),
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `report` to a CSV file, creating parent directories as needed.
pub fn write_csv<T: TabularReport + ?Sized>(report: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|source| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    write_rows(&mut writer, report, path)?;
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_rows<W: std::io::Write, T: TabularReport + ?Sized>(
    writer: &mut csv::Writer<W>,
    report: &T,
    path: &Path,
) -> Result<()> {
    let csv_error = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    writer.write_record(report.header()).map_err(csv_error)?;
    for record in report.records() {
        writer.write_record(record).map_err(csv_error)?;
    }
    Ok(())
}
