use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{AppError, AppResult};
use crate::models::Table;

/// Destination for finished tables
///
/// The converters only ever hand complete tables to a sink, so an
/// implementation decides on its own how (and how atomically) they land.
#[cfg_attr(test, mockall::automock)]
pub trait TableSink {
    /// Writes `table` and returns where it ended up
    fn write_table(&self, table: &Table) -> AppResult<PathBuf>;
}

/// Writes each table as `<dir>/<file_name>`, replacing any previous file atomically
#[derive(Debug, Clone)]
pub struct CsvDirectorySink {
    dir: PathBuf,
}

impl CsvDirectorySink {
    /// Creates the sink, creating `dir` first if it does not exist
    pub fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableSink for CsvDirectorySink {
    fn write_table(&self, table: &Table) -> AppResult<PathBuf> {
        let destination = self.dir.join(&table.file_name);

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        write_csv(&mut staged, &table.header, &table.rows)?;
        #[cfg(unix)]
        staged
            .as_file()
            .set_permissions(output_permissions(&destination))?;
        staged.as_file().sync_all()?;
        staged
            .persist(&destination)
            .map_err(|e| AppError::Io(e.error))?;

        tracing::info!(
            path = %destination.display(),
            rows = table.rows.len(),
            "Wrote table"
        );

        Ok(destination)
    }
}

/// Temp files start out owner-only; tables get the mode of the file they
/// replace, or 0644 for a new one.
#[cfg(unix)]
fn output_permissions(destination: &Path) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(destination)
        .map(|meta| meta.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(0o644))
}

/// Writes a header line followed by one line per row.
///
/// Fields are quoted only when needed and every record ends with `\n`.
/// Every row must have as many fields as the header.
pub fn write_csv<W: Write>(writer: W, header: &[String], rows: &[Vec<String>]) -> AppResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer.write_record(header)?;
    for row in rows {
        if row.len() != header.len() {
            return Err(AppError::InvalidInput(format!(
                "row has {} fields, header has {}",
                row.len(),
                header.len()
            )));
        }
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
