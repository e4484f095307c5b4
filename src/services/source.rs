use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// One data row of a source CSV, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecord {
    /// 1-based line of the record in the source file
    pub line: u64,
    fields: HashMap<String, String>,
}

impl SourceRecord {
    pub fn from_pairs<'a>(line: u64, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            line,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Cell for `column`, or `None` when the row is too short to have one
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// Header-aware CSV reader that yields [`SourceRecord`]s for a fixed set of columns
pub struct SourceReader<R: Read> {
    reader: csv::Reader<R>,
    columns: Vec<(String, usize)>,
}

impl SourceReader<File> {
    /// Opens `path` and checks that every column in `required` is in its header
    pub fn open(path: &Path, required: &[&str]) -> AppResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, path, required)
    }
}

impl<R: Read> SourceReader<R> {
    pub fn from_reader(reader: R, label: &Path, required: &[&str]) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let header = reader.headers()?.clone();
        let columns = required
            .iter()
            .map(|column| {
                header
                    .iter()
                    .position(|h| h == *column)
                    .map(|idx| (column.to_string(), idx))
                    .ok_or_else(|| AppError::MissingColumn {
                        column: column.to_string(),
                        path: PathBuf::from(label),
                    })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self { reader, columns })
    }

    /// Iterates the data rows; CSV and I/O failures are yielded as errors
    pub fn records(&mut self) -> impl Iterator<Item = AppResult<SourceRecord>> + '_ {
        let columns = &self.columns;
        self.reader.records().map(move |result| {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let fields = columns
                .iter()
                .filter_map(|(name, idx)| record.get(*idx).map(|v| (name.clone(), v.to_string())))
                .collect();
            Ok(SourceRecord { line, fields })
        })
    }
}
