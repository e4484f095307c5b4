use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::SkipReason;

pub mod movie;
pub mod rating;

pub use movie::{Genre, Movie, MovieGenre};
pub use rating::{Rating, User};

/// A row type that is written out as one line of a fixed-header CSV table
pub trait TableRow {
    /// Output file name inside the destination directory
    const FILE_NAME: &'static str;
    /// Column names, in the same order as [`TableRow::fields`]
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

/// A table ready for a [`crate::services::TableSink`]: header plus stringified rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub file_name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(file_name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            file_name: file_name.into(),
            header,
            rows,
        }
    }

    /// Builds a table from typed rows, using the row type's file name and header
    pub fn from_rows<T: TableRow>(rows: &[T]) -> Self {
        Self {
            file_name: T::FILE_NAME.to_string(),
            header: T::HEADER.iter().map(|c| c.to_string()).collect(),
            rows: rows.iter().map(TableRow::fields).collect(),
        }
    }
}

/// Counters describing what one conversion did with its input
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ConversionReport {
    /// Data rows read from the source (header excluded)
    pub rows_read: usize,
    /// Rows that produced nothing at all, by reason
    pub rows_skipped: BTreeMap<String, usize>,
    /// Rows whose entity was kept but whose embedded part or relation was dropped
    pub partial_skips: BTreeMap<String, usize>,
    /// Repeats removed in strict dedup mode
    pub duplicates_dropped: usize,
    /// Rows written per output file
    pub tables: BTreeMap<String, usize>,
}

impl ConversionReport {
    pub fn record_skip(&mut self, reason: &SkipReason) {
        *self.rows_skipped.entry(reason.kind().to_string()).or_default() += 1;
    }

    pub fn record_partial(&mut self, reason: &SkipReason) {
        *self.partial_skips.entry(reason.kind().to_string()).or_default() += 1;
    }

    pub fn record_table(&mut self, table: &Table) {
        self.tables.insert(table.file_name.clone(), table.rows.len());
    }

    pub fn skipped_total(&self) -> usize {
        self.rows_skipped.values().sum()
    }
}
