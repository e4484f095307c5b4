pub mod columns;
pub mod conversion;
pub mod decoder;
pub mod dedup;
pub mod extractor;
pub mod literal;
pub mod source;
pub mod table_writer;

pub use conversion::{run, Conversion, RunSummary};
pub use table_writer::{CsvDirectorySink, TableSink};
