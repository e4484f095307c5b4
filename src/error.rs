use std::path::PathBuf;

/// Errors that abort a conversion run
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column '{column}' in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<envy::Error> for AppError {
    fn from(e: envy::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Why a source row (or the embedded part of one) was left out of the output.
///
/// Skips are recovered locally and never abort a run; they only show up in
/// the run report and debug logs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("field '{field}' is not an integer: {value:?}")]
    InvalidId { field: &'static str, value: String },

    #[error("rating is not a finite number: {value:?}")]
    InvalidRating { value: String },

    #[error("embedded list is empty")]
    EmptyEmbeddedList,

    #[error("embedded list is malformed: {reason}")]
    MalformedEmbeddedList { reason: String },
}

impl SkipReason {
    /// Stable key used when tallying skips in a report
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::InvalidId { .. } => "invalid_id",
            SkipReason::InvalidRating { .. } => "invalid_rating",
            SkipReason::EmptyEmbeddedList => "empty_embedded_list",
            SkipReason::MalformedEmbeddedList { .. } => "malformed_embedded_list",
        }
    }
}
