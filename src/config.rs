use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AppResult;

/// Conversion settings loaded from environment variables
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Source CSV; each command falls back to its own default file name
    #[serde(default)]
    pub input_path: Option<PathBuf>,

    /// Directory the output tables are written to; `.` when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Also drop repeated primary keys and relations
    #[serde(default)]
    pub strict_dedup: bool,
}


impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env::<Config>()?)
    }

    /// Builds a config from explicit key/value pairs instead of the process environment
    pub fn from_vars<I>(vars: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(vars)?)
    }

    /// Input path, or `fallback` when none was configured
    pub fn input_or(&self, fallback: &str) -> PathBuf {
        self.input_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(fallback))
    }

    /// Destination for the conversion tables
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn dedup_mode(&self) -> DedupMode {
        if self.strict_dedup {
            DedupMode::Strict
        } else {
            DedupMode::Lenient
        }
    }
}

/// How repeated primary keys and relations are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupMode {
    /// Emit every primary entity and relation as found in the source
    #[default]
    Lenient,
    /// First occurrence wins for primary keys and relations too
    Strict,
}
