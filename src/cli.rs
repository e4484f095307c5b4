use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::services::columns::ColumnSelector;

/// Reshapes the public movie dataset into node and edge tables for a graph import
#[derive(Debug, Parser)]
#[command(name = "movie-graph-prep", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Source CSV (overrides INPUT_PATH)
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Destination directory (overrides OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Options shared by the table conversions
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Also drop repeated movies, movie–genre pairs and user–movie ratings
    #[arg(long)]
    pub strict_dedup: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// movies_metadata.csv -> movies.csv, genres.csv, movie_genres.csv
    Movies(ConvertArgs),
    /// ratings_small.csv -> generated_users.csv, generated_ratings.csv
    Ratings(ConvertArgs),
    /// Write a copy of a CSV without some of its columns, next to the
    /// input unless an output directory is configured
    DropColumns {
        /// Column numbers (1-based) or names, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<ColumnSelector>,

        /// Show what would be removed without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    /// Layers command-line overrides on top of the environment config
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(input) = &self.input {
            config.input_path = Some(input.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        if let Command::Movies(args) | Command::Ratings(args) = &self.command {
            if args.strict_dedup {
                config.strict_dedup = true;
            }
        }
        config
    }
}
