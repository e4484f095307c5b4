use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::{Config, DedupMode};
use crate::error::AppResult;
use crate::models::{ConversionReport, Table};
use crate::services::decoder::{MOVIE_COLUMNS, RATING_COLUMNS};
use crate::services::extractor::{extract_movies, extract_ratings};
use crate::services::source::SourceReader;
use crate::services::table_writer::{CsvDirectorySink, TableSink};

pub const DEFAULT_MOVIES_INPUT: &str = "movies_metadata.csv";
pub const DEFAULT_RATINGS_INPUT: &str = "ratings_small.csv";

/// Which converter a run executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    Movies,
    Ratings,
}

impl Conversion {
    pub fn name(&self) -> &'static str {
        match self {
            Conversion::Movies => "movies",
            Conversion::Ratings => "ratings",
        }
    }

    pub fn default_input(&self) -> &'static str {
        match self {
            Conversion::Movies => DEFAULT_MOVIES_INPUT,
            Conversion::Ratings => DEFAULT_RATINGS_INPUT,
        }
    }
}

/// Outcome of one complete run, suitable for printing as JSON
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub conversion: Conversion,
    pub input: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub report: ConversionReport,
}

/// Reads the movie metadata file and writes movies, genres and movie–genre tables
pub fn convert_movies(
    input: &Path,
    sink: &dyn TableSink,
    mode: DedupMode,
) -> AppResult<(ConversionReport, Vec<PathBuf>)> {
    let mut source = SourceReader::open(input, MOVIE_COLUMNS)?;
    let tables = extract_movies(source.records(), mode)?;

    let mut report = tables.report;
    let outputs = write_tables(
        sink,
        &mut report,
        vec![
            Table::from_rows(&tables.movies),
            Table::from_rows(&tables.genres),
            Table::from_rows(&tables.movie_genres),
        ],
    )?;
    Ok((report, outputs))
}

/// Reads the ratings file and writes the generated users and ratings tables
pub fn convert_ratings(
    input: &Path,
    sink: &dyn TableSink,
    mode: DedupMode,
) -> AppResult<(ConversionReport, Vec<PathBuf>)> {
    let mut source = SourceReader::open(input, RATING_COLUMNS)?;
    let tables = extract_ratings(source.records(), mode)?;

    let mut report = tables.report;
    let outputs = write_tables(
        sink,
        &mut report,
        vec![
            Table::from_rows(&tables.users),
            Table::from_rows(&tables.ratings),
        ],
    )?;
    Ok((report, outputs))
}

fn write_tables(
    sink: &dyn TableSink,
    report: &mut ConversionReport,
    tables: Vec<Table>,
) -> AppResult<Vec<PathBuf>> {
    tables
        .iter()
        .map(|table| {
            let path = sink.write_table(table)?;
            report.record_table(table);
            Ok(path)
        })
        .collect()
}

/// Runs a conversion with the configured paths, inside a span tagged with a fresh run id
pub fn run(conversion: Conversion, config: &Config) -> AppResult<RunSummary> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("conversion_run", run_id = %run_id, command = conversion.name());
    let _enter = span.enter();

    let started_at = Utc::now();
    let input = config.input_or(conversion.default_input());
    let mode = config.dedup_mode();
    tracing::info!(
        input = %input.display(),
        output_dir = %config.output_dir().display(),
        ?mode,
        "Starting conversion"
    );

    let sink = CsvDirectorySink::new(config.output_dir())?;
    let (report, outputs) = match conversion {
        Conversion::Movies => convert_movies(&input, &sink, mode)?,
        Conversion::Ratings => convert_ratings(&input, &sink, mode)?,
    };

    if report.skipped_total() > 0 {
        tracing::warn!(
            skipped = report.skipped_total(),
            reasons = ?report.rows_skipped,
            "Some rows were skipped"
        );
    }
    tracing::info!(
        rows_read = report.rows_read,
        partial = ?report.partial_skips,
        duplicates_dropped = report.duplicates_dropped,
        tables = ?report.tables,
        "Conversion finished"
    );

    Ok(RunSummary {
        run_id,
        conversion,
        input,
        outputs,
        started_at,
        finished_at: Utc::now(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::table_writer::MockTableSink;
    use mockall::predicate::always;
    use std::fs;
    use tempfile::tempdir;

    const MOVIES: &str = "\
adult,genres,id,imdb_id,title
False,\"[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}]\",862,tt0114709,Toy Story
False,\"[{'id': 35, 'name': 'Comedy'}]\",abc,tt0000001,Bad Row
False,[],5,tt0113101,Four Rooms
";

    fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_convert_movies_hands_tables_to_sink_in_order() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "movies_metadata.csv", MOVIES);

        let mut sink = MockTableSink::new();
        let mut seq = mockall::Sequence::new();
        sink.expect_write_table()
            .withf(|t: &Table| {
                t.file_name == "movies.csv"
                    && t.header == ["movie_id", "title", "imdb_id"]
                    && t.rows
                        == vec![
                            vec!["862", "Toy Story", "tt0114709"],
                            vec!["5", "Four Rooms", "tt0113101"],
                        ]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|t| Ok(PathBuf::from(&t.file_name)));
        sink.expect_write_table()
            .withf(|t: &Table| {
                t.file_name == "genres.csv"
                    && t.rows == vec![vec!["16", "Animation"], vec!["35", "Comedy"]]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|t| Ok(PathBuf::from(&t.file_name)));
        sink.expect_write_table()
            .withf(|t: &Table| {
                t.file_name == "movie_genres.csv"
                    && t.header == ["movie_id", "genre_id"]
                    && t.rows == vec![vec!["862", "16"], vec!["862", "35"]]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|t| Ok(PathBuf::from(&t.file_name)));

        let (report, outputs) = convert_movies(&input, &sink, DedupMode::Lenient).unwrap();

        assert_eq!(outputs.len(), 3);
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.tables.get("movies.csv"), Some(&2));
        assert_eq!(report.rows_skipped.get("invalid_id"), Some(&1));
    }

    #[test]
    fn test_sink_failure_stops_the_run() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "ratings_small.csv", "userId,movieId,rating\n1,31,2.5\n");

        let mut sink = MockTableSink::new();
        sink.expect_write_table()
            .with(always())
            .times(1)
            .returning(|_| {
                Err(AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )))
            });

        let result = convert_ratings(&input, &sink, DedupMode::Lenient);
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let sink = MockTableSink::new();
        let result = convert_movies(Path::new("/nonexistent/movies.csv"), &sink, DedupMode::Lenient);
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_run_writes_ratings_outputs() {
        let dir = tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "ratings_small.csv",
            "userId,movieId,rating,timestamp\n7,862,4.5,1260759144\n7,1029,3.0,1260759179\n",
        );
        let config = Config {
            input_path: Some(input.clone()),
            output_dir: Some(dir.path().join("small")),
            strict_dedup: false,
        };

        let summary = run(Conversion::Ratings, &config).unwrap();

        assert_eq!(summary.conversion, Conversion::Ratings);
        assert_eq!(summary.input, input);
        assert_eq!(summary.outputs.len(), 2);
        assert!(summary.finished_at >= summary.started_at);
        assert_eq!(
            fs::read_to_string(dir.path().join("small/generated_users.csv")).unwrap(),
            "user_id,pseudo\n7,Generated User #7\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("small/generated_ratings.csv")).unwrap(),
            "user_id,movie_id,value\n7,862,9\n7,1029,6\n"
        );
    }

    #[test]
    fn test_summary_serializes() {
        let summary = RunSummary {
            run_id: Uuid::nil(),
            conversion: Conversion::Movies,
            input: PathBuf::from("movies_metadata.csv"),
            outputs: vec![],
            started_at: Utc::now(),
            finished_at: Utc::now(),
            report: ConversionReport::default(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["conversion"], "movies");
        assert_eq!(json["run_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["report"]["rows_read"], 0);
    }
}
