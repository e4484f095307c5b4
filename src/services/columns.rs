use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::models::Table;
use crate::services::table_writer::{CsvDirectorySink, TableSink};

/// A column picked for removal, by 1-based number or by header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    Position(usize),
    Name(String),
}

impl FromStr for ColumnSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty column selector".to_string());
        }
        Ok(match s.parse::<usize>() {
            Ok(position) => ColumnSelector::Position(position),
            Err(_) => ColumnSelector::Name(s.to_string()),
        })
    }
}

impl Display for ColumnSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnSelector::Position(position) => write!(f, "{}", position),
            ColumnSelector::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Which columns go and which stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPlan {
    pub original: Vec<String>,
    pub removed: Vec<String>,
    pub remaining: Vec<String>,
    #[serde(skip)]
    keep: Vec<usize>,
}

/// Resolves selectors against a header.
///
/// Repeated selections collapse to one. A number is a column position when
/// it is in range and otherwise matches a column with that name, so a
/// `2020` column is reachable by name in a short header. Any selector that
/// matches nothing fails the whole plan, listing every offender.
pub fn plan_removal(header: &[String], selectors: &[ColumnSelector]) -> AppResult<ColumnPlan> {
    if selectors.is_empty() {
        return Err(AppError::InvalidInput("no columns selected".to_string()));
    }

    let mut remove = vec![false; header.len()];
    let mut invalid = Vec::new();
    for selector in selectors {
        let matched = match selector {
            ColumnSelector::Position(p) if (1..=header.len()).contains(p) => {
                remove[p - 1] = true;
                true
            }
            ColumnSelector::Position(p) => mark_named(header, &mut remove, &p.to_string()),
            ColumnSelector::Name(name) => mark_named(header, &mut remove, name),
        };
        if !matched {
            invalid.push(selector.to_string());
        }
    }

    if !invalid.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "unknown columns: {}",
            invalid.join(", ")
        )));
    }

    let mut removed = Vec::new();
    let mut remaining = Vec::new();
    let mut keep = Vec::new();
    for (idx, column) in header.iter().enumerate() {
        if remove[idx] {
            if !removed.contains(column) {
                removed.push(column.clone());
            }
        } else {
            remaining.push(column.clone());
            keep.push(idx);
        }
    }

    Ok(ColumnPlan {
        original: header.to_vec(),
        removed,
        remaining,
        keep,
    })
}

fn mark_named(header: &[String], remove: &mut [bool], name: &str) -> bool {
    let mut found = false;
    for (idx, column) in header.iter().enumerate() {
        if column == name {
            remove[idx] = true;
            found = true;
        }
    }
    found
}

/// `<stem>_cleaned.<ext>`, next to the input unless `output_dir` is given
pub fn cleaned_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}_cleaned.{}", stem, ext.to_string_lossy()),
        None => format!("{}_cleaned", stem),
    };
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}

/// Result of a column removal run
#[derive(Debug, Clone, Serialize)]
pub struct ColumnRemoval {
    pub input: PathBuf,
    pub plan: ColumnPlan,
    /// `None` for a dry run
    pub output: Option<PathBuf>,
    pub rows_written: usize,
}

/// Copies `input` without the selected columns
pub fn drop_columns(
    input: &Path,
    selectors: &[ColumnSelector],
    output_dir: Option<&Path>,
    dry_run: bool,
) -> AppResult<ColumnRemoval> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)?;
    let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let plan = plan_removal(&header, selectors)?;

    tracing::info!(
        input = %input.display(),
        removed = ?plan.removed,
        remaining = plan.remaining.len(),
        dry_run,
        "Planned column removal"
    );

    if dry_run {
        return Ok(ColumnRemoval {
            input: input.to_path_buf(),
            plan,
            output: None,
            rows_written: 0,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > header.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(AppError::InvalidInput(format!(
                "line {} has {} fields but the header has {}",
                line,
                record.len(),
                header.len()
            )));
        }
        rows.push(
            plan.keep
                .iter()
                .map(|&idx| record.get(idx).unwrap_or_default().to_string())
                .collect(),
        );
    }

    let destination = cleaned_path(input, output_dir);
    let dir = destination
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::InvalidInput(format!("bad input path {}", input.display())))?;

    let sink = CsvDirectorySink::new(if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    })?;
    let table = Table::new(file_name, plan.remaining.clone(), rows);
    let output = sink.write_table(&table)?;

    Ok(ColumnRemoval {
        input: input.to_path_buf(),
        plan,
        output: Some(output),
        rows_written: table.rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn header(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    fn select(values: &[&str]) -> Vec<ColumnSelector> {
        values.iter().map(|v| v.parse().unwrap()).collect()
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("3".parse::<ColumnSelector>(), Ok(ColumnSelector::Position(3)));
        assert_eq!(
            " overview ".parse::<ColumnSelector>(),
            Ok(ColumnSelector::Name("overview".to_string()))
        );
        assert!("".parse::<ColumnSelector>().is_err());
    }

    #[test]
    fn test_plan_by_number_and_name() {
        let plan = plan_removal(
            &header(&["adult", "budget", "id", "overview", "title"]),
            &select(&["2", "overview", "2"]),
        )
        .unwrap();

        assert_eq!(plan.removed, vec!["budget", "overview"]);
        assert_eq!(plan.remaining, vec!["adult", "id", "title"]);
        assert_eq!(plan.original.len(), 5);
    }

    #[test]
    fn test_plan_rejects_unknown_columns() {
        let result = plan_removal(&header(&["a", "b"]), &select(&["0", "3", "c", "1"]));
        match result {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, "unknown columns: 0, 3, c"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_number_matches_column_name() {
        let plan = plan_removal(
            &header(&["title", "2020", "2021"]),
            &select(&["2021", "1"]),
        )
        .unwrap();

        assert_eq!(plan.removed, vec!["title", "2021"]);
        assert_eq!(plan.remaining, vec!["2020"]);
    }

    #[test]
    fn test_in_range_number_is_a_position() {
        let plan = plan_removal(&header(&["title", "2020", "2"]), &select(&["2"])).unwrap();

        assert_eq!(plan.removed, vec!["2020"]);
        assert_eq!(plan.remaining, vec!["title", "2"]);
    }

    #[test]
    fn test_plan_requires_a_selection() {
        assert!(plan_removal(&header(&["a"]), &[]).is_err());
    }

    #[test]
    fn test_cleaned_path() {
        assert_eq!(
            cleaned_path(Path::new("data/movies_metadata.csv"), None),
            PathBuf::from("data/movies_metadata_cleaned.csv")
        );
        assert_eq!(
            cleaned_path(Path::new("ratings"), Some(Path::new("out"))),
            PathBuf::from("out/ratings_cleaned")
        );
    }

    #[test]
    fn test_drop_columns_writes_cleaned_copy() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("credits.csv");
        fs::write(&input, "id,cast,crew\n862,\"Tom, Tim\",John\n8844,Robin\n").unwrap();

        let removal = drop_columns(&input, &select(&["cast"]), None, false).unwrap();

        let output = removal.output.unwrap();
        assert_eq!(output, dir.path().join("credits_cleaned.csv"));
        assert_eq!(removal.rows_written, 2);
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "id,crew\n862,John\n8844,\n"
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("links.csv");
        fs::write(&input, "movieId,imdbId,tmdbId\n1,0114709,862\n").unwrap();

        let removal = drop_columns(&input, &select(&["3"]), None, true).unwrap();

        assert!(removal.output.is_none());
        assert_eq!(removal.plan.remaining, vec!["movieId", "imdbId"]);
        assert!(!dir.path().join("links_cleaned.csv").exists());
    }

    #[test]
    fn test_overlong_row_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.csv");
        fs::write(&input, "a,b\n1,2,3\n").unwrap();

        let result = drop_columns(&input, &select(&["a"]), None, false);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(!dir.path().join("bad_cleaned.csv").exists());
    }
}
