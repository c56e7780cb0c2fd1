//! Run filters against JSON records

use chrono::{DateTime, Utc};

use super::{CliError, parse_records, records_to_json};
use crate::{FilterEngine, Predicate, SavedFilter, Variables};

/// Options shared by the `filter` and `apply` commands
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// JSON records: an array of pull requests or a single one
    pub input: Option<String>,
    /// Variable table, including the current user
    pub variables: Variables,
    /// Reference time for relative durations; the wall clock when unset
    pub now: Option<DateTime<Utc>>,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a run
#[derive(Debug)]
pub enum RunOutcome {
    /// Syntax validation passed
    SyntaxValid,
    /// Matching records, in input order
    Matches {
        count: usize,
        records: serde_json::Value,
    },
}

/// Filter records by a query string.
pub fn execute_filter(query: &str, options: &RunOptions) -> Result<RunOutcome, CliError> {
    let engine = FilterEngine::new();

    if options.syntax_only {
        engine.compile(query, &options.variables)?;
        return Ok(RunOutcome::SyntaxValid);
    }

    run(&engine, &Predicate::Query(query), options)
}

/// Filter records by a saved filter document.
pub fn execute_apply(saved_json: &str, options: &RunOptions) -> Result<RunOutcome, CliError> {
    let saved: SavedFilter = serde_json::from_str(saved_json)?;
    let engine = FilterEngine::new();

    if options.syntax_only {
        if let Predicate::Query(query) = saved.predicate() {
            engine.compile(query, &options.variables)?;
        }
        return Ok(RunOutcome::SyntaxValid);
    }

    run(&engine, &saved.predicate(), options)
}

fn run(
    engine: &FilterEngine,
    predicate: &Predicate<'_>,
    options: &RunOptions,
) -> Result<RunOutcome, CliError> {
    let json = options.input.as_deref().ok_or(CliError::NoInput)?;
    let records = parse_records(json)?;

    let now = options.now.unwrap_or_else(Utc::now);
    let matched = engine.filter_at(&records, predicate, &options.variables, now)?;

    Ok(RunOutcome::Matches {
        count: matched.len(),
        records: records_to_json(&matched)?,
    })
}
