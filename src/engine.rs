//! Entry point: filter a batch of records by a structured filter list or a
//! query string.
//!
//! A query string goes through variable substitution, then duration
//! normalization, then parsing; the resulting expression is evaluated once
//! per record. Structured filter lists are evaluated directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Expr, OperatorTable},
    clause::{FilterClause, matches_clauses},
    duration::normalize_durations,
    evaluator::{EvalError, Evaluator},
    lexer::Lexer,
    parser::{ParseError, Parser},
    record::PullRequest,
    variables::Variables,
};

/// Errors surfaced to the caller of a filter operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// What a batch is filtered by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate<'a> {
    /// Structured filter list, implicitly AND-ed
    Clauses(&'a [FilterClause]),
    /// Query-language expression
    Query(&'a str),
}

/// A filter as the dashboard stores it.
///
/// `filters: null` means the filter is expressed by `query` instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_as_notification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_as_notification_decrease: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_text: Option<String>,
    #[serde(default)]
    pub filters: Option<Vec<FilterClause>>,
    #[serde(default)]
    pub query: String,
}

impl SavedFilter {
    pub fn predicate(&self) -> Predicate<'_> {
        match &self.filters {
            Some(clauses) => Predicate::Clauses(clauses),
            None => Predicate::Query(&self.query),
        }
    }
}

/// A parsed query, ready to be evaluated against any number of records.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    source: String,
    normalized: String,
    expr: Expr,
}

impl CompiledQuery {
    /// The query as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The query after variable substitution and duration normalization.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn matches(&self, record: &PullRequest, now: DateTime<Utc>) -> Result<bool, EvalError> {
        Evaluator::new(now).matches(&self.expr, record)
    }

    /// Matching records, in input order.
    pub fn filter_at<'r>(
        &self,
        records: &'r [PullRequest],
        now: DateTime<Utc>,
    ) -> Result<Vec<&'r PullRequest>, EvalError> {
        let evaluator = Evaluator::new(now);
        let mut matched = Vec::new();
        for record in records {
            if evaluator.matches(&self.expr, record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }
}

/// The filter engine.
///
/// Holds only the operator table, built once; every filter call is
/// otherwise independent.
///
/// # Examples
///
/// ```
/// use prq::{FilterEngine, Predicate, PullRequest, Variables};
///
/// let records: Vec<PullRequest> = serde_json::from_value(serde_json::json!([{
///     "id": "PR_1", "number": 7, "title": "Fix", "org": "acme", "repo": "api",
///     "state": "OPEN", "author": { "login": "octocat" }, "totalCommentsCount": 3,
///     "createdAt": "2025-09-30T07:27:08Z", "updatedAt": "2025-09-30T08:06:53Z"
/// }]))
/// .unwrap();
///
/// let engine = FilterEngine::new();
/// let vars = Variables::with_current_user("octocat");
/// let matched = engine
///     .filter(&records, &Predicate::Query("author = @me comments > 1"), &vars)
///     .unwrap();
/// assert_eq!(matched.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    operators: OperatorTable,
}

impl FilterEngine {
    pub fn new() -> Self {
        FilterEngine::with_operators(OperatorTable::standard())
    }

    pub fn with_operators(operators: OperatorTable) -> Self {
        FilterEngine { operators }
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Substitute variables, then rewrite duration literals.
    pub fn prepare(query: &str, variables: &Variables) -> String {
        normalize_durations(&variables.substitute(query))
    }

    pub fn compile(&self, query: &str, variables: &Variables) -> Result<CompiledQuery, ParseError> {
        let normalized = Self::prepare(query, variables);
        let expr = Parser::with_operators(Lexer::new(&normalized), &self.operators)?.parse()?;
        debug!(query, normalized = %normalized, "compiled filter query");

        Ok(CompiledQuery {
            source: query.to_string(),
            normalized,
            expr,
        })
    }

    /// Filter against the current time.
    pub fn filter<'r>(
        &self,
        records: &'r [PullRequest],
        predicate: &Predicate<'_>,
        variables: &Variables,
    ) -> Result<Vec<&'r PullRequest>, FilterError> {
        self.filter_at(records, predicate, variables, Utc::now())
    }

    /// Filter with relative times measured from `now`.
    pub fn filter_at<'r>(
        &self,
        records: &'r [PullRequest],
        predicate: &Predicate<'_>,
        variables: &Variables,
        now: DateTime<Utc>,
    ) -> Result<Vec<&'r PullRequest>, FilterError> {
        let matched = match predicate {
            Predicate::Clauses(clauses) => filter_by(records, clauses, variables),
            Predicate::Query(query) => self.compile(query, variables)?.filter_at(records, now)?,
        };

        let kind = match predicate {
            Predicate::Clauses(_) => "clauses",
            Predicate::Query(_) => "query",
        };
        debug!(
            kind,
            matched = matched.len(),
            total = records.len(),
            "filtered records"
        );
        Ok(matched)
    }

    /// Filter by a saved filter: its clause list if it has one, its query otherwise.
    pub fn apply<'r>(
        &self,
        records: &'r [PullRequest],
        saved: &SavedFilter,
        variables: &Variables,
    ) -> Result<Vec<&'r PullRequest>, FilterError> {
        self.filter(records, &saved.predicate(), variables)
    }

    pub fn apply_at<'r>(
        &self,
        records: &'r [PullRequest],
        saved: &SavedFilter,
        variables: &Variables,
        now: DateTime<Utc>,
    ) -> Result<Vec<&'r PullRequest>, FilterError> {
        self.filter_at(records, &saved.predicate(), variables, now)
    }
}

/// Records matching a query string, evaluated against the current time.
pub fn filter_by_query<'r>(
    records: &'r [PullRequest],
    query: &str,
    variables: &Variables,
) -> Result<Vec<&'r PullRequest>, FilterError> {
    FilterEngine::new().filter(records, &Predicate::Query(query), variables)
}

/// Records matching every clause of a structured filter list.
pub fn filter_by<'r>(
    records: &'r [PullRequest],
    clauses: &[FilterClause],
    variables: &Variables,
) -> Vec<&'r PullRequest> {
    records
        .iter()
        .filter(|record| matches_clauses(record, clauses, variables))
        .collect()
}
