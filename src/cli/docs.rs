//! Documentation content for the prq CLI

use std::fmt::Write;

use super::CliError;
use crate::field::{ALIASES, Field};
use crate::functions::FUNCTION_NAMES;

/// Available documentation topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTopic {
    Fields,
    Operators,
    Durations,
    Functions,
    Filters,
    Variables,
}

impl DocTopic {
    /// Parse topic name from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fields" | "field" | "aliases" => Some(Self::Fields),
            "operators" | "ops" => Some(Self::Operators),
            "durations" | "duration" | "time" => Some(Self::Durations),
            "functions" | "function" | "fns" => Some(Self::Functions),
            "filters" | "filter" | "clauses" | "saved" => Some(Self::Filters),
            "variables" | "variable" | "vars" => Some(Self::Variables),
            _ => None,
        }
    }
}

/// Get the docs overview (topic listing)
pub fn get_docs_overview() -> &'static str {
    r#"PRQ DOCUMENTATION

prq filters pull-request records with either a query string or a saved
filter document. Records are read as JSON, matching records are written
back as JSON in input order.

DOCUMENTATION TOPICS

  fields            Record fields and their aliases
  operators         Comparison, membership, logical and arithmetic operators
  durations         Relative time literals such as -7d and 2h
  functions         getReviewDate and getReviewRequestedAt
  filters           Structured filter lists and saved filter documents
  variables         @me and user-defined variables

QUICK REFERENCE

  state = OPEN                       Equality, case-insensitive
  labels IN (bug, security)          Any label in the set
  createdAt >= -7d                   Created in the last week
  author = @me draft = false         Juxtaposition is AND
  title ~ "fix" OR comments > 10     Substring match, disjunction

Run 'prq doc <topic>' for detailed documentation.
"#
}

/// Get documentation for a specific topic
pub fn get_doc_topic(name: &str) -> Result<String, CliError> {
    match DocTopic::from_str(name) {
        Some(DocTopic::Fields) => Ok(fields_doc()),
        Some(DocTopic::Operators) => Ok(OPERATORS_DOC.to_string()),
        Some(DocTopic::Durations) => Ok(DURATIONS_DOC.to_string()),
        Some(DocTopic::Functions) => Ok(functions_doc()),
        Some(DocTopic::Filters) => Ok(FILTERS_DOC.to_string()),
        Some(DocTopic::Variables) => Ok(VARIABLES_DOC.to_string()),
        None => Err(CliError::UnknownTopic(name.to_string())),
    }
}

fn fields_doc() -> String {
    let mut doc = String::from("FIELDS - Record fields usable in queries\n\nFIELDS\n");
    for field in Field::ALL {
        let _ = writeln!(doc, "  {}", field.name());
    }

    doc.push_str("\nALIASES\n");
    for (alias, canonical) in ALIASES {
        let _ = writeln!(doc, "  {alias:<22}{canonical}");
    }

    doc.push_str(
        r#"
NOTES
  - Field names are case-sensitive; values compare case-insensitively.
  - labels, author, requestedReviewers and latestOpinionatedReviews
    project to lists of names or logins.
  - A single-element list compares like its element.
  - Unknown names evaluate to null; a bare word on the right-hand side
    of an operator is a string.
"#,
    );
    doc
}

fn functions_doc() -> String {
    let mut doc = String::from("FUNCTIONS - Built-in functions\n\nAVAILABLE\n");
    for name in FUNCTION_NAMES {
        let _ = writeln!(doc, "  {name}");
    }
    doc.push_str(FUNCTIONS_DETAIL);
    doc
}

const FUNCTIONS_DETAIL: &str = r#"
getReviewDate(state = APPROVED)
    Latest time a review in the given state was submitted. Records
    without such a review report the Unix epoch.

    Example:
      getReviewDate(APPROVED) >= -2d

getReviewRequestedAt(mode = newest)
    Time an outstanding review request was made. Requests removed later
    in the timeline, or whose review was dismissed, are not outstanding.
    Mode newest reports the most recent request, mode latest the
    earliest one still outstanding. Any other mode is an error. No
    outstanding request evaluates to null.

    Example:
      getReviewRequestedAt(latest) <= -3d
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Listed from loosest to tightest binding

LOGICAL
  a OR b            Either side holds
  a AND b           Both sides hold
  a b               Juxtaposition, same as AND

MEMBERSHIP
  x IN (a, b)       Any element of x is in the set
  x NOT IN (a, b)   No element of x is in the set

COMPARISON
  =  ==             Equal; a list on the left means membership
  != <>             Not equal
  ~                 Case-insensitive substring
  < > <= >=         Time comparison; numbers are seconds from now

ARITHMETIC
  + -               Addition and subtraction
  -x +x             Unary sign

GROUPING
  ( expr )          Parentheses group
  (a, b, c)         A comma-separated group is a list
"#;

const DURATIONS_DOC: &str = r#"DURATIONS - Relative time literals

A number followed by a unit is rewritten to seconds before parsing.
Ordering comparisons read numbers as now + N seconds, so negative
durations point into the past.

UNITS
  y  year  years                    31536000
  mo month months                   2592000
  w  week  weeks                    604800
  d  day   days                     86400
  h  hr    hrs   hour  hours        3600
  m  min   mins  minute minutes     60
  s  sec   secs  second seconds     1

EXAMPLES
  createdAt >= -7d                  Created within the last seven days
  updatedAt < -1.5h                 Not touched for ninety minutes
  "7d"                              Quoted text is left alone
"#;

const FILTERS_DOC: &str = r#"FILTERS - Structured filter lists

A filter list is a JSON array of clauses; a record matches when every
clause holds.

  { "type": "label", "compare": "includes", "values": ["bug"] }

COMPARATORS
  true              Field is literally true
  false             Field is literally false
  includes          At least one value is present
  includes all      Every value is present
  excludes          No value is present

SPECIAL TYPES
  author            Author login, plus @me when it is the current user
  user_review       Requested reviewers, plus @me
  user_reviewed     Reviewers with an opinionated review, plus @me

SAVED FILTERS
  { "id": "...", "name": "...", "filters": [ ... ], "query": "..." }

  When filters is null the query string is used instead.
  Run with: prq apply --filter saved.json
"#;

const VARIABLES_DOC: &str = r#"VARIABLES - Query substitution

Variables are replaced in the query text before anything else happens.
Each occurrence becomes a quoted string, whether written bare or quoted.

  @me               The current user (--user or PRQ_USER)
  --var NAME=VALUE  Any other variable; may be repeated

EXAMPLES
  prq filter 'author = @me' --user octocat
  prq filter 'repo = $repo' --var '$repo=api'
"#;
