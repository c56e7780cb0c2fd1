//! Structured filter lists: `{type, compare, values}` clauses, implicitly AND-ed.
//!
//! ```json
//! [
//!   { "type": "label", "compare": "includes", "values": ["bug", "security"] },
//!   { "type": "user_review", "compare": "includes", "values": ["@me"] },
//!   { "type": "isDraft", "compare": "false" }
//! ]
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    field,
    record::{PullRequest, User},
    value::Value,
    variables::{CURRENT_USER, Variables},
};

/// How a clause compares the resolved field with its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// The field is literally `true`
    #[serde(rename = "true")]
    True,
    /// The field is literally `false`
    #[serde(rename = "false")]
    False,
    /// At least one value is present
    #[serde(rename = "includes")]
    Includes,
    /// Every value is present
    #[serde(rename = "includes all")]
    IncludesAll,
    /// No value is present
    #[serde(rename = "excludes")]
    Excludes,
}

/// A scalar a clause compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClauseValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<&ClauseValue> for Value {
    fn from(v: &ClauseValue) -> Self {
        match v {
            ClauseValue::Boolean(b) => Value::Boolean(*b),
            ClauseValue::Integer(n) => Value::Integer(*n),
            ClauseValue::Float(n) => Value::Float(*n),
            ClauseValue::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        ClauseValue::String(s.to_string())
    }
}

impl From<i64> for ClauseValue {
    fn from(n: i64) -> Self {
        ClauseValue::Integer(n)
    }
}

impl From<bool> for ClauseValue {
    fn from(b: bool) -> Self {
        ClauseValue::Boolean(b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    /// Field name, alias, or one of the synthetic types `user_review` and
    /// `user_reviewed`
    #[serde(rename = "type")]
    pub field: String,
    pub compare: Comparator,
    /// Single value, merged in front of `values`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ClauseValue>,
    #[serde(default)]
    pub values: Vec<ClauseValue>,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, compare: Comparator) -> Self {
        FilterClause {
            field: field.into(),
            compare,
            value: None,
            values: Vec::new(),
        }
    }

    pub fn with_values<V: Into<ClauseValue>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    fn comparison_values(&self) -> Vec<Value> {
        self.value
            .iter()
            .chain(&self.values)
            .map(Value::from)
            .collect()
    }

    /// Test an already resolved field value against this clause.
    pub fn matches_value(&self, resolved: &Value) -> bool {
        match self.compare {
            Comparator::True => *resolved == Value::Boolean(true),
            Comparator::False => *resolved == Value::Boolean(false),
            Comparator::Includes => {
                let wanted = self.comparison_values();
                match resolved {
                    Value::List(items) => items.iter().any(|item| includes(&wanted, item)),
                    scalar => includes(&wanted, scalar),
                }
            }
            Comparator::IncludesAll => {
                let present = resolved.clone().into_list();
                self.comparison_values()
                    .iter()
                    .all(|wanted| includes(&present, wanted))
            }
            Comparator::Excludes => {
                let unwanted = self.comparison_values();
                match resolved {
                    Value::List(items) => !unwanted.iter().any(|value| includes(items, value)),
                    scalar => !includes(&unwanted, scalar),
                }
            }
        }
    }
}

/// Loose membership: equal values, or equal after stringifying and
/// lower-casing (`33` matches `"33"`, `Bug` matches `bug`).
fn includes(haystack: &[Value], needle: &Value) -> bool {
    if matches!(needle, Value::Null) {
        return haystack.iter().any(|v| matches!(v, Value::Null));
    }
    let folded = needle.as_string().to_lowercase();
    haystack
        .iter()
        .any(|v| v == needle || (!matches!(v, Value::Null) && v.as_string().to_lowercase() == folded))
}

fn same_login(a: &str, b: &str) -> bool {
    a == b
}

fn same_login_ignoring_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Logins, plus `@me` when the current user is among them.
fn logins_with_me<'a>(
    users: impl Iterator<Item = &'a User>,
    current_user: Option<&str>,
    is_me: fn(&str, &str) -> bool,
) -> Value {
    let mut logins: Vec<Value> = Vec::new();
    let mut has_me = false;
    for user in users {
        has_me |= current_user.is_some_and(|me| is_me(&user.login, me));
        logins.push(Value::String(user.login.clone()));
    }
    if has_me {
        logins.push(Value::from(CURRENT_USER));
    }
    Value::List(logins)
}

/// Resolve a clause's field type against a record.
///
/// Only requested reviewers are matched against the current user without
/// regard to case; the author and past reviewers must match exactly.
pub fn resolve_clause_field(pr: &PullRequest, field_type: &str, current_user: Option<&str>) -> Value {
    match field_type {
        "author" => logins_with_me(std::iter::once(&pr.author), current_user, same_login),
        "user_review" => logins_with_me(
            pr.requested_reviewers.iter(),
            current_user,
            same_login_ignoring_case,
        ),
        "user_reviewed" => logins_with_me(
            pr.latest_opinionated_reviews.iter().map(|review| &review.author),
            current_user,
            same_login,
        ),
        other => field::resolve(pr, other),
    }
}

/// Whether a record satisfies every clause.
///
/// Each field type is resolved at most once per record, however many
/// clauses refer to it.
pub fn matches_clauses(pr: &PullRequest, clauses: &[FilterClause], variables: &Variables) -> bool {
    let current_user = variables.current_user();
    let mut resolved: HashMap<&str, Value> = HashMap::new();

    for clause in clauses {
        let value = resolved
            .entry(clause.field.as_str())
            .or_insert_with(|| resolve_clause_field(pr, &clause.field, current_user));
        if !clause.matches_value(value) {
            return false;
        }
    }
    true
}
