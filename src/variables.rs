//! Named placeholders such as `@me` and their substitution into raw queries.

use std::collections::BTreeMap;
use std::ops::Range;

use regex::{Captures, Regex};

use crate::duration::quoted_spans;

/// Name of the variable bound to the current user's login.
pub const CURRENT_USER: &str = "@me";

/// Variable table: placeholder name → literal value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table binding `@me` to `login`.
    pub fn with_current_user(login: impl Into<String>) -> Self {
        let mut variables = Self::new();
        variables.insert(CURRENT_USER, login);
        variables
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn current_user(&self) -> Option<&str> {
        self.get(CURRENT_USER)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every occurrence of each variable, bare or quoted, with a
    /// double-quoted literal of its value.
    ///
    /// `author = @me` and `author = "@me"` both become
    /// `author = "<login>"`. A quoted name counts only when it is the whole
    /// string literal; text inside a longer literal such as `"ping @me"` is
    /// left untouched. Names are matched whole, so `@me` leaves `@meta`
    /// alone; longer names are substituted first.
    ///
    /// # Examples
    ///
    /// ```
    /// use prq::Variables;
    ///
    /// let vars = Variables::with_current_user("octocat");
    /// assert_eq!(vars.substitute("author = @me"), r#"author = "octocat""#);
    /// assert_eq!(vars.substitute(r#"author = "@me""#), r#"author = "octocat""#);
    /// assert_eq!(vars.substitute(r#"title ~ "ping @me""#), r#"title ~ "ping @me""#);
    /// ```
    pub fn substitute(&self, query: &str) -> String {
        let mut names: Vec<(&str, &str)> = self.iter().filter(|(name, _)| !name.is_empty()).collect();
        names.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut result = query.to_string();
        for (name, value) in names {
            let pattern = variable_pattern(name);
            let re = match Regex::new(&pattern) {
                Ok(re) => re,
                Err(e) => {
                    tracing::warn!(variable = name, error = %e, "skipping unmatchable variable name");
                    continue;
                }
            };
            let literal = quote_literal(value);
            // Earlier substitutions add literals of their own.
            let spans = quoted_spans(&result);
            result = re
                .replace_all(&result, |caps: &Captures| {
                    let m = caps.get_match();
                    if is_substitutable(&spans, m.range()) {
                        literal.clone()
                    } else {
                        m.as_str().to_string()
                    }
                })
                .into_owned();
        }
        result
    }
}

/// A match is replaced when it is a whole quoted literal, or when it is
/// bare text outside every literal.
fn is_substitutable(spans: &[Range<usize>], matched: Range<usize>) -> bool {
    match spans.iter().find(|span| span.contains(&matched.start)) {
        Some(span) => *span == matched,
        None => true,
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Variables {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn variable_pattern(name: &str) -> String {
    let escaped = regex::escape(name);
    let ends_in_word = name
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    let bare = if ends_in_word {
        format!(r"{escaped}\b")
    } else {
        escaped.clone()
    };
    format!(r#""{escaped}"|'{escaped}'|{bare}"#)
}

fn quote_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            literal.push('\\');
        }
        literal.push(ch);
    }
    literal.push('"');
    literal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_inside_values_are_escaped() {
        assert_eq!(quote_literal(r#"a"b"#), r#""a\"b""#);
    }

    #[test]
    fn longer_names_win() {
        let vars: Variables = [("@me", "alice"), ("@meta", "bob")].into_iter().collect();
        assert_eq!(vars.substitute("@meta @me"), r#""bob" "alice""#);
    }

    #[test]
    fn only_whole_literals_are_substitutable() {
        let spans = vec![4..9];
        assert!(is_substitutable(&spans, 4..9));
        assert!(!is_substitutable(&spans, 5..8));
        assert!(is_substitutable(&spans, 0..3));
    }
}
