//! Relative-time literals (`-7d`, `2h`, `30min`) rewritten to seconds.
//!
//! Runs on the raw query text before lexing, so the grammar itself has no
//! duration syntax: `createdAt >= -7d` reaches the parser as
//! `createdAt >= -604800`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

pub const YEAR: i64 = 31_536_000;
pub const MONTH: i64 = 2_592_000;
pub const WEEK: i64 = 604_800;
pub const DAY: i64 = 86_400;
pub const HOUR: i64 = 3_600;
pub const MINUTE: i64 = 60;
pub const SECOND: i64 = 1;

// Longer spellings come first in each group; the trailing \b keeps `7mo`
// from being read as `7m` + `o`.
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(-?)(\d+(?:\.\d+)?)(years|year|y|months|month|mo|weeks|week|w|days|day|d|hours|hour|hrs|hr|h|minutes|minute|mins|min|m|seconds|second|secs|sec|s)\b",
    )
    .expect("duration pattern is valid")
});

/// Seconds per unit for a recognized (case-sensitive) unit spelling.
pub fn unit_seconds(unit: &str) -> Option<i64> {
    match unit {
        "years" | "year" | "y" => Some(YEAR),
        "months" | "month" | "mo" => Some(MONTH),
        "weeks" | "week" | "w" => Some(WEEK),
        "days" | "day" | "d" => Some(DAY),
        "hours" | "hour" | "hrs" | "hr" | "h" => Some(HOUR),
        "minutes" | "minute" | "mins" | "min" | "m" => Some(MINUTE),
        "seconds" | "second" | "secs" | "sec" | "s" => Some(SECOND),
        _ => None,
    }
}

/// Rewrite duration literals outside quoted strings into signed seconds.
///
/// # Examples
///
/// ```
/// use prq::duration::normalize_durations;
///
/// assert_eq!(normalize_durations("createdAt >= -7d"), "createdAt >= -604800");
/// assert_eq!(normalize_durations(r#"title ~ "2d""#), r#"title ~ "2d""#);
/// ```
pub fn normalize_durations(query: &str) -> String {
    let quoted = quoted_mask(query);

    DURATION
        .replace_all(query, |caps: &Captures| {
            let m = caps.get_match();
            let whole = m.as_str();
            if !is_rewritable(query, &quoted, m.start(), m.end()) {
                return whole.to_string();
            }
            match to_seconds(&caps[1], &caps[2], &caps[3]) {
                Some(seconds) => seconds.to_string(),
                None => whole.to_string(),
            }
        })
        .into_owned()
}

fn to_seconds(sign: &str, number: &str, unit: &str) -> Option<i64> {
    let per_unit = unit_seconds(unit)?;
    let magnitude = if number.contains('.') {
        (number.parse::<f64>().ok()? * per_unit as f64).round() as i64
    } else {
        number.parse::<i64>().ok()?.checked_mul(per_unit)?
    };
    Some(if sign == "-" { -magnitude } else { magnitude })
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

fn is_rewritable(query: &str, quoted: &[bool], start: usize, end: usize) -> bool {
    if quoted[start] {
        return false;
    }
    // Glued to a preceding word (`v2d`, `my-7d`) or touching a quote.
    if let Some(prev) = query[..start].chars().next_back()
        && (prev.is_alphanumeric() || prev == '_' || prev == '.' || is_quote(prev))
    {
        return false;
    }
    if let Some(next) = query[end..].chars().next()
        && is_quote(next)
    {
        return false;
    }
    true
}

/// Byte ranges of the quoted string literals in `query`, quotes included.
/// An unterminated literal runs to the end of the text.
pub(crate) fn quoted_spans(query: &str) -> Vec<Range<usize>> {
    let mut spans = vec![];
    let mut open: Option<(char, usize)> = None;
    let mut escaped = false;

    for (i, ch) in query.char_indices() {
        match open {
            Some((quote, start)) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    spans.push(start..i + ch.len_utf8());
                    open = None;
                }
            }
            None if is_quote(ch) => open = Some((ch, i)),
            None => {}
        }
    }
    if let Some((_, start)) = open {
        spans.push(start..query.len());
    }
    spans
}

/// Per byte: is this position inside a quoted string literal (quotes included)?
fn quoted_mask(query: &str) -> Vec<bool> {
    let mut mask = vec![false; query.len() + 1];
    for span in quoted_spans(query) {
        for slot in &mut mask[span] {
            *slot = true;
        }
    }
    mask
}
