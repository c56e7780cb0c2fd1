use chrono::{DateTime, NaiveDate, Utc};

/// A value produced while evaluating a predicate against a record.
///
/// Field projections, literals and built-in functions all produce values of
/// this type. Lists are the projection of multi-valued fields such as label
/// names or reviewer logins.
///
/// # Examples
///
/// ```
/// use prq::Value;
///
/// let labels = Value::List(vec![Value::String("bug".to_string())]);
/// assert!(labels.is_truthy());
/// assert_eq!(labels.unwrap_singleton(), Value::String("bug".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing or unknown field
    Null,

    Boolean(bool),

    Integer(i64),

    Float(f64),

    String(String),

    /// Absolute instant (`createdAt`, review dates, ...)
    Timestamp(DateTime<Utc>),

    /// Projection of a multi-valued field
    List(Vec<Value>),
}

impl Value {
    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Integer(n) => *n != 0,
            Float(n) => *n != 0.0 && !n.is_nan(),
            String(s) => !s.is_empty(),
            Timestamp(_) => true,
            List(items) => !items.is_empty(),
        }
    }

    /// Get as float, coercing numeric-looking values
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Get as string (for display, joining and containment checks)
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Timestamp(t) => t.to_rfc3339(),
            Value::Null => String::new(),
            Value::List(items) => items
                .iter()
                .map(Value::as_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// A one-element list stands for its only element.
    pub fn unwrap_singleton(self) -> Value {
        match self {
            Value::List(mut items) if items.len() == 1 => items.remove(0),
            other => other,
        }
    }

    /// Normalize to a list: lists stay as they are, scalars become one-element lists.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            other => vec![other],
        }
    }

    /// Resolve to an instant for ordering comparisons.
    ///
    /// Numbers are offsets in seconds relative to `now`, so `-604800` means
    /// "one week ago". Strings are accepted as RFC 3339 timestamps or plain
    /// `YYYY-MM-DD` dates (midnight UTC).
    pub fn to_timestamp(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::Integer(n) => now.checked_add_signed(chrono::TimeDelta::try_seconds(*n)?),
            Value::Float(n) if n.is_finite() => {
                let millis = (n * 1000.0).round() as i64;
                now.checked_add_signed(chrono::TimeDelta::try_milliseconds(millis)?)
            }
            Value::String(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

/// Parse a date string the way record fields and query literals are written.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(input) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Returns a human-readable type name for a Value
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Timestamp(_) => "timestamp",
        Value::List(_) => "list",
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}
