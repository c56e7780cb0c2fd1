//! JSON <-> record conversion

use crate::PullRequest;

use super::CliError;

/// Parse records from JSON: an array of pull requests or a single one.
pub fn parse_records(json: &str) -> Result<Vec<PullRequest>, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let records: Vec<PullRequest> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(records)
}

/// Serialize matched records back to a JSON array
pub fn records_to_json(records: &[&PullRequest]) -> Result<serde_json::Value, CliError> {
    Ok(serde_json::to_value(records)?)
}
