// Shared record fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use prq::PullRequest;
use serde_json::{Value as Json, json};

pub const NOW: &str = "2025-10-01T00:00:00Z";

pub fn now() -> DateTime<Utc> {
    ts(NOW)
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// A pull request with sensible defaults, fields overridden by `overrides`.
pub fn pr(id: &str, overrides: Json) -> PullRequest {
    let mut base = json!({
        "id": id,
        "number": 1,
        "title": "Update dependencies",
        "url": format!("https://github.com/acme/api/pull/{id}"),
        "org": "acme",
        "repo": "api",
        "nameWithOwner": "acme/api",
        "labels": [],
        "state": "OPEN",
        "statusCheckRollup": "SUCCESS",
        "totalCommentsCount": 0,
        "isDraft": false,
        "author": { "login": "derpierre65" },
        "requestedReviewers": [],
        "latestOpinionatedReviews": [],
        "timelineItems": [],
        "createdAt": "2025-09-30T07:27:08Z",
        "updatedAt": "2025-09-30T08:06:53Z",
        "merged": false,
        "calculatedReviewStatus": "pending"
    });

    if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(base).unwrap()
}

pub fn labels(names: &[&str]) -> Json {
    Json::Array(names.iter().map(|name| json!({ "name": name })).collect())
}

pub fn users(logins: &[&str]) -> Json {
    Json::Array(logins.iter().map(|login| json!({ "login": login })).collect())
}

pub fn ids(records: &[&PullRequest]) -> Vec<String> {
    records.iter().map(|record| record.id.clone()).collect()
}
