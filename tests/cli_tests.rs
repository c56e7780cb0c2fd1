// tests/cli_tests.rs

mod common;

use common::{now, ts};
use pretty_assertions::assert_eq;
use prq::Variables;
use prq::cli::{
    CliError, DocTopic, RunOptions, RunOutcome, execute_apply, execute_filter, get_doc_topic,
    get_docs_overview, parse_records,
};
use serde_json::json;

fn records_json() -> String {
    json!([
        {
            "id": "pr1", "number": 1, "title": "Fix login", "org": "acme", "repo": "api",
            "state": "OPEN", "author": { "login": "octocat" }, "totalCommentsCount": 3,
            "createdAt": "2025-09-28T00:00:00Z", "updatedAt": "2025-09-30T00:00:00Z"
        },
        {
            "id": "pr2", "number": 2, "title": "Docs", "org": "acme", "repo": "web",
            "state": "MERGED", "author": { "login": "alice" }, "totalCommentsCount": 33,
            "labels": [{ "name": "docs" }],
            "createdAt": "2025-09-01T00:00:00Z", "updatedAt": "2025-09-02T00:00:00Z"
        }
    ])
    .to_string()
}

fn options() -> RunOptions {
    RunOptions {
        input: Some(records_json()),
        variables: Variables::with_current_user("octocat"),
        now: Some(now()),
        syntax_only: false,
    }
}

fn matched_ids(outcome: RunOutcome) -> Vec<String> {
    match outcome {
        RunOutcome::Matches { records, count } => {
            let ids: Vec<String> = records
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r["id"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(ids.len(), count);
            ids
        }
        RunOutcome::SyntaxValid => panic!("Expected matches"),
    }
}

// ============================================================================
// Record loading
// ============================================================================

#[test]
fn test_parse_array_and_single_record() {
    assert_eq!(parse_records(&records_json()).unwrap().len(), 2);

    let single = json!({
        "id": "pr9", "number": 9, "title": "t", "org": "o", "repo": "r", "state": "CLOSED",
        "author": { "login": "x" },
        "createdAt": "2025-09-01T00:00:00Z", "updatedAt": "2025-09-01T00:00:00Z"
    });
    let records = parse_records(&single.to_string()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].created_at, ts("2025-09-01T00:00:00Z"));
}

#[test]
fn test_malformed_records() {
    assert!(matches!(parse_records("[{"), Err(CliError::Json(_))));
    assert!(matches!(parse_records(r#"[{"id": "x"}]"#), Err(CliError::Json(_))));
}

// ============================================================================
// filter
// ============================================================================

#[test]
fn test_filter_by_query() {
    let outcome = execute_filter("author = @me createdAt >= -7d", &options()).unwrap();
    assert_eq!(matched_ids(outcome), vec!["pr1"]);
}

#[test]
fn test_filter_round_trips_records() {
    let outcome = execute_filter("label = docs", &options()).unwrap();
    let RunOutcome::Matches { records, .. } = outcome else {
        panic!("Expected matches");
    };
    assert_eq!(records[0]["labels"][0]["name"], "docs");
    assert_eq!(records[0]["totalCommentsCount"], 33);
    assert_eq!(records[0]["state"], "MERGED");
}

#[test]
fn test_filter_syntax_only() {
    let options = RunOptions {
        input: None,
        syntax_only: true,
        ..options()
    };
    assert!(matches!(
        execute_filter("state = OPEN", &options).unwrap(),
        RunOutcome::SyntaxValid
    ));
    assert!(matches!(
        execute_filter("state = (", &options),
        Err(CliError::Filter(_))
    ));
}

#[test]
fn test_filter_without_input() {
    let options = RunOptions {
        input: None,
        ..options()
    };
    assert!(matches!(
        execute_filter("state = OPEN", &options),
        Err(CliError::NoInput)
    ));
}

// ============================================================================
// apply
// ============================================================================

#[test]
fn test_apply_saved_query() {
    let saved = json!({ "id": "f", "name": "Busy", "filters": null, "query": "comments > 10 OR comments = 33" });
    let outcome = execute_apply(&saved.to_string(), &options()).unwrap();
    assert_eq!(matched_ids(outcome), vec!["pr2"]);
}

#[test]
fn test_apply_saved_clauses() {
    let saved = json!({
        "id": "f",
        "name": "Mine",
        "filters": [{ "type": "author", "compare": "includes", "values": ["@me"] }]
    });
    let outcome = execute_apply(&saved.to_string(), &options()).unwrap();
    assert_eq!(matched_ids(outcome), vec!["pr1"]);
}

#[test]
fn test_apply_rejects_bad_document() {
    assert!(matches!(
        execute_apply("{\"filters\": 5}", &options()),
        Err(CliError::Json(_))
    ));
}

// ============================================================================
// docs
// ============================================================================

#[test]
fn test_docs_overview_lists_topics() {
    let overview = get_docs_overview();
    for topic in ["fields", "operators", "durations", "functions", "filters", "variables"] {
        assert!(overview.contains(topic), "missing topic {topic}");
        assert!(DocTopic::from_str(topic).is_some());
        assert!(get_doc_topic(topic).is_ok());
    }
}

#[test]
fn test_doc_topic_aliases() {
    assert_eq!(DocTopic::from_str("ops"), Some(DocTopic::Operators));
    assert_eq!(DocTopic::from_str("VARS"), Some(DocTopic::Variables));
    assert!(get_doc_topic("functions").unwrap().contains("getReviewRequestedAt"));
}

#[test]
fn test_unknown_doc_topic() {
    let err = get_doc_topic("nope").unwrap_err();
    assert!(matches!(err, CliError::UnknownTopic(ref t) if t == "nope"));
    assert!(err.to_string().contains("prq docs"));
}
