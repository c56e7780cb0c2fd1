// tests/integration_tests.rs

mod common;

use common::{ids, labels, now, pr, users};
use pretty_assertions::assert_eq;
use prq::{
    EvalError, FilterEngine, FilterError, Predicate, PullRequest, SavedFilter, Variables,
};
use serde_json::json;

fn run(records: &[PullRequest], query: &str) -> Vec<String> {
    run_with(records, query, &Variables::with_current_user("derpierre65"))
}

fn run_with(records: &[PullRequest], query: &str, vars: &Variables) -> Vec<String> {
    let matched = FilterEngine::new()
        .filter_at(records, &Predicate::Query(query), vars, now())
        .unwrap();
    ids(&matched)
}

fn count(records: &[PullRequest], query: &str) -> usize {
    run(records, query).len()
}

fn label_records() -> Vec<PullRequest> {
    vec![
        pr("pr1", json!({ "labels": labels(&["my-label"]) })),
        pr("pr2", json!({ "labels": labels(&["my-label", "my-second-label"]) })),
        pr("pr3", json!({ "labels": labels(&["foo", "bar"]) })),
    ]
}

fn comment_records() -> Vec<PullRequest> {
    vec![
        pr("pr1", json!({ "totalCommentsCount": 3 })),
        pr("pr2", json!({ "totalCommentsCount": 33 })),
        pr("pr3", json!({ "totalCommentsCount": 33 })),
    ]
}

// ============================================================================
// Aliases
// ============================================================================

#[test]
fn test_alias_and_canonical_name_agree() {
    let records = vec![
        pr(
            "pr1",
            json!({
                "isDraft": true,
                "totalCommentsCount": 4,
                "calculatedReviewStatus": "approved",
                "requestedReviewers": users(&["alice"]),
                "latestOpinionatedReviews": [
                    { "author": { "login": "bob" }, "state": "APPROVED" }
                ],
                "labels": labels(&["bug"])
            }),
        ),
        pr("pr2", json!({ "org": "umbrella", "repo": "web" })),
    ];

    let pairs = [
        ("draft", "isDraft", "true"),
        ("organization", "org", "umbrella"),
        ("repository", "repo", "web"),
        ("reviewStatus", "calculatedReviewStatus", "approved"),
        ("comments", "totalCommentsCount", "4"),
        ("userReviewRequested", "requestedReviewers", "alice"),
        ("reviewedBy", "latestOpinionatedReviews", "bob"),
        ("label", "labels", "bug"),
    ];

    for (alias, canonical, value) in pairs {
        let via_alias = run(&records, &format!("{alias} = {value}"));
        let via_field = run(&records, &format!("{canonical} = {value}"));
        assert_eq!(via_alias, via_field, "alias {alias} differs from {canonical}");
        assert_eq!(via_alias.len(), 1, "alias {alias} should match one record");
    }
}

#[test]
fn test_unknown_field_is_null() {
    let records = vec![pr("pr1", json!({}))];
    assert_eq!(count(&records, "nosuchfield = anything"), 0);
    assert_eq!(count(&records, "nosuchfield = null"), 1);
    assert_eq!(count(&records, "lastEditedAt = null"), 1);
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_equality_is_case_insensitive() {
    let records = vec![pr("pr1", json!({ "author": { "login": "derpierre65" } }))];
    assert_eq!(
        run(&records, "author = DERPIERRE65"),
        run(&records, "author = derpierre65")
    );
    assert_eq!(count(&records, "author = DERPIERRE65"), 1);
    assert_eq!(count(&records, "state = open"), 1);
    assert_eq!(count(&records, "state == 'Open'"), 1);
}

#[test]
fn test_not_equal_spellings() {
    let records = vec![pr("pr1", json!({})), pr("pr2", json!({ "state": "MERGED" }))];
    assert_eq!(run(&records, "state != OPEN"), vec!["pr2"]);
    assert_eq!(run(&records, "state <> OPEN"), vec!["pr2"]);
}

#[test]
fn test_singleton_list_unwraps() {
    let records = vec![pr("pr1", json!({ "labels": labels(&["foo"]) }))];
    assert_eq!(count(&records, r#"labels = "foo""#), 1);
    assert_eq!(count(&records, r#"labels != "foo""#), 0);
}

#[test]
fn test_equality_on_list_is_membership() {
    let records = label_records();
    assert_eq!(run(&records, r#"labels = "my-label""#), vec!["pr1", "pr2"]);
    assert_eq!(run(&records, r#"labels = "bar""#), vec!["pr3"]);
}

#[test]
fn test_boolean_fields() {
    let records = vec![pr("pr1", json!({ "isDraft": true })), pr("pr2", json!({}))];
    assert_eq!(run(&records, "draft = true"), vec!["pr1"]);
    assert_eq!(run(&records, "draft = false"), vec!["pr2"]);
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn test_in_is_an_any_test() {
    let records = label_records();
    assert_eq!(run(&records, r#"labels IN ("my-label")"#), vec!["pr1", "pr2"]);
    assert_eq!(count(&records, r#"labels IN ("my-label")"#), 2);
}

#[test]
fn test_not_in_excludes_any_overlap() {
    let records = label_records();
    assert_eq!(run(&records, r#"labels NOT IN ("my-label")"#), vec!["pr3"]);
    assert_eq!(count(&records, r#"labels NOT IN ("my-label")"#), 1);
}

#[test]
fn test_in_with_bare_words() {
    let records = vec![
        pr("pr1", json!({})),
        pr("pr2", json!({ "state": "MERGED" })),
        pr("pr3", json!({ "state": "CLOSED" })),
    ];
    assert_eq!(run(&records, "state IN (open, merged)"), vec!["pr1", "pr2"]);
    assert_eq!(run(&records, "state NOT IN (open, merged)"), vec!["pr3"]);
}

#[test]
fn test_numbers_in_list() {
    let records = comment_records();
    assert_eq!(count(&records, "totalCommentsCount IN (33,1,2,3)"), 3);
    assert_eq!(run(&records, "comments IN (1, 2, 3)"), vec!["pr1"]);
}

// ============================================================================
// Logical operators
// ============================================================================

#[test]
fn test_comment_counts_end_to_end() {
    let records = comment_records();
    assert_eq!(count(&records, "totalCommentsCount IN (33,1,2,3)"), 3);
    assert_eq!(
        count(&records, "totalCommentsCount = 3 OR totalCommentsCount = 33"),
        3
    );
    assert_eq!(run(&records, "comments = 33"), vec!["pr2", "pr3"]);
}

#[test]
fn test_juxtaposition_is_and() {
    let records = vec![
        pr("pr1", json!({})),
        pr("pr2", json!({ "state": "CLOSED" })),
        pr("pr3", json!({ "author": { "login": "someone" } })),
    ];
    let implicit = run(&records, "author = @me state = OPEN");
    let explicit = run(&records, "author = @me AND state = OPEN");
    assert_eq!(implicit, explicit);
    assert_eq!(implicit, vec!["pr1"]);
}

#[test]
fn test_and_binds_tighter_than_or() {
    let records = vec![
        pr("pr1", json!({ "repo": "web" })),
        pr("pr2", json!({ "state": "CLOSED", "isDraft": true })),
        pr("pr3", json!({ "state": "CLOSED" })),
    ];
    assert_eq!(
        run(&records, "repo = web OR state = closed AND draft = true"),
        vec!["pr1", "pr2"]
    );
    assert_eq!(
        run(&records, "(repo = web OR state = closed) draft = false"),
        vec!["pr1", "pr3"]
    );
}

#[test]
fn test_symbolic_logical_operators() {
    let records = vec![pr("pr1", json!({})), pr("pr2", json!({ "repo": "web" }))];
    assert_eq!(run(&records, "repo = web || repo = api"), vec!["pr1", "pr2"]);
    assert_eq!(run(&records, "repo = web && draft = false"), vec!["pr2"]);
}

#[test]
fn test_empty_query_matches_everything() {
    let records = label_records();
    assert_eq!(count(&records, ""), 3);
}

// ============================================================================
// Containment
// ============================================================================

#[test]
fn test_contains_is_case_insensitive() {
    let records = vec![
        pr("pr1", json!({ "title": "Fix login redirect" })),
        pr("pr2", json!({ "title": "Add metrics" })),
    ];
    assert_eq!(run(&records, "title ~ FIX"), vec!["pr1"]);
    assert_eq!(run(&records, r#"title ~ "login re""#), vec!["pr1"]);
}

#[test]
fn test_contains_over_list_field() {
    let records = label_records();
    assert_eq!(run(&records, "labels ~ second"), vec!["pr2"]);
}

// ============================================================================
// Time comparisons
// ============================================================================

#[test]
fn test_relative_duration_window() {
    let records = vec![
        pr("seven", json!({ "createdAt": "2025-09-24T00:00:00Z" })),
        pr("eight", json!({ "createdAt": "2025-09-23T00:00:00Z" })),
    ];
    assert_eq!(run(&records, "createdAt >= -7d"), vec!["seven"]);
    assert_eq!(run(&records, "createdAt < -7days"), vec!["eight"]);
    assert_eq!(run(&records, "createdAt >= -1w"), vec!["seven"]);
}

#[test]
fn test_absolute_date_literal() {
    let records = vec![
        pr("pr1", json!({ "updatedAt": "2025-09-30T08:06:53Z" })),
        pr("pr2", json!({ "updatedAt": "2025-08-01T00:00:00Z" })),
    ];
    assert_eq!(run(&records, r#"updatedAt > "2025-09-01""#), vec!["pr1"]);
    assert_eq!(
        run(&records, r#"updatedAt <= "2025-08-01T00:00:00Z""#),
        vec!["pr2"]
    );
}

#[test]
fn test_ordering_non_timestamps_is_false() {
    let records = vec![pr("pr1", json!({}))];
    assert_eq!(count(&records, "title > 5"), 0);
    assert_eq!(count(&records, "title < 5"), 0);
    assert_eq!(count(&records, "lastEditedAt < 0"), 0);
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_plus_adds() {
    let records = vec![pr("pr1", json!({ "totalCommentsCount": 3 }))];
    assert_eq!(count(&records, "comments + 1 = 4"), 1);
    assert_eq!(count(&records, "comments + 1 = 2"), 0);
    assert_eq!(count(&records, "comments - 1 = 2"), 1);
}

#[test]
fn test_arithmetic_in_durations() {
    let records = vec![pr("pr1", json!({ "createdAt": "2025-09-29T12:00:00Z" }))];
    assert_eq!(count(&records, "createdAt >= -1d - 12h"), 1);
    assert_eq!(count(&records, "createdAt >= -1d + 1s"), 0);
}

// ============================================================================
// Variables
// ============================================================================

#[test]
fn test_current_user_variable() {
    let records = vec![
        pr("pr1", json!({ "author": { "login": "octocat" } })),
        pr("pr2", json!({ "requestedReviewers": users(&["octocat", "alice"]) })),
    ];
    let vars = Variables::with_current_user("octocat");
    assert_eq!(run_with(&records, "author = @me", &vars), vec!["pr1"]);
    assert_eq!(run_with(&records, "author = \"@me\"", &vars), vec!["pr1"]);
    assert_eq!(
        run_with(&records, "userReviewRequested IN (@me)", &vars),
        vec!["pr2"]
    );
}

#[test]
fn test_variable_inside_search_text_stays_literal() {
    let records = vec![
        pr("pr1", json!({ "title": "Ping @me when green" })),
        pr("pr2", json!({ "title": "Ping octocat" })),
    ];
    let vars = Variables::with_current_user("octocat");
    assert_eq!(
        run_with(&records, r#"title ~ "ping @me""#, &vars),
        vec!["pr1"]
    );
}

#[test]
fn test_custom_variables() {
    let records = vec![pr("pr1", json!({})), pr("pr2", json!({ "repo": "web" }))];
    let mut vars = Variables::new();
    vars.insert("$repo", "web");
    assert_eq!(run_with(&records, "repo = $repo", &vars), vec!["pr2"]);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_review_date_in_query() {
    let records = vec![
        pr(
            "recent",
            json!({
                "latestOpinionatedReviews": [{
                    "author": { "login": "bob" },
                    "state": "APPROVED",
                    "createdAt": "2025-09-30T12:00:00Z"
                }]
            }),
        ),
        pr("none", json!({})),
    ];
    assert_eq!(run(&records, "getReviewDate(APPROVED) >= -2d"), vec!["recent"]);
    assert_eq!(run(&records, "getReviewDate() >= -2d"), vec!["recent"]);
    assert_eq!(
        run(&records, "getReviewDate(CHANGES_REQUESTED) >= -2d"),
        Vec::<String>::new()
    );
}

#[test]
fn test_review_requested_at_in_query() {
    let records = vec![
        pr(
            "waiting",
            json!({
                "timelineItems": [{
                    "__typename": "ReviewRequestedEvent",
                    "requestedReviewer": { "login": "alice" },
                    "createdAt": "2025-09-25T00:00:00Z"
                }]
            }),
        ),
        pr("none", json!({})),
    ];
    assert_eq!(
        run(&records, "getReviewRequestedAt(latest) <= -3d"),
        vec!["waiting"]
    );
    assert_eq!(run(&records, "getReviewRequestedAt() = null"), vec!["none"]);
}

#[test]
fn test_request_modes_pick_opposite_ends() {
    let records = vec![pr(
        "pr1",
        json!({
            "timelineItems": [
                {
                    "__typename": "ReviewRequestedEvent",
                    "requestedReviewer": { "login": "alice" },
                    "createdAt": "2025-09-20T00:00:00Z"
                },
                {
                    "__typename": "ReviewRequestedEvent",
                    "requestedReviewer": { "login": "bob" },
                    "createdAt": "2025-09-30T00:00:00Z"
                }
            ]
        }),
    )];
    assert_eq!(
        run(&records, "getReviewRequestedAt(newest) <= -7d"),
        Vec::<String>::new()
    );
    assert_eq!(
        run(&records, "getReviewRequestedAt(latest) <= -7d"),
        vec!["pr1"]
    );
}

#[test]
fn test_oldest_request_mode_is_an_error() {
    let records = vec![pr("pr1", json!({}))];
    let err = FilterEngine::new()
        .filter_at(
            &records,
            &Predicate::Query("getReviewRequestedAt(\"oldest\") <= -1d"),
            &Variables::new(),
            now(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        FilterError::Eval(EvalError::InvalidArgument { ref function, .. }) if function == "getReviewRequestedAt"
    ));
}

#[test]
fn test_unknown_function_is_an_error() {
    let records = vec![pr("pr1", json!({}))];
    let err = FilterEngine::new()
        .filter_at(
            &records,
            &Predicate::Query("nope(1) = 1"),
            &Variables::new(),
            now(),
        )
        .unwrap_err();
    assert_eq!(
        err,
        FilterError::Eval(EvalError::InvalidFunction {
            name: "nope".to_string(),
            record: "pr1".to_string(),
        })
    );
}

#[test]
fn test_invalid_request_mode_is_an_error() {
    let records = vec![pr("pr1", json!({}))];
    let err = FilterEngine::new()
        .filter_at(
            &records,
            &Predicate::Query("getReviewRequestedAt(sideways) = null"),
            &Variables::new(),
            now(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        FilterError::Eval(EvalError::InvalidArgument { .. })
    ));
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn test_parse_error_surfaces() {
    let records = vec![pr("pr1", json!({}))];
    let err = FilterEngine::new()
        .filter_at(&records, &Predicate::Query("state = (OPEN"), &Variables::new(), now())
        .unwrap_err();
    assert!(matches!(err, FilterError::Parse(_)));
}

#[test]
fn test_compile_is_deterministic() {
    let records = label_records();
    let engine = FilterEngine::new();
    let vars = Variables::new();
    let query = r#"labels IN ("my-label") OR label ~ foo"#;

    let first = engine.compile(query, &vars).unwrap();
    let second = engine.compile(query, &vars).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        ids(&first.filter_at(&records, now()).unwrap()),
        ids(&second.filter_at(&records, now()).unwrap())
    );
    assert_eq!(run(&records, query), run(&records, query));
}

#[test]
fn test_compiled_query_keeps_texts() {
    let vars = Variables::with_current_user("octocat");
    let compiled = FilterEngine::new()
        .compile("author = @me createdAt >= -7d", &vars)
        .unwrap();
    assert_eq!(compiled.source(), "author = @me createdAt >= -7d");
    assert_eq!(
        compiled.normalized(),
        r#"author = "octocat" createdAt >= -604800"#
    );
}

#[test]
fn test_results_keep_input_order() {
    let records = vec![
        pr("c", json!({})),
        pr("a", json!({})),
        pr("b", json!({ "state": "CLOSED" })),
        pr("d", json!({})),
    ];
    assert_eq!(run(&records, "state = OPEN"), vec!["c", "a", "d"]);
}

#[test]
fn test_saved_filter_falls_back_to_query() {
    let records = label_records();
    let saved: SavedFilter = serde_json::from_value(json!({
        "id": "f1",
        "name": "Mine",
        "filters": null,
        "query": "labels IN (foo)"
    }))
    .unwrap();

    let matched = FilterEngine::new()
        .apply_at(&records, &saved, &Variables::new(), now())
        .unwrap();
    assert_eq!(ids(&matched), vec!["pr3"]);
}

#[test]
fn test_saved_filter_prefers_clauses() {
    let records = label_records();
    let saved: SavedFilter = serde_json::from_value(json!({
        "id": "f2",
        "name": "Labelled",
        "showAsNotification": true,
        "filters": [
            { "type": "label", "compare": "includes", "values": ["my-second-label"] }
        ],
        "query": "this is ignored ((("
    }))
    .unwrap();

    let matched = FilterEngine::new()
        .apply_at(&records, &saved, &Variables::new(), now())
        .unwrap();
    assert_eq!(ids(&matched), vec!["pr2"]);
    assert_eq!(saved.show_as_notification, Some(true));
}
