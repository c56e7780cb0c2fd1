//! Built-in functions callable from queries.
//!
//! ```text
//! getReviewDate()                    latest APPROVED review
//! getReviewDate("CHANGES_REQUESTED") latest change request
//! getReviewRequestedAt()             newest outstanding review request
//! getReviewRequestedAt("latest")     earliest outstanding review request
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    evaluator::{EvalContext, EvalError},
    record::{PullRequest, TimelineItem},
    value::{Value, type_name},
};

/// Names of every built-in function.
pub const FUNCTION_NAMES: &[&str] = &["getReviewDate", "getReviewRequestedAt"];

/// Outstanding review requests: reviewer login → when it was requested.
pub type ReviewRequests = BTreeMap<String, DateTime<Utc>>;

/// Which outstanding request `getReviewRequestedAt` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Most recent request.
    Newest,
    /// Earliest request still outstanding.
    Latest,
}

impl RequestMode {
    pub fn parse(mode: &str) -> Option<Self> {
        if mode.eq_ignore_ascii_case("newest") {
            Some(RequestMode::Newest)
        } else if mode.eq_ignore_ascii_case("latest") {
            Some(RequestMode::Latest)
        } else {
            None
        }
    }
}

/// Dispatch a call to its implementation
pub fn call(name: &str, args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    match name {
        "getReviewDate" => {
            let state = string_arg(name, args, 0, "APPROVED")?;
            Ok(Value::Timestamp(review_date(ctx.record, &state)))
        }
        "getReviewRequestedAt" => {
            let mode = string_arg(name, args, 0, "newest")?;
            let mode = RequestMode::parse(&mode).ok_or_else(|| EvalError::InvalidArgument {
                function: name.to_string(),
                message: format!("mode must be \"newest\" or \"latest\", got \"{}\"", mode),
            })?;
            Ok(review_requested_at(ctx.review_requests(), mode)
                .map(Value::Timestamp)
                .unwrap_or(Value::Null))
        }
        _ => Err(EvalError::InvalidFunction {
            name: name.to_string(),
            record: ctx.record.id.clone(),
        }),
    }
}

fn string_arg(function: &str, args: &[Value], index: usize, default: &str) -> Result<String, EvalError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::List(_)) | Some(Value::Timestamp(_)) => Err(EvalError::InvalidArgument {
            function: function.to_string(),
            message: format!(
                "argument {} must be a string, got {}",
                index + 1,
                type_name(&args[index])
            ),
        }),
        Some(value) => Ok(value.as_string()),
    }
}

/// Latest opinionated review in `state`, or the Unix epoch if there is none.
pub fn review_date(pr: &PullRequest, state: &str) -> DateTime<Utc> {
    pr.latest_opinionated_reviews
        .iter()
        .filter(|review| review.state.as_str().eq_ignore_ascii_case(state))
        .filter_map(|review| review.created_at)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Replay the review-request timeline into the requests still open.
///
/// A request adds (or refreshes) the reviewer; a removed request or a
/// dismissed review takes them out again. Events are replayed in time order.
pub fn outstanding_review_requests(pr: &PullRequest) -> ReviewRequests {
    let mut events: Vec<&TimelineItem> = pr.timeline_items.iter().collect();
    events.sort_by_key(|item| item.created_at());

    let mut requests = ReviewRequests::new();
    for event in events {
        match event {
            TimelineItem::ReviewRequestedEvent {
                requested_reviewer: Some(reviewer),
                created_at,
            } => {
                requests.insert(reviewer.login.clone(), *created_at);
            }
            TimelineItem::ReviewRequestRemovedEvent {
                requested_reviewer: Some(reviewer),
                ..
            } => {
                requests.remove(&reviewer.login);
            }
            TimelineItem::ReviewDismissedEvent {
                review: Some(review),
                ..
            } => {
                requests.remove(&review.author.login);
            }
            // Team reviewers and deleted accounts carry no login.
            _ => {}
        }
    }
    requests
}

pub fn review_requested_at(requests: &ReviewRequests, mode: RequestMode) -> Option<DateTime<Utc>> {
    let times = requests.values().copied();
    match mode {
        RequestMode::Newest => times.max(),
        RequestMode::Latest => times.min(),
    }
}
