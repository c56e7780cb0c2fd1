//! Pull-request records as stored by the dashboard.
//!
//! The shape mirrors the GitHub GraphQL payload after it has been flattened
//! for local storage: camelCase keys, connections already unwrapped into
//! plain lists, and timeline items tagged by their `__typename`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A GitHub actor (user or bot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, rename = "__typename", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ActorKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestState::Open => "OPEN",
            PullRequestState::Closed => "CLOSED",
            PullRequestState::Merged => "MERGED",
        }
    }
}

/// Rollup of all status checks on the head commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Success,
    Pending,
    Failure,
    Error,
    Expected,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Success => "SUCCESS",
            CheckStatus::Pending => "PENDING",
            CheckStatus::Failure => "FAILURE",
            CheckStatus::Error => "ERROR",
            CheckStatus::Expected => "EXPECTED",
            CheckStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::Approved => "APPROVED",
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            ReviewState::Commented => "COMMENTED",
            ReviewState::Dismissed => "DISMISSED",
            ReviewState::Pending => "PENDING",
        }
    }
}

/// Review status computed by the dashboard from the opinionated reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    ChangesRequested,
    #[default]
    Pending,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::ChangesRequested => "changes_requested",
            ReviewStatus::Pending => "pending",
        }
    }
}

/// Latest approving or change-requesting review of one reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub author: User,
    pub state: ReviewState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DismissedReview {
    pub author: User,
}

/// Review-request related events from the pull-request timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum TimelineItem {
    #[serde(rename_all = "camelCase")]
    ReviewRequestedEvent {
        #[serde(default)]
        requested_reviewer: Option<User>,
        created_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ReviewRequestRemovedEvent {
        #[serde(default)]
        requested_reviewer: Option<User>,
        created_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ReviewDismissedEvent {
        #[serde(default)]
        review: Option<DismissedReview>,
        created_at: DateTime<Utc>,
    },
}

impl TimelineItem {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            TimelineItem::ReviewRequestedEvent { created_at, .. }
            | TimelineItem::ReviewRequestRemovedEvent { created_at, .. }
            | TimelineItem::ReviewDismissedEvent { created_at, .. } => *created_at,
        }
    }
}

/// One pull request, the record type every predicate is tested against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: String,
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub org: String,
    pub repo: String,
    #[serde(default)]
    pub name_with_owner: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub state: PullRequestState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_check_rollup: CheckStatus,
    #[serde(default)]
    pub total_comments_count: i64,
    #[serde(default)]
    pub is_draft: bool,
    pub author: User,
    #[serde(default)]
    pub requested_reviewers: Vec<User>,
    #[serde(default)]
    pub latest_opinionated_reviews: Vec<Review>,
    #[serde(default)]
    pub timeline_items: Vec<TimelineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calculated_review_status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

/// GitHub sends `null` for a rollup with no checks.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A reviewer entry as shown next to a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerSummary {
    pub name: String,
    /// `APPROVED`, `CHANGES_REQUESTED` or `PENDING`
    pub state: &'static str,
    pub title: &'static str,
}

impl PullRequest {
    /// Opinionated reviewers first, then reviewers still waiting to review.
    pub fn reviewers(&self) -> Vec<ReviewerSummary> {
        let reviewed = self.latest_opinionated_reviews.iter().map(|review| {
            let title = match review.state {
                ReviewState::ChangesRequested => "Changes requested",
                _ => "Approved",
            };
            ReviewerSummary {
                name: review.author.login.clone(),
                state: review.state.as_str(),
                title,
            }
        });
        let pending = self.requested_reviewers.iter().map(|reviewer| ReviewerSummary {
            name: reviewer.login.clone(),
            state: "PENDING",
            title: "Review required",
        });

        reviewed.chain(pending).collect()
    }
}
