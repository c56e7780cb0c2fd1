//! Field resolution: user-facing names to record values.
//!
//! Resolution happens in two stages. [`resolve_alias`] maps a user-facing
//! name to its canonical record field name and is total: a name without an
//! alias is returned unchanged. [`Field::from_name`] then looks the canonical
//! name up in the closed set of record fields. Names that are not record
//! fields resolve to [`Value::Null`].

use crate::record::PullRequest;
use crate::value::Value;

/// User-facing alias → canonical field name.
pub const ALIASES: &[(&str, &str)] = &[
    ("draft", "isDraft"),
    ("organization", "org"),
    ("repository", "repo"),
    ("reviewStatus", "calculatedReviewStatus"),
    ("comments", "totalCommentsCount"),
    ("userReviewRequested", "requestedReviewers"),
    ("reviewedBy", "latestOpinionatedReviews"),
    ("label", "labels"),
];

pub fn resolve_alias(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Canonical record fields usable in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Number,
    Title,
    Url,
    Org,
    Repo,
    NameWithOwner,
    Labels,
    State,
    StatusCheckRollup,
    TotalCommentsCount,
    IsDraft,
    Author,
    RequestedReviewers,
    LatestOpinionatedReviews,
    CreatedAt,
    UpdatedAt,
    LastEditedAt,
    Merged,
    CalculatedReviewStatus,
    FetchedAt,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::Id,
        Field::Number,
        Field::Title,
        Field::Url,
        Field::Org,
        Field::Repo,
        Field::NameWithOwner,
        Field::Labels,
        Field::State,
        Field::StatusCheckRollup,
        Field::TotalCommentsCount,
        Field::IsDraft,
        Field::Author,
        Field::RequestedReviewers,
        Field::LatestOpinionatedReviews,
        Field::CreatedAt,
        Field::UpdatedAt,
        Field::LastEditedAt,
        Field::Merged,
        Field::CalculatedReviewStatus,
        Field::FetchedAt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Number => "number",
            Field::Title => "title",
            Field::Url => "url",
            Field::Org => "org",
            Field::Repo => "repo",
            Field::NameWithOwner => "nameWithOwner",
            Field::Labels => "labels",
            Field::State => "state",
            Field::StatusCheckRollup => "statusCheckRollup",
            Field::TotalCommentsCount => "totalCommentsCount",
            Field::IsDraft => "isDraft",
            Field::Author => "author",
            Field::RequestedReviewers => "requestedReviewers",
            Field::LatestOpinionatedReviews => "latestOpinionatedReviews",
            Field::CreatedAt => "createdAt",
            Field::UpdatedAt => "updatedAt",
            Field::LastEditedAt => "lastEditedAt",
            Field::Merged => "merged",
            Field::CalculatedReviewStatus => "calculatedReviewStatus",
            Field::FetchedAt => "fetchedAt",
        }
    }

    /// Look up a canonical field name (aliases must be resolved first).
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Resolve a user-facing name, following aliases.
    pub fn lookup(name: &str) -> Option<Field> {
        Field::from_name(resolve_alias(name))
    }

    /// Extract this field from a record, applying its projection.
    ///
    /// Relations collapse to identifiers: `author` is the author login,
    /// `labels` the label names, `requestedReviewers` and
    /// `latestOpinionatedReviews` the reviewer logins.
    pub fn project(&self, pr: &PullRequest) -> Value {
        match self {
            Field::Id => Value::String(pr.id.clone()),
            Field::Number => Value::Integer(pr.number),
            Field::Title => Value::String(pr.title.clone()),
            Field::Url => Value::String(pr.url.clone()),
            Field::Org => Value::String(pr.org.clone()),
            Field::Repo => Value::String(pr.repo.clone()),
            Field::NameWithOwner => Value::String(pr.name_with_owner.clone()),
            Field::Labels => strings(pr.labels.iter().map(|label| &label.name)),
            Field::State => Value::from(pr.state.as_str()),
            Field::StatusCheckRollup => Value::from(pr.status_check_rollup.as_str()),
            Field::TotalCommentsCount => Value::Integer(pr.total_comments_count),
            Field::IsDraft => Value::Boolean(pr.is_draft),
            Field::Author => Value::String(pr.author.login.clone()),
            Field::RequestedReviewers => strings(pr.requested_reviewers.iter().map(|u| &u.login)),
            Field::LatestOpinionatedReviews => strings(
                pr.latest_opinionated_reviews
                    .iter()
                    .map(|review| &review.author.login),
            ),
            Field::CreatedAt => Value::Timestamp(pr.created_at),
            Field::UpdatedAt => Value::Timestamp(pr.updated_at),
            Field::LastEditedAt => pr.last_edited_at.map(Value::Timestamp).unwrap_or(Value::Null),
            Field::Merged => Value::Boolean(pr.merged),
            Field::CalculatedReviewStatus => Value::from(pr.calculated_review_status.as_str()),
            Field::FetchedAt => pr.fetched_at.map(Value::Timestamp).unwrap_or(Value::Null),
        }
    }
}

fn strings<'a>(items: impl Iterator<Item = &'a String>) -> Value {
    Value::List(items.map(|s| Value::String(s.clone())).collect())
}

/// Resolve a user-facing field name against a record.
pub fn resolve(pr: &PullRequest, name: &str) -> Value {
    match Field::lookup(name) {
        Some(field) => field.project(pr),
        None => Value::Null,
    }
}
