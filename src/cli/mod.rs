//! CLI support for prq
//!
//! Provides programmatic access to the `prq` commands so they can be
//! embedded or tested without spawning the binary.

mod convert;
mod docs;
mod run;

pub use convert::{parse_records, records_to_json};
pub use docs::{DocTopic, get_doc_topic, get_docs_overview};
pub use run::{RunOptions, RunOutcome, execute_apply, execute_filter};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Filter(#[from] crate::FilterError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON records to stdin.")]
    NoInput,

    #[error("Unknown topic: '{0}'\nRun 'prq docs' to see available topics.")]
    UnknownTopic(String),
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Filter(e.into())
    }
}
