use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::utils::time::format_timestamp;

/// All errors that can occur while operating on a timeline.
///
/// Every variant is recoverable at the command boundary: the caller reports the message and
/// must not save the in-memory state afterwards.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    // Activity tree
    #[error("Activity '{0}' does not exist")]
    ActivityNotFound(String),

    #[error("Activity '{0}' already exists")]
    DuplicateActivity(String),

    #[error("Malformed activity path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("Can't create '{path}': parent '{parent}' does not exist")]
    MissingParent { path: String, parent: String },

    #[error("No location was selected for the new activity")]
    NoSelectionMade,

    // Timeline log
    #[error("There is no ongoing activity")]
    NoOngoingActivity,

    #[error("Activity '{0}' is still ongoing")]
    ActivityAlreadyOngoing(String),

    #[error(
        "Clock regression: {} is before {}. Check the system clock",
        show(.at),
        show(.previous)
    )]
    ClockRegression {
        previous: DateTime<Utc>,
        at: DateTime<Utc>,
    },

    // Persistence
    #[error("Timeline of user '{user}' was not found at {path}")]
    UserNotFound { user: String, path: PathBuf },

    #[error("User '{user}' already has a timeline at {path}")]
    UserAlreadyExists { user: String, path: PathBuf },

    #[error("Invalid user name '{0}'")]
    InvalidUserName(String),

    #[error("No default user is configured in {0}. Run `tyme init <user>` first")]
    NoDefaultUser(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupted timeline: {0}")]
    CorruptTimeline(String),
}

fn show(time: &DateTime<Utc>) -> String {
    format_timestamp(*time)
}

impl TimelineError {
    pub fn malformed_path(path: &str, reason: &str) -> Self {
        TimelineError::MalformedPath {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error came from reading or writing persisted state.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            TimelineError::UserNotFound { .. }
                | TimelineError::UserAlreadyExists { .. }
                | TimelineError::NoDefaultUser(_)
                | TimelineError::Io { .. }
                | TimelineError::Malformed { .. }
                | TimelineError::CorruptTimeline(_)
        )
    }
}

pub type TimelineResult<T> = Result<T, TimelineError>;
