//! Error kinds surfaced by the reconciliation job.

use std::fmt;
use thiserror::Error;

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;

/// Which enrichment table a lookup went to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LookupKind {
    Student,
    Schedule,
    Room,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupKind::Student => "student",
            LookupKind::Schedule => "course schedule",
            LookupKind::Room => "subcourse room",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Could not connect to the database: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("No {lookup} found for {key}")]
    LookupNotFound { lookup: LookupKind, key: String },

    #[error("Write failed: {0}")]
    Write(String),
}

#[cfg(feature = "database")]
impl From<diesel::result::Error> for ReconcileError {
    /// Errors that reach a transaction boundary without being classified
    /// come from `BEGIN`/`COMMIT` themselves.
    fn from(err: diesel::result::Error) -> Self {
        ReconcileError::Write(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_not_found_message() {
        let err = ReconcileError::LookupNotFound {
            lookup: LookupKind::Student,
            key: "s42/7".to_string(),
        };
        assert_eq!(err.to_string(), "No student found for s42/7");
    }

    #[test]
    fn test_lookup_kind_display() {
        assert_eq!(LookupKind::Schedule.to_string(), "course schedule");
        assert_eq!(LookupKind::Room.to_string(), "subcourse room");
    }
}
