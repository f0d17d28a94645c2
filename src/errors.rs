//! Application error types and user-facing error formatting.
//!
//! Provides structured error types for the command layer:
//! - [`IndexError`] for store-level errors (absence drives the "build
//!   first" exit path)
//! - [`TagdexError`] as the unified top-level error type
//!
//! [`TagdexError`] carries contextual hints and exit codes so that
//! `main()` can present human-readable diagnostics on stderr without ever
//! exposing raw panics or debug formatting.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Process exit codes.
///
/// * `0` - success
/// * `1` - general runtime error
/// * `2` - usage / argument error (bad CLI invocation)
/// * `3` - no index store exists for the repository (`query`/`stats`
///   before any `build`)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NO_INDEX: i32 = 3;

// ---------------------------------------------------------------------------
// Layer-specific error types
// ---------------------------------------------------------------------------

/// Errors arising from the SQLite index store.
///
/// `NoIndex` is the only variant that reaches the user as its own exit
/// code; everything else in the engine degrades internally (empty
/// results, zero counts) per the engine's propagation policy.
#[derive(Error, Debug)]
pub enum IndexError {
    /// No index store exists for the current repository.
    #[error("no index found for this repository")]
    NoIndex,

    /// A SQL statement failed at the rusqlite level.
    #[error("index query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),
}

// ---------------------------------------------------------------------------
// Unified application error
// ---------------------------------------------------------------------------

/// Unified error type for the entire application.
///
/// Allows callers to propagate any layer's error through a single `Result`
/// type while still enabling pattern matching on the specific variant.
#[derive(Error, Debug)]
pub enum TagdexError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A usage / argument error (exit code 2).
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TagdexError {
    /// Return the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            TagdexError::Usage(_) => EXIT_USAGE,
            TagdexError::Index(IndexError::NoIndex) => EXIT_NO_INDEX,
            _ => EXIT_ERROR,
        }
    }

    /// Return an optional human-readable hint that may help the user fix
    /// the problem.  Returns `None` when no specific guidance applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            TagdexError::Index(IndexError::NoIndex) => {
                Some("run `tagdex build` to index this repository first")
            }
            TagdexError::Index(IndexError::QueryFailed(_)) => {
                Some("the index may be corrupt; try `tagdex build` to rebuild it")
            }
            TagdexError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Some("verify the file or directory exists")
            }
            TagdexError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Some("check file permissions")
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_usage() {
        let err = TagdexError::Usage("bad flag".into());
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn exit_code_no_index_is_distinct() {
        let err = TagdexError::Index(IndexError::NoIndex);
        assert_eq!(err.exit_code(), EXIT_NO_INDEX);
        assert_ne!(EXIT_NO_INDEX, EXIT_ERROR);
        assert_ne!(EXIT_NO_INDEX, EXIT_SUCCESS);
    }

    #[test]
    fn exit_code_io() {
        let err = TagdexError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn hint_no_index() {
        let err = TagdexError::Index(IndexError::NoIndex);
        assert!(err.hint().unwrap().contains("tagdex build"));
    }

    #[test]
    fn hint_query_failed() {
        let inner =
            rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(1), Some("test".into()));
        let err = TagdexError::Index(IndexError::QueryFailed(inner));
        assert!(err.hint().unwrap().contains("rebuild"));
    }

    #[test]
    fn hint_io_not_found() {
        let err = TagdexError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.hint().unwrap().contains("exists"));
    }

    #[test]
    fn hint_none_for_other() {
        let err = TagdexError::Other(anyhow::anyhow!("something went wrong"));
        assert!(err.hint().is_none());
    }

    #[test]
    fn display_no_debug_formatting() {
        let err = TagdexError::Index(IndexError::NoIndex);
        let msg = format!("{err}");
        // Should be the human-readable message, not Debug output
        assert_eq!(msg, "no index found for this repository");
        assert!(!msg.contains("IndexError"));
        assert!(!msg.contains("NoIndex"));
    }

    #[test]
    fn tagdex_error_from_index_error() {
        let err: TagdexError = IndexError::NoIndex.into();
        assert!(matches!(err, TagdexError::Index(IndexError::NoIndex)));
    }

    #[test]
    fn tagdex_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TagdexError = io_err.into();
        assert!(matches!(err, TagdexError::Io(_)));
    }
}
