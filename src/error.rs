//! Error types for console operations
//!
//! Errors are classified by what the operator can do about them:
//! - Auth: nobody signed in, or the signed-in user lacks the feature permission
//! - Input: validation failures, bad import rows, unsupported operations
//! - NotFound: the referenced record does not exist
//! - Storage: database, file and configuration failures

use std::path::PathBuf;
use thiserror::Error;

use crate::db::DbError;
use crate::permissions::{Access, Feature};

/// Error types for console operations
#[derive(Debug, Error)]
pub enum ConsoleError {
    // Auth errors
    #[error("No authenticated user")]
    NotAuthenticated,

    #[error("Permission denied: {feature} requires {needed}")]
    PermissionDenied { feature: Feature, needed: Access },

    // Input errors
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Import aborted at row {row}: {source}")]
    ImportRow {
        row: usize,
        #[source]
        source: Box<ConsoleError>,
    },

    #[error("Could not generate a unique {prefix} id after {attempts} attempts")]
    IdGeneration { prefix: String, attempts: usize },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // Not found
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    // Storage errors
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Spreadsheet error in {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ConsoleError {
    /// Shorthand for a field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConsoleError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        ConsoleError::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::NotAuthenticated | ConsoleError::PermissionDenied { .. } => {
                ErrorKind::Auth
            }
            ConsoleError::Validation { .. }
            | ConsoleError::ImportRow { .. }
            | ConsoleError::IdGeneration { .. }
            | ConsoleError::UnsupportedOperation(_) => ErrorKind::Input,
            ConsoleError::NotFound { .. } => ErrorKind::NotFound,
            ConsoleError::Store(_)
            | ConsoleError::Spreadsheet { .. }
            | ConsoleError::Config(_)
            | ConsoleError::Io(_) => ErrorKind::Storage,
        }
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ConsoleError::NotAuthenticated => "Sign in and try again.",
            ConsoleError::PermissionDenied { .. } => {
                "Ask an administrator to grant the required role."
            }
            ConsoleError::Validation { .. } => "Correct the highlighted field and resubmit.",
            ConsoleError::ImportRow { .. } => {
                "Fix the reported row in the spreadsheet and import again."
            }
            ConsoleError::IdGeneration { .. } => "Try again; the id space may be crowded.",
            ConsoleError::UnsupportedOperation(_) => "This record type does not allow that action.",
            ConsoleError::NotFound { .. } => "The record may have been removed. Refresh the list.",
            ConsoleError::Store(_) => "Check the database file and disk space.",
            ConsoleError::Spreadsheet { .. } => "Check the file is a valid CSV or Excel workbook.",
            ConsoleError::Config(_) => "Check your configuration in ~/.bizops/config.json",
            ConsoleError::Io(_) => "Check file permissions and disk space.",
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Io(err.to_string())
    }
}

/// Serializable error representation for display
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub kind: ErrorKind,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    Input,
    NotFound,
    Storage,
}

impl From<&ConsoleError> for ErrorReport {
    fn from(err: &ConsoleError) -> Self {
        ErrorReport {
            message: err.to_string(),
            kind: err.kind(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ConsoleError::NotAuthenticated.kind(), ErrorKind::Auth);
        assert_eq!(
            ConsoleError::validation("name", "required").kind(),
            ErrorKind::Input
        );
        assert_eq!(
            ConsoleError::not_found("Account", "ACC-1234").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ConsoleError::Config("bad".to_string()).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_import_row_message_includes_cause() {
        let err = ConsoleError::ImportRow {
            row: 3,
            source: Box::new(ConsoleError::validation("name", "is required")),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("'name'"));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let err = ConsoleError::PermissionDenied {
            feature: Feature::Expenses,
            needed: Access::FullAccess,
        };
        let report = ErrorReport::from(&err);
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["kind"], "auth");
        assert!(json["recoverySuggestion"].as_str().is_some());
        assert!(json["message"]
            .as_str()
            .unwrap_or_default()
            .contains("Expenses requires full access"));
    }
}
