//! Error types for the SDK.

use thiserror::Error;

use crate::core::identifier::IdentifierError;
use crate::ddl::SqlError;
use crate::validation::ValidationErrors;

/// Main error type for SDK operations.
#[derive(Error, Debug)]
pub enum SdkError {
    /// The options value handed to an operation was absent.
    #[error("options cannot be nil")]
    NilOptions,

    /// The options value failed validation; carries every violation.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The options value could not be rendered.
    #[error("SQL rendering failed: {0}")]
    Sql(#[from] SqlError),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    /// A show-by-id lookup found nothing. The service reports missing and
    /// unauthorized objects the same way, so both surface here.
    #[error("object does not exist or not authorized")]
    ObjectNotExistOrAuthorized,

    /// No element of a result list matched the predicate.
    #[error("object does not exist")]
    ObjectNotFound,

    /// A column value is not a known member of an enum.
    #[error("invalid {kind}: {value}")]
    InvalidEnum { kind: &'static str, value: String },

    /// A single-row query returned zero or more than one row.
    #[error("expected exactly one row, got {0}")]
    UnexpectedRowCount(usize),

    /// The executor failed to run a statement.
    #[error("executor error: {message}\n  SQL: {sql}")]
    Executor { message: String, sql: String },

    /// The call was cancelled through the client's cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// The statement exceeded the configured timeout.
    #[error("statement timed out after {0}s")]
    Timeout(u64),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error, including row binding failures (missing column, NULL into
    /// a non-nullable field, type mismatch).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SdkError {
    /// Create an Executor error for a statement.
    pub fn executor(message: impl Into<String>, sql: impl Into<String>) -> Self {
        SdkError::Executor {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// Create an InvalidEnum error.
    pub fn invalid_enum(kind: &'static str, value: impl Into<String>) -> Self {
        SdkError::InvalidEnum {
            kind,
            value: value.into(),
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            SdkError::Config(_) | SdkError::Yaml(_) => 1,
            SdkError::NilOptions | SdkError::Validation(_) => 2,
            SdkError::Sql(_) | SdkError::Identifier(_) | SdkError::InvalidEnum { .. } => 3,
            SdkError::ObjectNotExistOrAuthorized | SdkError::ObjectNotFound => 4,
            SdkError::Executor { .. }
            | SdkError::UnexpectedRowCount(_)
            | SdkError::Json(_)
            | SdkError::Timeout(_) => 5,
            SdkError::Cancelled => 6,
            SdkError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;
