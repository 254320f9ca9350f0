//! Core traits for statement execution.
//!
//! This module defines the seams between the SDK and the outside world:
//!
//! - [`Executor`]: Runs rendered SQL and returns raw rows
//! - [`Options`]: An options record that validates and renders itself
//!
//! # Design Patterns
//!
//! - **Strategy**: any transport that can run SQL plugs in as an `Executor`
//! - **Template Method**: `query_one` is defined once on top of `query`

use async_trait::async_trait;

use crate::ddl::Structure;
use crate::error::{Result, SdkError};
use crate::validation::ValidationErrors;

/// One result row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
}

/// Run SQL text against a Snowflake session.
///
/// The SDK never opens connections itself; a driver or a test double
/// implements this trait and is handed to [`Client`](crate::client::Client).
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement that returns no rows.
    async fn exec(&self, sql: &str) -> Result<ExecResult>;

    /// Run a statement and return every row.
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;

    /// Run a statement that must return exactly one row.
    async fn query_one(&self, sql: &str) -> Result<Row> {
        let mut rows = self.query(sql).await?;
        if rows.len() != 1 {
            return Err(SdkError::UnexpectedRowCount(rows.len()));
        }
        Ok(rows.remove(0))
    }
}

/// An options record: validated, then rendered.
pub trait Options: Structure + Send + Sync {
    /// Check every rule of the record, collecting all violations.
    fn validate(&self) -> std::result::Result<(), ValidationErrors>;
}
