//! In-memory executor.
//!
//! Records every statement it is handed and replays queued result sets in
//! order. Backs the CLI's render command and the SDK tests; no connection
//! is ever opened.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::core::traits::{ExecResult, Executor, Row};
use crate::error::{Result, SdkError};

enum Reply {
    Rows(Vec<Row>),
    Error(String),
}

/// Executor that records statements instead of running them.
#[derive(Default)]
pub struct RecordingExecutor {
    statements: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Reply>>,
    delay: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingExecutor {
    /// Create an executor with no queued replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before every reply. Used to exercise timeouts and cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue the rows returned by the next query.
    pub fn push_rows(&self, rows: Vec<Row>) {
        lock(&self.replies).push_back(Reply::Rows(rows));
    }

    /// Queue a failure for the next statement.
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.replies).push_back(Reply::Error(message.into()));
    }

    /// Every statement received so far, in order.
    pub fn statements(&self) -> Vec<String> {
        lock(&self.statements).clone()
    }

    pub fn last_statement(&self) -> Option<String> {
        lock(&self.statements).last().cloned()
    }

    /// Forget recorded statements and queued replies.
    pub fn clear(&self) {
        lock(&self.statements).clear();
        lock(&self.replies).clear();
    }

    async fn record(&self, sql: &str) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        debug!(sql, "recorded statement");
        lock(&self.statements).push(sql.to_string());
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn exec(&self, sql: &str) -> Result<ExecResult> {
        self.record(sql).await;
        let mut replies = lock(&self.replies);
        if matches!(replies.front(), Some(Reply::Error(_))) {
            if let Some(Reply::Error(message)) = replies.pop_front() {
                return Err(SdkError::executor(message, sql));
            }
        }
        Ok(ExecResult::default())
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        self.record(sql).await;
        match lock(&self.replies).pop_front() {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Error(message)) => Err(SdkError::executor(message, sql)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(name: &str) -> Row {
        match json!({ "name": name }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_records_in_order() {
        let executor = RecordingExecutor::new();
        executor.exec("CREATE WAREHOUSE \"a\"").await.unwrap();
        executor.query("SHOW WAREHOUSES").await.unwrap();
        assert_eq!(
            executor.statements(),
            vec!["CREATE WAREHOUSE \"a\"", "SHOW WAREHOUSES"]
        );
        assert_eq!(executor.last_statement().as_deref(), Some("SHOW WAREHOUSES"));
    }

    #[tokio::test]
    async fn test_replays_queued_rows() {
        let executor = RecordingExecutor::new();
        executor.push_rows(vec![row("a"), row("b")]);
        let rows = executor.query("SHOW WAREHOUSES").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(executor.query("SHOW WAREHOUSES").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_one_requires_single_row() {
        let executor = RecordingExecutor::new();
        executor.push_rows(vec![row("a"), row("b")]);
        let err = executor.query_one("DESCRIBE WAREHOUSE \"a\"").await.unwrap_err();
        assert!(matches!(err, SdkError::UnexpectedRowCount(2)));

        executor.push_rows(vec![row("a")]);
        assert!(executor.query_one("DESCRIBE WAREHOUSE \"a\"").await.is_ok());
    }

    #[tokio::test]
    async fn test_queued_error_fails_next_statement() {
        let executor = RecordingExecutor::new();
        executor.push_error("warehouse already exists");
        let err = executor.exec("CREATE WAREHOUSE \"a\"").await.unwrap_err();
        match err {
            SdkError::Executor { message, sql } => {
                assert_eq!(message, "warehouse already exists");
                assert_eq!(sql, "CREATE WAREHOUSE \"a\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(executor.exec("CREATE WAREHOUSE \"a\"").await.is_ok());
    }

    #[tokio::test]
    async fn test_clear() {
        let executor = RecordingExecutor::new();
        executor.push_rows(vec![row("a")]);
        executor.exec("DROP WAREHOUSE \"a\"").await.unwrap();
        executor.clear();
        assert!(executor.statements().is_empty());
        assert!(executor.query("SHOW WAREHOUSES").await.unwrap().is_empty());
    }
}
