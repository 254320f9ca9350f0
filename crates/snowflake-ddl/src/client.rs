//! SDK client.
//!
//! [`Client`] owns the executor, the client settings and a cancellation
//! token. Object accessors (`client.warehouses()`, ...) borrow it and route
//! every statement through [`Client::exec`] / [`Client::query`], which apply
//! statement logging, the optional timeout and cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::core::traits::{ExecResult, Executor, Row};
use crate::error::{Result, SdkError};
use crate::objects::{
    accounts::Accounts, alerts::Alerts, databases::Databases, external_tables::ExternalTables,
    functions::Functions, network_policies::NetworkPolicies, pipes::Pipes,
    procedures::Procedures, schemas::Schemas, tags::Tags, tasks::Tasks, warehouses::Warehouses,
};

/// Entry point of the SDK.
#[derive(Clone)]
pub struct Client {
    executor: Arc<dyn Executor>,
    config: ClientConfig,
    cancel: CancellationToken,
}

impl Client {
    /// Create a client with default settings.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self::with_config(executor, ClientConfig::default())
    }

    pub fn with_config(executor: Arc<dyn Executor>, config: ClientConfig) -> Self {
        Self {
            executor,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Token observed by every call. Cancelling it fails in-flight and
    /// future calls with [`SdkError::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run a statement that returns no rows.
    pub async fn exec(&self, sql: &str) -> Result<ExecResult> {
        if self.skip(sql) {
            return Ok(ExecResult::default());
        }
        self.guarded(self.executor.exec(sql)).await
    }

    /// Run a statement and return every row.
    pub async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        if self.skip(sql) {
            return Ok(Vec::new());
        }
        self.guarded(self.executor.query(sql)).await
    }

    /// Run a statement that must return exactly one row.
    pub async fn query_one(&self, sql: &str) -> Result<Row> {
        if self.skip(sql) {
            return Err(SdkError::UnexpectedRowCount(0));
        }
        self.guarded(self.executor.query_one(sql)).await
    }

    /// Log the statement; true when it must not be sent (dry run).
    fn skip(&self, sql: &str) -> bool {
        if self.config.dry_run {
            info!(sql, "dry run, statement not sent");
            return true;
        }
        if self.config.log_statements {
            debug!(sql, "executing statement");
        }
        false
    }

    async fn guarded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let cancellable = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(SdkError::Cancelled),
                result = call => result,
            }
        };
        match self.config.statement_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), cancellable)
                .await
                .map_err(|_| SdkError::Timeout(secs))?,
            None => cancellable.await,
        }
    }

    pub fn accounts(&self) -> Accounts<'_> {
        Accounts::new(self)
    }

    pub fn warehouses(&self) -> Warehouses<'_> {
        Warehouses::new(self)
    }

    pub fn databases(&self) -> Databases<'_> {
        Databases::new(self)
    }

    pub fn schemas(&self) -> Schemas<'_> {
        Schemas::new(self)
    }

    pub fn alerts(&self) -> Alerts<'_> {
        Alerts::new(self)
    }

    pub fn pipes(&self) -> Pipes<'_> {
        Pipes::new(self)
    }

    pub fn network_policies(&self) -> NetworkPolicies<'_> {
        NetworkPolicies::new(self)
    }

    pub fn external_tables(&self) -> ExternalTables<'_> {
        ExternalTables::new(self)
    }

    pub fn tasks(&self) -> Tasks<'_> {
        Tasks::new(self)
    }

    pub fn functions(&self) -> Functions<'_> {
        Functions::new(self)
    }

    pub fn procedures(&self) -> Procedures<'_> {
        Procedures::new(self)
    }

    pub fn tags(&self) -> Tags<'_> {
        Tags::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RecordingExecutor;

    #[tokio::test]
    async fn test_exec_records_statement() {
        let executor = Arc::new(RecordingExecutor::new());
        let client = Client::new(executor.clone());
        client.exec("ALTER WAREHOUSE \"wh\" SUSPEND").await.unwrap();
        assert_eq!(executor.statements(), vec!["ALTER WAREHOUSE \"wh\" SUSPEND"]);
    }

    #[tokio::test]
    async fn test_dry_run_skips_executor() {
        let executor = Arc::new(RecordingExecutor::new());
        let config = ClientConfig {
            dry_run: true,
            ..ClientConfig::default()
        };
        let client = Client::with_config(executor.clone(), config);
        client.exec("DROP WAREHOUSE \"wh\"").await.unwrap();
        assert!(client.query("SHOW WAREHOUSES").await.unwrap().is_empty());
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_client_fails_calls() {
        let executor = Arc::new(RecordingExecutor::new());
        let client = Client::new(executor.clone());
        client.cancel();
        let err = client.exec("SHOW WAREHOUSES").await.unwrap_err();
        assert!(matches!(err, SdkError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_in_flight_call() {
        let executor = Arc::new(RecordingExecutor::new().with_delay(Duration::from_secs(30)));
        let client = Client::new(executor);
        let token = client.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = client.query("SHOW WAREHOUSES").await.unwrap_err();
        assert!(matches!(err, SdkError::Cancelled));
    }

    #[tokio::test]
    async fn test_statement_timeout() {
        let executor = Arc::new(RecordingExecutor::new().with_delay(Duration::from_secs(5)));
        let config = ClientConfig {
            statement_timeout_secs: Some(1),
            ..ClientConfig::default()
        };
        let client = Client::with_config(executor, config);
        let err = client.exec("SHOW WAREHOUSES").await.unwrap_err();
        assert!(matches!(err, SdkError::Timeout(1)));
        assert_eq!(err.exit_code(), 5);
    }
}
