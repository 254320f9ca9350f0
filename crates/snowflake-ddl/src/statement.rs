//! Declarative statement plans.
//!
//! A [`Plan`] is a YAML list of options records tagged by `kind`:
//!
//! ```yaml
//! statements:
//!   - kind: create_warehouse
//!     name: wh1
//!     warehouse_size: XSMALL
//!   - kind: drop_database
//!     if_exists: true
//!     name: scratch
//! ```
//!
//! Plans validate and render without a connection, which is what the CLI
//! uses; [`Plan::execute`] runs them through a [`Client`].

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::client::Client;
use crate::core::traits::Options;
use crate::error::{Result, SdkError};
use crate::executor;
use crate::objects::{
    accounts::AlterAccountOptions,
    alerts::{AlterAlertOptions, CreateAlertOptions, DropAlertOptions},
    databases::{AlterDatabaseOptions, CreateDatabaseOptions, DropDatabaseOptions, UndropDatabaseOptions},
    external_tables::{CreateExternalTableOptions, DropExternalTableOptions},
    functions::DropFunctionOptions,
    network_policies::{AlterNetworkPolicyOptions, CreateNetworkPolicyOptions, DropNetworkPolicyOptions},
    pipes::{AlterPipeOptions, CreatePipeOptions, DropPipeOptions},
    procedures::{CallProcedureOptions, DropProcedureOptions},
    schemas::{AlterSchemaOptions, CreateSchemaOptions, DropSchemaOptions},
    tags::{AlterTagOptions, CreateTagOptions, DropTagOptions},
    tasks::{AlterTaskOptions, CreateTaskOptions, DropTaskOptions, ExecuteTaskOptions},
    warehouses::{AlterWarehouseOptions, CreateWarehouseOptions, DropWarehouseOptions},
};
use crate::validation::ValidationErrors;

macro_rules! statements {
    ($($kind:literal => $variant:ident($options:ty)),+ $(,)?) => {
        /// One statement of a plan.
        #[derive(Debug, Clone, Deserialize)]
        #[serde(tag = "kind")]
        pub enum Statement {
            $(
                #[serde(rename = $kind)]
                $variant($options),
            )+
        }

        impl Statement {
            /// The `kind` tag of the statement.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $kind,)+
                }
            }

            pub fn as_options(&self) -> &dyn Options {
                match self {
                    $(Self::$variant(opts) => opts,)+
                }
            }
        }

        $(
            impl From<$options> for Statement {
                fn from(opts: $options) -> Self {
                    Self::$variant(opts)
                }
            }
        )+
    };
}

statements! {
    "alter_account" => AlterAccount(AlterAccountOptions),
    "create_warehouse" => CreateWarehouse(CreateWarehouseOptions),
    "alter_warehouse" => AlterWarehouse(AlterWarehouseOptions),
    "drop_warehouse" => DropWarehouse(DropWarehouseOptions),
    "create_database" => CreateDatabase(CreateDatabaseOptions),
    "alter_database" => AlterDatabase(AlterDatabaseOptions),
    "drop_database" => DropDatabase(DropDatabaseOptions),
    "undrop_database" => UndropDatabase(UndropDatabaseOptions),
    "create_schema" => CreateSchema(CreateSchemaOptions),
    "alter_schema" => AlterSchema(AlterSchemaOptions),
    "drop_schema" => DropSchema(DropSchemaOptions),
    "create_alert" => CreateAlert(CreateAlertOptions),
    "alter_alert" => AlterAlert(AlterAlertOptions),
    "drop_alert" => DropAlert(DropAlertOptions),
    "create_pipe" => CreatePipe(CreatePipeOptions),
    "alter_pipe" => AlterPipe(AlterPipeOptions),
    "drop_pipe" => DropPipe(DropPipeOptions),
    "create_network_policy" => CreateNetworkPolicy(CreateNetworkPolicyOptions),
    "alter_network_policy" => AlterNetworkPolicy(AlterNetworkPolicyOptions),
    "drop_network_policy" => DropNetworkPolicy(DropNetworkPolicyOptions),
    "create_external_table" => CreateExternalTable(CreateExternalTableOptions),
    "drop_external_table" => DropExternalTable(DropExternalTableOptions),
    "create_task" => CreateTask(CreateTaskOptions),
    "alter_task" => AlterTask(AlterTaskOptions),
    "drop_task" => DropTask(DropTaskOptions),
    "execute_task" => ExecuteTask(ExecuteTaskOptions),
    "create_tag" => CreateTag(CreateTagOptions),
    "alter_tag" => AlterTag(AlterTagOptions),
    "drop_tag" => DropTag(DropTagOptions),
    "drop_function" => DropFunction(DropFunctionOptions),
    "drop_procedure" => DropProcedure(DropProcedureOptions),
    "call_procedure" => CallProcedure(CallProcedureOptions),
}

impl Statement {
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        self.as_options().validate()
    }

    /// Validate and render the statement.
    pub fn to_sql(&self) -> Result<String> {
        executor::render(Some(self.as_options()))
    }
}

/// Validation failures of one plan statement.
#[derive(Debug, Clone)]
pub struct StatementErrors {
    /// Zero-based position in the plan.
    pub index: usize,
    pub kind: &'static str,
    pub errors: ValidationErrors,
}

/// An ordered list of statements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Plan {
    /// Load a plan from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let plan: Plan = serde_yaml::from_str(yaml)?;
        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Validate every statement, collecting failures instead of stopping
    /// at the first one.
    pub fn validate(&self) -> Vec<StatementErrors> {
        self.statements
            .iter()
            .enumerate()
            .filter_map(|(index, stmt)| {
                stmt.validate().err().map(|errors| StatementErrors {
                    index,
                    kind: stmt.kind(),
                    errors,
                })
            })
            .collect()
    }

    /// Render every statement in order. Fails on the first invalid one.
    pub fn render(&self) -> Result<Vec<String>> {
        self.statements.iter().map(Statement::to_sql).collect()
    }

    /// Run every statement in order, stopping at the first failure.
    /// Returns the number of statements run.
    pub async fn execute(&self, client: &Client) -> Result<usize> {
        let sqls = self.render()?;
        info!(statements = sqls.len(), "executing plan");
        for (index, sql) in sqls.iter().enumerate() {
            debug!(index, "plan statement");
            client.exec(sql).await.map_err(|err| match err {
                SdkError::Executor { message, sql } => SdkError::Executor {
                    message: format!("statement {}: {}", index + 1, message),
                    sql,
                },
                other => other,
            })?;
        }
        Ok(sqls.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::identifier::AccountObjectIdentifier;
    use crate::executor::RecordingExecutor;
    use crate::validation::ValidationError;

    const PLAN: &str = r#"
statements:
  - kind: create_warehouse
    name: wh1
    warehouse_type: standard
    warehouse_size: X-SMALL
  - kind: drop_database
    if_exists: true
    name: db
    cascade: true
  - kind: call_procedure
    name: db.sch.p
    arguments: ["1", "'x'"]
"#;

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_parse_plan() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        assert_eq!(plan.statements.len(), 3);
        assert_eq!(plan.statements[0].kind(), "create_warehouse");
        assert_eq!(plan.statements[2].kind(), "call_procedure");
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = Plan::from_yaml("statements:\n  - kind: create_unicorn\n    name: u\n").unwrap_err();
        assert!(matches!(err, SdkError::Yaml(_)));
    }

    #[test]
    fn test_parse_bad_identifier() {
        let err = Plan::from_yaml("statements:\n  - kind: drop_warehouse\n    name: a.b\n").unwrap_err();
        assert!(matches!(err, SdkError::Yaml(_)));
    }

    #[test]
    fn test_empty_plan() {
        let plan = Plan::from_yaml("statements: []\n").unwrap();
        assert!(plan.is_empty());
        assert!(plan.render().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Plan::load("/nonexistent/plan.yaml").unwrap_err();
        assert!(matches!(err, SdkError::Io(_)));
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn test_render_plan() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        assert_eq!(
            plan.render().unwrap(),
            vec![
                "CREATE WAREHOUSE \"wh1\" WAREHOUSE_TYPE = 'STANDARD' WAREHOUSE_SIZE = 'XSMALL'",
                "DROP DATABASE IF EXISTS \"db\" CASCADE",
                "CALL \"db\".\"sch\".\"p\" (1, 'x')",
            ]
        );
    }

    #[test]
    fn test_from_options() {
        let stmt: Statement = DropWarehouseOptions::new(AccountObjectIdentifier::new("wh1")).into();
        assert_eq!(stmt.kind(), "drop_warehouse");
        assert_eq!(stmt.to_sql().unwrap(), "DROP WAREHOUSE \"wh1\"");
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_validate_collects_every_statement() {
        let plan = Plan::from_yaml(
            r#"
statements:
  - kind: drop_warehouse
    name: '""'
  - kind: drop_warehouse
    name: ok
  - kind: call_procedure
    name: '""."".""'
"#,
        )
        .unwrap();

        let failures = plan.validate();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 0);
        assert_eq!(failures[1].index, 2);
        assert_eq!(failures[1].kind, "call_procedure");
        assert_eq!(
            failures[1].errors.as_slice(),
            &[ValidationError::InvalidObjectIdentifier]
        );
        assert!(matches!(plan.render().unwrap_err(), SdkError::Validation(_)));
    }

    #[test]
    fn test_missing_fields_reach_validation() {
        let plan = Plan::from_yaml("statements:\n  - kind: create_pipe\n    name: db.sch.p\n").unwrap();

        let failures = plan.validate();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].errors.to_string().contains("CopyStatement"));
    }

    // =========================================================================
    // Execution
    // =========================================================================

    #[tokio::test]
    async fn test_execute_runs_in_order() {
        let executor = Arc::new(RecordingExecutor::new());
        let client = Client::new(executor.clone());
        let plan = Plan::from_yaml(PLAN).unwrap();

        assert_eq!(plan.execute(&client).await.unwrap(), 3);
        assert_eq!(executor.statements().len(), 3);
        assert_eq!(
            executor.last_statement().unwrap(),
            "CALL \"db\".\"sch\".\"p\" (1, 'x')"
        );
    }

    #[tokio::test]
    async fn test_execute_stops_at_failure() {
        let executor = Arc::new(RecordingExecutor::new());
        executor.push_error("boom");
        let client = Client::new(executor.clone());
        let plan = Plan::from_yaml(PLAN).unwrap();

        let err = plan.execute(&client).await.unwrap_err();
        match err {
            SdkError::Executor { message, .. } => assert!(message.starts_with("statement 1:")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(executor.statements().len(), 1);
    }
}
