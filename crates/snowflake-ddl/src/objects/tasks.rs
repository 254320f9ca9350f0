//! Tasks.
//!
//! A task runs a SQL statement on a schedule or after its predecessors
//! finish. Tasks linked through `AFTER` form a graph rooted at a scheduled
//! task.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{
    create_tags, set_tags, unset_tags, validate_filters, validate_tags, In, Like, LimitFrom,
    Schedule, TagAssociation,
};
use super::warehouses::WarehouseSize;
use crate::client::Client;
use crate::core::identifier::{
    AccountObjectIdentifier, Identifier, ObjectIdentifier, SchemaObjectIdentifier,
};
use crate::core::traits::Options;
use crate::core::value::sql_enum;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::{Result, SdkError};
use crate::executor;
use crate::mapper::{deserialize_optional_flag, ConvertibleRow};
use crate::validation::{field, list, Rules, ValidationErrors};

sql_enum! {
    pub enum TaskState ("task state") {
        Started = "STARTED",
        Suspended = "SUSPENDED",
    }
}

/// `CONFIG = $$<json>$$`
fn config_literal(config: &str) -> String {
    format!("$${config}$$")
}

fn after_list(after: Option<&[SchemaObjectIdentifier]>) -> Field<'_> {
    Field::values("AFTER", after, Separator::Comma, Modifiers::NO_EQUALS)
}

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] TASK [IF NOT EXISTS] <name> ... AS <sql>`
///
/// Without a warehouse the task runs serverless, optionally sized by
/// `user_task_managed_initial_warehouse_size`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTaskOptions {
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub warehouse: Option<AccountObjectIdentifier>,
    pub user_task_managed_initial_warehouse_size: Option<WarehouseSize>,
    pub schedule: Option<Schedule>,
    pub config: Option<String>,
    pub allow_overlapping_execution: Option<bool>,
    pub user_task_timeout_ms: Option<i64>,
    pub suspend_task_after_num_failures: Option<i64>,
    pub error_integration: Option<AccountObjectIdentifier>,
    pub comment: Option<String>,
    pub finalize: Option<SchemaObjectIdentifier>,
    pub task_auto_retry_attempts: Option<i64>,
    pub tag: Option<Vec<TagAssociation>>,
    pub after: Option<Vec<SchemaObjectIdentifier>>,
    pub when: Option<String>,
    pub sql: String,
}

impl CreateTaskOptions {
    pub fn new(name: SchemaObjectIdentifier, sql: impl Into<String>) -> Self {
        Self {
            name,
            sql: sql.into(),
            ..Default::default()
        }
    }
}

impl Structure for CreateTaskOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        let config = self.config.as_deref().map(config_literal);
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::Static("TASK"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::ident("WAREHOUSE", self.warehouse.as_ref(), Modifiers::EQUALS),
            Field::param(
                "USER_TASK_MANAGED_INITIAL_WAREHOUSE_SIZE",
                self.user_task_managed_initial_warehouse_size.as_ref(),
                Modifiers::SINGLE_QUOTED,
            ),
            Field::param("SCHEDULE", self.schedule.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("CONFIG", config.as_ref(), Modifiers::EQUALS),
            Field::param(
                "ALLOW_OVERLAPPING_EXECUTION",
                self.allow_overlapping_execution.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param("USER_TASK_TIMEOUT_MS", self.user_task_timeout_ms.as_ref(), Modifiers::EQUALS),
            Field::param(
                "SUSPEND_TASK_AFTER_NUM_FAILURES",
                self.suspend_task_after_num_failures.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::ident("ERROR_INTEGRATION", self.error_integration.as_ref(), Modifiers::EQUALS),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::ident("FINALIZE", self.finalize.as_ref(), Modifiers::EQUALS),
            Field::param(
                "TASK_AUTO_RETRY_ATTEMPTS",
                self.task_auto_retry_attempts.as_ref(),
                Modifiers::EQUALS,
            ),
            create_tags(self.tag.as_deref()),
            after_list(self.after.as_deref()),
            Field::param("WHEN", self.when.as_ref(), Modifiers::NO_EQUALS),
            Field::param("AS", Some(&self.sql), Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for CreateTaskOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("CreateTaskOptions");
        rules
            .valid_identifier(&self.name)
            .one_of(&[
                field("OrReplace", &self.or_replace),
                field("IfNotExists", &self.if_not_exists),
            ])
            .one_of(&[
                field("Warehouse", &self.warehouse),
                field(
                    "UserTaskManagedInitialWarehouseSize",
                    &self.user_task_managed_initial_warehouse_size,
                ),
            ])
            .one_of(&[field("Schedule", &self.schedule), list("After", &self.after)])
            .valid_identifier_if_set(self.warehouse.as_ref())
            .valid_identifier_if_set(self.error_integration.as_ref())
            .valid_identifier_if_set(self.finalize.as_ref())
            .int_greater_or_equal("SuspendTaskAfterNumFailures", self.suspend_task_after_num_failures, 0)
            .int_greater_or_equal("TaskAutoRetryAttempts", self.task_auto_retry_attempts, 0)
            .required("Sql", &self.sql);
        if let Some(after) = &self.after {
            rules.valid_identifiers(after);
        }
        validate_tags(&mut rules, self.tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// ALTER
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSet {
    pub warehouse: Option<AccountObjectIdentifier>,
    pub user_task_managed_initial_warehouse_size: Option<WarehouseSize>,
    pub schedule: Option<Schedule>,
    pub config: Option<String>,
    pub allow_overlapping_execution: Option<bool>,
    pub user_task_timeout_ms: Option<i64>,
    pub suspend_task_after_num_failures: Option<i64>,
    pub error_integration: Option<AccountObjectIdentifier>,
    pub comment: Option<String>,
    pub task_auto_retry_attempts: Option<i64>,
}

impl TaskSet {
    fn validate(&self, rules: &mut Rules) {
        rules
            .at_least_one_of(&[
                field("Warehouse", &self.warehouse),
                field(
                    "UserTaskManagedInitialWarehouseSize",
                    &self.user_task_managed_initial_warehouse_size,
                ),
                field("Schedule", &self.schedule),
                field("Config", &self.config),
                field("AllowOverlappingExecution", &self.allow_overlapping_execution),
                field("UserTaskTimeoutMs", &self.user_task_timeout_ms),
                field("SuspendTaskAfterNumFailures", &self.suspend_task_after_num_failures),
                field("ErrorIntegration", &self.error_integration),
                field("Comment", &self.comment),
                field("TaskAutoRetryAttempts", &self.task_auto_retry_attempts),
            ])
            .one_of(&[
                field("Warehouse", &self.warehouse),
                field(
                    "UserTaskManagedInitialWarehouseSize",
                    &self.user_task_managed_initial_warehouse_size,
                ),
            ])
            .valid_identifier_if_set(self.warehouse.as_ref())
            .valid_identifier_if_set(self.error_integration.as_ref());
    }
}

impl Structure for TaskSet {
    fn fields(&self) -> Vec<Field<'_>> {
        let config = self.config.as_deref().map(config_literal);
        vec![
            Field::ident("WAREHOUSE", self.warehouse.as_ref(), Modifiers::EQUALS),
            Field::param(
                "USER_TASK_MANAGED_INITIAL_WAREHOUSE_SIZE",
                self.user_task_managed_initial_warehouse_size.as_ref(),
                Modifiers::SINGLE_QUOTED,
            ),
            Field::param("SCHEDULE", self.schedule.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("CONFIG", config.as_ref(), Modifiers::EQUALS),
            Field::param(
                "ALLOW_OVERLAPPING_EXECUTION",
                self.allow_overlapping_execution.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param("USER_TASK_TIMEOUT_MS", self.user_task_timeout_ms.as_ref(), Modifiers::EQUALS),
            Field::param(
                "SUSPEND_TASK_AFTER_NUM_FAILURES",
                self.suspend_task_after_num_failures.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::ident("ERROR_INTEGRATION", self.error_integration.as_ref(), Modifiers::EQUALS),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param(
                "TASK_AUTO_RETRY_ATTEMPTS",
                self.task_auto_retry_attempts.as_ref(),
                Modifiers::EQUALS,
            ),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUnset {
    pub warehouse: Option<bool>,
    pub schedule: Option<bool>,
    pub config: Option<bool>,
    pub allow_overlapping_execution: Option<bool>,
    pub user_task_timeout_ms: Option<bool>,
    pub suspend_task_after_num_failures: Option<bool>,
    pub error_integration: Option<bool>,
    pub comment: Option<bool>,
    pub task_auto_retry_attempts: Option<bool>,
}

impl Structure for TaskUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("WAREHOUSE", self.warehouse),
            Field::flag("SCHEDULE", self.schedule),
            Field::flag("CONFIG", self.config),
            Field::flag("ALLOW_OVERLAPPING_EXECUTION", self.allow_overlapping_execution),
            Field::flag("USER_TASK_TIMEOUT_MS", self.user_task_timeout_ms),
            Field::flag("SUSPEND_TASK_AFTER_NUM_FAILURES", self.suspend_task_after_num_failures),
            Field::flag("ERROR_INTEGRATION", self.error_integration),
            Field::flag("COMMENT", self.comment),
            Field::flag("TASK_AUTO_RETRY_ATTEMPTS", self.task_auto_retry_attempts),
        ]
    }
}

/// `ALTER TASK [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterTaskOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub resume: Option<bool>,
    pub suspend: Option<bool>,
    pub remove_after: Option<Vec<SchemaObjectIdentifier>>,
    pub add_after: Option<Vec<SchemaObjectIdentifier>>,
    pub set: Option<TaskSet>,
    pub unset: Option<TaskUnset>,
    pub set_tag: Option<Vec<TagAssociation>>,
    pub unset_tag: Option<Vec<Identifier>>,
    pub modify_as: Option<String>,
    pub modify_when: Option<String>,
    pub remove_when: Option<bool>,
}

impl AlterTaskOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for AlterTaskOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER TASK"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::flag("RESUME", self.resume),
            Field::flag("SUSPEND", self.suspend),
            Field::values(
                "REMOVE AFTER",
                self.remove_after.as_deref(),
                Separator::Comma,
                Modifiers::NO_EQUALS,
            ),
            Field::values(
                "ADD AFTER",
                self.add_after.as_deref(),
                Separator::Comma,
                Modifiers::NO_EQUALS,
            ),
            Field::record("SET", self.set.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            set_tags(self.set_tag.as_deref()),
            unset_tags(self.unset_tag.as_deref()),
            Field::param("MODIFY AS", self.modify_as.as_ref(), Modifiers::NO_EQUALS),
            Field::param("MODIFY WHEN", self.modify_when.as_ref(), Modifiers::NO_EQUALS),
            Field::flag("REMOVE WHEN", self.remove_when),
        ]
    }
}

impl Options for AlterTaskOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterTaskOptions");
        rules.valid_identifier(&self.name).exactly_one_of(&[
            field("Resume", &self.resume),
            field("Suspend", &self.suspend),
            list("RemoveAfter", &self.remove_after),
            list("AddAfter", &self.add_after),
            field("Set", &self.set),
            field("Unset", &self.unset),
            list("SetTag", &self.set_tag),
            list("UnsetTag", &self.unset_tag),
            field("ModifyAs", &self.modify_as),
            field("ModifyWhen", &self.modify_when),
            field("RemoveWhen", &self.remove_when),
        ]);
        for after in [&self.add_after, &self.remove_after].into_iter().flatten() {
            rules.valid_identifiers(after);
        }
        if let Some(set) = &self.set {
            rules.nested("Set", |r| set.validate(r));
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| {
                r.at_least_one_of(&[
                    field("Warehouse", &unset.warehouse),
                    field("Schedule", &unset.schedule),
                    field("Config", &unset.config),
                    field("AllowOverlappingExecution", &unset.allow_overlapping_execution),
                    field("UserTaskTimeoutMs", &unset.user_task_timeout_ms),
                    field("SuspendTaskAfterNumFailures", &unset.suspend_task_after_num_failures),
                    field("ErrorIntegration", &unset.error_integration),
                    field("Comment", &unset.comment),
                    field("TaskAutoRetryAttempts", &unset.task_auto_retry_attempts),
                ]);
            });
        }
        validate_tags(&mut rules, self.set_tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// DROP / SHOW / DESCRIBE / EXECUTE
// =============================================================================

/// `DROP TASK [IF EXISTS] <name>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropTaskOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,
}

impl DropTaskOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropTaskOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP TASK"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DropTaskOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropTaskOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW [TERSE] TASKS [LIKE ...] [IN ...] [STARTS WITH ...] [ROOT ONLY] [LIMIT ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowTaskOptions {
    pub terse: Option<bool>,
    pub like: Option<Like>,
    pub r#in: Option<In>,
    pub starts_with: Option<String>,
    pub root_only: Option<bool>,
    pub limit: Option<LimitFrom>,
}

impl Structure for ShowTaskOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW"),
            Field::flag("TERSE", self.terse),
            Field::Static("TASKS"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("IN", self.r#in.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::param(
                "STARTS WITH",
                self.starts_with.as_ref(),
                Modifiers::NO_EQUALS.single_quotes(),
            ),
            Field::flag("ROOT ONLY", self.root_only),
            Field::record("", self.limit.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowTaskOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowTaskOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

#[derive(Debug, Clone, Default)]
struct DescribeTaskOptions {
    name: SchemaObjectIdentifier,
}

impl Structure for DescribeTaskOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DESCRIBE TASK"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DescribeTaskOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DescribeTaskOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `EXECUTE TASK <name> [RETRY LAST]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExecuteTaskOptions {
    pub name: SchemaObjectIdentifier,
    pub retry_last: Option<bool>,
}

impl ExecuteTaskOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            retry_last: None,
        }
    }
}

impl Structure for ExecuteTaskOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("EXECUTE TASK"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::flag("RETRY LAST", self.retry_last),
        ]
    }
}

impl Options for ExecuteTaskOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("ExecuteTaskOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    created_on: DateTime<Utc>,
    name: String,
    id: String,
    database_name: String,
    schema_name: String,
    owner: String,
    comment: Option<String>,
    warehouse: Option<String>,
    schedule: Option<String>,
    predecessors: Option<String>,
    state: String,
    definition: String,
    condition: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    allow_overlapping_execution: bool,
    error_integration: Option<String>,
    #[serde(default)]
    config: Option<String>,
    #[serde(default)]
    owner_role_type: Option<String>,
}

/// A task as reported by `SHOW TASKS` and `DESCRIBE TASK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub id: String,
    pub database_name: String,
    pub schema_name: String,
    pub owner: String,
    pub comment: String,
    pub warehouse: Option<String>,
    pub schedule: Option<Schedule>,
    pub predecessors: Vec<SchemaObjectIdentifier>,
    pub state: TaskState,
    pub definition: String,
    pub condition: Option<String>,
    pub allow_overlapping_execution: bool,
    pub error_integration: Option<String>,
    pub config: Option<String>,
    pub owner_role_type: Option<String>,
}

impl Task {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }

    /// Root tasks have no predecessors.
    pub fn is_root(&self) -> bool {
        self.predecessors.is_empty()
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty() && v != "null")
}

/// Predecessors arrive as a JSON array of fully qualified names.
fn parse_predecessors(raw: Option<&str>) -> Result<Vec<SchemaObjectIdentifier>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };
    let names: Vec<String> = serde_json::from_str(raw)?;
    names
        .iter()
        .map(|n| n.parse::<SchemaObjectIdentifier>().map_err(SdkError::from))
        .collect()
}

impl ConvertibleRow for TaskRow {
    type Plain = Task;

    fn convert(&self) -> Result<Task> {
        let schedule = present(&self.schedule)
            .map(|s| s.parse::<Schedule>())
            .transpose()?;
        Ok(Task {
            created_on: self.created_on,
            name: self.name.clone(),
            id: self.id.clone(),
            database_name: self.database_name.clone(),
            schema_name: self.schema_name.clone(),
            owner: self.owner.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            warehouse: present(&self.warehouse),
            schedule,
            predecessors: parse_predecessors(self.predecessors.as_deref())?,
            state: self.state.parse()?,
            definition: self.definition.clone(),
            condition: present(&self.condition),
            allow_overlapping_execution: self.allow_overlapping_execution,
            error_integration: present(&self.error_integration),
            config: present(&self.config),
            owner_role_type: self.owner_role_type.clone(),
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Task operations, obtained from [`Client::tasks`].
pub struct Tasks<'a> {
    client: &'a Client,
}

impl<'a> Tasks<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateTaskOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterTaskOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropTaskOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowTaskOptions>) -> Result<Vec<Task>> {
        let default = ShowTaskOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, TaskRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<Task> {
        let opts = ShowTaskOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::schema(id.schema_id())),
            ..Default::default()
        };
        let tasks = self.show(Some(&opts)).await?;
        executor::show_by_id(tasks, |t| t.name == id.name())
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifier) -> Result<Task> {
        let opts = DescribeTaskOptions { name: id.clone() };
        executor::validate_and_query_one::<_, TaskRow>(self.client, Some(&opts)).await
    }

    pub async fn execute(&self, opts: &ExecuteTaskOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }
}
