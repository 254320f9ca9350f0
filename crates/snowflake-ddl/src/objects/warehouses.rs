//! Warehouses.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{create_tags, set_tags, unset_tags, validate_tags, Like, TagAssociation};
use crate::client::Client;
use crate::core::identifier::{AccountObjectIdentifier, Identifier, ObjectIdentifier};
use crate::core::traits::Options;
use crate::core::value::sql_enum;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_flag, deserialize_lenient_int, deserialize_optional_flag, ConvertibleRow};
use crate::validation::{field, list, Rules, ValidationErrors};

sql_enum! {
    pub enum WarehouseType ("warehouse type") {
        Standard = "STANDARD",
        SnowparkOptimized = "SNOWPARK-OPTIMIZED" | "SNOWPARK_OPTIMIZED",
    }
}

sql_enum! {
    pub enum WarehouseSize ("warehouse size") {
        XSmall = "XSMALL" | "X-SMALL",
        Small = "SMALL",
        Medium = "MEDIUM",
        Large = "LARGE",
        XLarge = "XLARGE" | "X-LARGE",
        XXLarge = "XXLARGE" | "X2LARGE" | "2X-LARGE",
        XXXLarge = "XXXLARGE" | "X3LARGE" | "3X-LARGE",
        X4Large = "X4LARGE" | "4X-LARGE",
        X5Large = "X5LARGE" | "5X-LARGE",
        X6Large = "X6LARGE" | "6X-LARGE",
    }
}

sql_enum! {
    pub enum ScalingPolicy ("scaling policy") {
        Standard = "STANDARD",
        Economy = "ECONOMY",
    }
}

sql_enum! {
    pub enum WarehouseState ("warehouse state") {
        Started = "STARTED",
        Suspended = "SUSPENDED",
        Resizing = "RESIZING",
        Suspending = "SUSPENDING",
        Resuming = "RESUMING",
    }
}

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] WAREHOUSE [IF NOT EXISTS] <name> ...`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateWarehouseOptions {
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: AccountObjectIdentifier,

    pub warehouse_type: Option<WarehouseType>,
    pub warehouse_size: Option<WarehouseSize>,
    pub max_cluster_count: Option<i32>,
    pub min_cluster_count: Option<i32>,
    pub scaling_policy: Option<ScalingPolicy>,
    pub auto_suspend: Option<i32>,
    pub auto_resume: Option<bool>,
    pub initially_suspended: Option<bool>,
    pub resource_monitor: Option<AccountObjectIdentifier>,
    pub comment: Option<String>,
    pub enable_query_acceleration: Option<bool>,
    pub query_acceleration_max_scale_factor: Option<i32>,
    pub max_concurrency_level: Option<i32>,
    pub statement_queued_timeout_in_seconds: Option<i32>,
    pub statement_timeout_in_seconds: Option<i32>,
    pub tag: Option<Vec<TagAssociation>>,
}

impl CreateWarehouseOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for CreateWarehouseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::Static("WAREHOUSE"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::param("WAREHOUSE_TYPE", self.warehouse_type.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("WAREHOUSE_SIZE", self.warehouse_size.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("MAX_CLUSTER_COUNT", self.max_cluster_count.as_ref(), Modifiers::EQUALS),
            Field::param("MIN_CLUSTER_COUNT", self.min_cluster_count.as_ref(), Modifiers::EQUALS),
            Field::param("SCALING_POLICY", self.scaling_policy.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("AUTO_SUSPEND", self.auto_suspend.as_ref(), Modifiers::EQUALS),
            Field::param("AUTO_RESUME", self.auto_resume.as_ref(), Modifiers::EQUALS),
            Field::param("INITIALLY_SUSPENDED", self.initially_suspended.as_ref(), Modifiers::EQUALS),
            Field::ident("RESOURCE_MONITOR", self.resource_monitor.as_ref(), Modifiers::EQUALS),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param(
                "ENABLE_QUERY_ACCELERATION",
                self.enable_query_acceleration.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "QUERY_ACCELERATION_MAX_SCALE_FACTOR",
                self.query_acceleration_max_scale_factor.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param("MAX_CONCURRENCY_LEVEL", self.max_concurrency_level.as_ref(), Modifiers::EQUALS),
            Field::param(
                "STATEMENT_QUEUED_TIMEOUT_IN_SECONDS",
                self.statement_queued_timeout_in_seconds.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "STATEMENT_TIMEOUT_IN_SECONDS",
                self.statement_timeout_in_seconds.as_ref(),
                Modifiers::EQUALS,
            ),
            create_tags(self.tag.as_deref()),
        ]
    }
}

/// Range rules shared by CREATE and ALTER ... SET.
fn validate_sizing(
    rules: &mut Rules,
    max_cluster_count: Option<i32>,
    min_cluster_count: Option<i32>,
    query_acceleration_max_scale_factor: Option<i32>,
    auto_suspend: Option<i32>,
) {
    rules
        .int_in_range("MaxClusterCount", max_cluster_count.map(i64::from), 1, 10)
        .int_in_range("MinClusterCount", min_cluster_count.map(i64::from), 1, 10)
        .int_in_range(
            "QueryAccelerationMaxScaleFactor",
            query_acceleration_max_scale_factor.map(i64::from),
            0,
            100,
        )
        .int_greater_or_equal("AutoSuspend", auto_suspend.map(i64::from), 0);
    if let (Some(max), Some(min)) = (max_cluster_count, min_cluster_count) {
        rules.int_greater_or_equal("MaxClusterCount", Some(i64::from(max)), i64::from(min));
    }
}

impl Options for CreateWarehouseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("CreateWarehouseOptions");
        rules
            .valid_identifier(&self.name)
            .one_of(&[
                field("OrReplace", &self.or_replace),
                field("IfNotExists", &self.if_not_exists),
            ])
            .valid_identifier_if_set(self.resource_monitor.as_ref());
        validate_sizing(
            &mut rules,
            self.max_cluster_count,
            self.min_cluster_count,
            self.query_acceleration_max_scale_factor,
            self.auto_suspend,
        );
        validate_tags(&mut rules, self.tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// ALTER
// =============================================================================

/// `ALTER WAREHOUSE [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterWarehouseOptions {
    pub if_exists: Option<bool>,
    pub name: AccountObjectIdentifier,

    pub suspend: Option<bool>,
    pub resume: Option<bool>,
    pub if_suspended: Option<bool>,
    pub abort_all_queries: Option<bool>,
    pub new_name: Option<AccountObjectIdentifier>,
    pub set: Option<WarehouseSet>,
    pub unset: Option<WarehouseUnset>,
    pub set_tag: Option<Vec<TagAssociation>>,
    pub unset_tag: Option<Vec<Identifier>>,
}

impl AlterWarehouseOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseSet {
    pub warehouse_type: Option<WarehouseType>,
    pub warehouse_size: Option<WarehouseSize>,
    pub wait_for_completion: Option<bool>,
    pub max_cluster_count: Option<i32>,
    pub min_cluster_count: Option<i32>,
    pub scaling_policy: Option<ScalingPolicy>,
    pub auto_suspend: Option<i32>,
    pub auto_resume: Option<bool>,
    pub resource_monitor: Option<AccountObjectIdentifier>,
    pub comment: Option<String>,
    pub enable_query_acceleration: Option<bool>,
    pub query_acceleration_max_scale_factor: Option<i32>,
    pub max_concurrency_level: Option<i32>,
    pub statement_queued_timeout_in_seconds: Option<i32>,
    pub statement_timeout_in_seconds: Option<i32>,
}

impl Structure for WarehouseSet {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param("WAREHOUSE_TYPE", self.warehouse_type.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("WAREHOUSE_SIZE", self.warehouse_size.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("WAIT_FOR_COMPLETION", self.wait_for_completion.as_ref(), Modifiers::EQUALS),
            Field::param("MAX_CLUSTER_COUNT", self.max_cluster_count.as_ref(), Modifiers::EQUALS),
            Field::param("MIN_CLUSTER_COUNT", self.min_cluster_count.as_ref(), Modifiers::EQUALS),
            Field::param("SCALING_POLICY", self.scaling_policy.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("AUTO_SUSPEND", self.auto_suspend.as_ref(), Modifiers::EQUALS),
            Field::param("AUTO_RESUME", self.auto_resume.as_ref(), Modifiers::EQUALS),
            Field::ident("RESOURCE_MONITOR", self.resource_monitor.as_ref(), Modifiers::EQUALS),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param(
                "ENABLE_QUERY_ACCELERATION",
                self.enable_query_acceleration.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "QUERY_ACCELERATION_MAX_SCALE_FACTOR",
                self.query_acceleration_max_scale_factor.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param("MAX_CONCURRENCY_LEVEL", self.max_concurrency_level.as_ref(), Modifiers::EQUALS),
            Field::param(
                "STATEMENT_QUEUED_TIMEOUT_IN_SECONDS",
                self.statement_queued_timeout_in_seconds.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "STATEMENT_TIMEOUT_IN_SECONDS",
                self.statement_timeout_in_seconds.as_ref(),
                Modifiers::EQUALS,
            ),
        ]
    }
}

impl WarehouseSet {
    fn validate(&self, rules: &mut Rules) {
        rules
            .at_least_one_of(&[
                field("WarehouseType", &self.warehouse_type),
                field("WarehouseSize", &self.warehouse_size),
                field("WaitForCompletion", &self.wait_for_completion),
                field("MaxClusterCount", &self.max_cluster_count),
                field("MinClusterCount", &self.min_cluster_count),
                field("ScalingPolicy", &self.scaling_policy),
                field("AutoSuspend", &self.auto_suspend),
                field("AutoResume", &self.auto_resume),
                field("ResourceMonitor", &self.resource_monitor),
                field("Comment", &self.comment),
                field("EnableQueryAcceleration", &self.enable_query_acceleration),
                field(
                    "QueryAccelerationMaxScaleFactor",
                    &self.query_acceleration_max_scale_factor,
                ),
                field("MaxConcurrencyLevel", &self.max_concurrency_level),
                field(
                    "StatementQueuedTimeoutInSeconds",
                    &self.statement_queued_timeout_in_seconds,
                ),
                field("StatementTimeoutInSeconds", &self.statement_timeout_in_seconds),
            ])
            .valid_identifier_if_set(self.resource_monitor.as_ref());
        if self.wait_for_completion.is_some() {
            rules.required("WarehouseSize", &self.warehouse_size);
        }
        validate_sizing(
            rules,
            self.max_cluster_count,
            self.min_cluster_count,
            self.query_acceleration_max_scale_factor,
            self.auto_suspend,
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseUnset {
    pub warehouse_type: Option<bool>,
    pub wait_for_completion: Option<bool>,
    pub max_cluster_count: Option<bool>,
    pub min_cluster_count: Option<bool>,
    pub scaling_policy: Option<bool>,
    pub auto_suspend: Option<bool>,
    pub auto_resume: Option<bool>,
    pub resource_monitor: Option<bool>,
    pub comment: Option<bool>,
    pub enable_query_acceleration: Option<bool>,
    pub query_acceleration_max_scale_factor: Option<bool>,
    pub max_concurrency_level: Option<bool>,
    pub statement_queued_timeout_in_seconds: Option<bool>,
    pub statement_timeout_in_seconds: Option<bool>,
}

impl Structure for WarehouseUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("WAREHOUSE_TYPE", self.warehouse_type),
            Field::flag("WAIT_FOR_COMPLETION", self.wait_for_completion),
            Field::flag("MAX_CLUSTER_COUNT", self.max_cluster_count),
            Field::flag("MIN_CLUSTER_COUNT", self.min_cluster_count),
            Field::flag("SCALING_POLICY", self.scaling_policy),
            Field::flag("AUTO_SUSPEND", self.auto_suspend),
            Field::flag("AUTO_RESUME", self.auto_resume),
            Field::flag("RESOURCE_MONITOR", self.resource_monitor),
            Field::flag("COMMENT", self.comment),
            Field::flag("ENABLE_QUERY_ACCELERATION", self.enable_query_acceleration),
            Field::flag(
                "QUERY_ACCELERATION_MAX_SCALE_FACTOR",
                self.query_acceleration_max_scale_factor,
            ),
            Field::flag("MAX_CONCURRENCY_LEVEL", self.max_concurrency_level),
            Field::flag(
                "STATEMENT_QUEUED_TIMEOUT_IN_SECONDS",
                self.statement_queued_timeout_in_seconds,
            ),
            Field::flag("STATEMENT_TIMEOUT_IN_SECONDS", self.statement_timeout_in_seconds),
        ]
    }
}

impl WarehouseUnset {
    fn validate(&self, rules: &mut Rules) {
        rules.at_least_one_of(&[
            field("WarehouseType", &self.warehouse_type),
            field("WaitForCompletion", &self.wait_for_completion),
            field("MaxClusterCount", &self.max_cluster_count),
            field("MinClusterCount", &self.min_cluster_count),
            field("ScalingPolicy", &self.scaling_policy),
            field("AutoSuspend", &self.auto_suspend),
            field("AutoResume", &self.auto_resume),
            field("ResourceMonitor", &self.resource_monitor),
            field("Comment", &self.comment),
            field("EnableQueryAcceleration", &self.enable_query_acceleration),
            field(
                "QueryAccelerationMaxScaleFactor",
                &self.query_acceleration_max_scale_factor,
            ),
            field("MaxConcurrencyLevel", &self.max_concurrency_level),
            field(
                "StatementQueuedTimeoutInSeconds",
                &self.statement_queued_timeout_in_seconds,
            ),
            field("StatementTimeoutInSeconds", &self.statement_timeout_in_seconds),
        ]);
    }
}

impl Structure for AlterWarehouseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER WAREHOUSE"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::flag("SUSPEND", self.suspend),
            Field::flag("RESUME", self.resume),
            Field::flag("IF SUSPENDED", self.if_suspended),
            Field::flag("ABORT ALL QUERIES", self.abort_all_queries),
            Field::ident("RENAME TO", self.new_name.as_ref(), Modifiers::NO_EQUALS),
            Field::record("SET", self.set.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            set_tags(self.set_tag.as_deref()),
            unset_tags(self.unset_tag.as_deref()),
        ]
    }
}

impl Options for AlterWarehouseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterWarehouseOptions");
        rules
            .valid_identifier(&self.name)
            .exactly_one_of(&[
                field("Suspend", &self.suspend),
                field("Resume", &self.resume),
                field("AbortAllQueries", &self.abort_all_queries),
                field("NewName", &self.new_name),
                field("Set", &self.set),
                field("Unset", &self.unset),
                list("SetTag", &self.set_tag),
                list("UnsetTag", &self.unset_tag),
            ])
            .valid_identifier_if_set(self.new_name.as_ref());
        if self.if_suspended.is_some() {
            rules.required("Resume", &self.resume);
        }
        if let Some(set) = &self.set {
            rules.nested("Set", |r| set.validate(r));
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| unset.validate(r));
        }
        validate_tags(&mut rules, self.set_tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// DROP / SHOW / DESCRIBE
// =============================================================================

/// `DROP WAREHOUSE [IF EXISTS] <name>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropWarehouseOptions {
    pub if_exists: Option<bool>,
    pub name: AccountObjectIdentifier,
}

impl DropWarehouseOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropWarehouseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP WAREHOUSE"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DropWarehouseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropWarehouseOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW WAREHOUSES [LIKE '<pattern>']`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowWarehouseOptions {
    pub like: Option<Like>,
}

impl Structure for ShowWarehouseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW WAREHOUSES"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowWarehouseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowWarehouseOptions");
        super::common::validate_filters(&mut rules, self.like.as_ref(), None);
        rules.finish()
    }
}

/// `DESCRIBE WAREHOUSE <name>`
#[derive(Debug, Clone, Default)]
pub struct DescribeWarehouseOptions {
    pub name: AccountObjectIdentifier,
}

impl Structure for DescribeWarehouseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DESCRIBE WAREHOUSE"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DescribeWarehouseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DescribeWarehouseOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Deserialize)]
struct WarehouseRow {
    name: String,
    state: String,
    #[serde(rename = "type")]
    warehouse_type: String,
    size: String,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    min_cluster_count: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    max_cluster_count: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    started_clusters: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    running: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    queued: Option<i64>,
    #[serde(deserialize_with = "deserialize_flag")]
    is_default: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    is_current: bool,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    auto_suspend: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    auto_resume: bool,
    created_on: DateTime<Utc>,
    resumed_on: Option<DateTime<Utc>>,
    updated_on: Option<DateTime<Utc>>,
    owner: String,
    comment: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    enable_query_acceleration: bool,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    query_acceleration_max_scale_factor: Option<i64>,
    resource_monitor: Option<String>,
    scaling_policy: Option<String>,
}

/// A warehouse as reported by `SHOW WAREHOUSES`.
#[derive(Debug, Clone, PartialEq)]
pub struct Warehouse {
    pub name: String,
    pub state: WarehouseState,
    pub warehouse_type: WarehouseType,
    pub size: WarehouseSize,
    pub min_cluster_count: i64,
    pub max_cluster_count: i64,
    pub started_clusters: i64,
    pub running: i64,
    pub queued: i64,
    pub is_default: bool,
    pub is_current: bool,
    pub auto_suspend: Option<i64>,
    pub auto_resume: bool,
    pub created_on: DateTime<Utc>,
    pub resumed_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub owner: String,
    pub comment: String,
    pub enable_query_acceleration: bool,
    pub query_acceleration_max_scale_factor: Option<i64>,
    pub resource_monitor: Option<String>,
    pub scaling_policy: Option<ScalingPolicy>,
}

impl Warehouse {
    pub fn id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(&self.name)
    }
}

/// Snowflake prints absent references as the string `null`.
fn non_null(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

impl ConvertibleRow for WarehouseRow {
    type Plain = Warehouse;

    fn convert(&self) -> Result<Warehouse> {
        Ok(Warehouse {
            name: self.name.clone(),
            state: self.state.parse()?,
            warehouse_type: self.warehouse_type.parse()?,
            size: self.size.parse()?,
            min_cluster_count: self.min_cluster_count.unwrap_or_default(),
            max_cluster_count: self.max_cluster_count.unwrap_or_default(),
            started_clusters: self.started_clusters.unwrap_or_default(),
            running: self.running.unwrap_or_default(),
            queued: self.queued.unwrap_or_default(),
            is_default: self.is_default,
            is_current: self.is_current,
            auto_suspend: self.auto_suspend,
            auto_resume: self.auto_resume,
            created_on: self.created_on,
            resumed_on: self.resumed_on,
            updated_on: self.updated_on,
            owner: self.owner.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            enable_query_acceleration: self.enable_query_acceleration,
            query_acceleration_max_scale_factor: self.query_acceleration_max_scale_factor,
            resource_monitor: non_null(&self.resource_monitor).map(str::to_string),
            scaling_policy: non_null(&self.scaling_policy)
                .map(str::parse)
                .transpose()?,
        })
    }
}

/// One row of `DESCRIBE WAREHOUSE`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WarehouseDetails {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub kind: String,
}

// =============================================================================
// Accessor
// =============================================================================

/// Warehouse operations, obtained from [`Client::warehouses`].
pub struct Warehouses<'a> {
    client: &'a Client,
}

impl<'a> Warehouses<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateWarehouseOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterWarehouseOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropWarehouseOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    /// `SHOW WAREHOUSES`; `None` lists every warehouse.
    pub async fn show(&self, opts: Option<&ShowWarehouseOptions>) -> Result<Vec<Warehouse>> {
        let default = ShowWarehouseOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, WarehouseRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &AccountObjectIdentifier) -> Result<Warehouse> {
        let opts = ShowWarehouseOptions {
            like: Some(Like::new(id.name())),
        };
        let warehouses = self.show(Some(&opts)).await?;
        executor::show_by_id(warehouses, |w| w.name == id.name())
    }

    pub async fn describe(&self, id: &AccountObjectIdentifier) -> Result<WarehouseDetails> {
        let opts = DescribeWarehouseOptions { name: id.clone() };
        let sql = executor::render(Some(&opts))?;
        let row = self.client.query_one(&sql).await?;
        crate::mapper::bind_row(row)
    }
}
