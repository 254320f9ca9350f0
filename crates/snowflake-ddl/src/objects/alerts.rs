//! Alerts.
//!
//! An alert runs its condition on a schedule and, when the condition query
//! returns rows, runs its action.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{validate_filters, In, Like, LimitFrom, Schedule};
use crate::client::Client;
use crate::core::identifier::{AccountObjectIdentifier, ObjectIdentifier, SchemaObjectIdentifier};
use crate::core::traits::Options;
use crate::core::value::sql_enum;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::ConvertibleRow;
use crate::validation::{field, Rules, ValidationErrors};

sql_enum! {
    pub enum AlertState ("alert state") {
        Started = "STARTED",
        Suspended = "SUSPENDED",
    }
}

sql_enum! {
    pub enum AlertAction ("alert action") {
        Resume = "RESUME",
        Suspend = "SUSPEND",
    }
}

/// `EXISTS (<condition>)`, the only condition form alerts accept.
fn exists(condition: &str) -> String {
    format!("EXISTS ({condition})")
}

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] ALERT [IF NOT EXISTS] <name> WAREHOUSE = ... SCHEDULE = ... IF (...) THEN ...`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAlertOptions {
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub warehouse: AccountObjectIdentifier,
    pub schedule: Option<Schedule>,
    pub comment: Option<String>,
    pub condition: String,
    pub action: String,
}

impl CreateAlertOptions {
    pub fn new(
        name: SchemaObjectIdentifier,
        warehouse: AccountObjectIdentifier,
        schedule: Schedule,
        condition: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name,
            warehouse,
            schedule: Some(schedule),
            condition: condition.into(),
            action: action.into(),
            ..Default::default()
        }
    }
}

impl Structure for CreateAlertOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::Static("ALERT"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::ident("WAREHOUSE", Some(&self.warehouse), Modifiers::EQUALS),
            Field::param("SCHEDULE", self.schedule.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::condition("IF", Some(&exists(&self.condition))),
            Field::param("THEN", Some(&self.action), Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for CreateAlertOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("CreateAlertOptions")
            .valid_identifier(&self.name)
            .one_of(&[
                field("OrReplace", &self.or_replace),
                field("IfNotExists", &self.if_not_exists),
            ])
            .valid_identifier(&self.warehouse)
            .required("Schedule", &self.schedule)
            .required("Condition", &self.condition)
            .required("Action", &self.action)
            .finish()
    }
}

// =============================================================================
// ALTER
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertSet {
    pub warehouse: Option<AccountObjectIdentifier>,
    pub schedule: Option<Schedule>,
    pub comment: Option<String>,
}

impl Structure for AlertSet {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::ident("WAREHOUSE", self.warehouse.as_ref(), Modifiers::EQUALS),
            Field::param("SCHEDULE", self.schedule.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertUnset {
    pub warehouse: Option<bool>,
    pub schedule: Option<bool>,
    pub comment: Option<bool>,
}

impl Structure for AlertUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("WAREHOUSE", self.warehouse),
            Field::flag("SCHEDULE", self.schedule),
            Field::flag("COMMENT", self.comment),
        ]
    }
}

/// `ALTER ALERT [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterAlertOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub action: Option<AlertAction>,
    pub set: Option<AlertSet>,
    pub unset: Option<AlertUnset>,
    pub modify_condition: Option<String>,
    pub modify_action: Option<String>,
}

impl AlterAlertOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for AlterAlertOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER ALERT"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::keyword("", self.action.as_ref(), Modifiers::new()),
            Field::record("SET", self.set.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::condition("MODIFY CONDITION EXISTS", self.modify_condition.as_ref()),
            Field::param("MODIFY ACTION", self.modify_action.as_ref(), Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for AlterAlertOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterAlertOptions");
        rules.valid_identifier(&self.name).exactly_one_of(&[
            field("Action", &self.action),
            field("Set", &self.set),
            field("Unset", &self.unset),
            field("ModifyCondition", &self.modify_condition),
            field("ModifyAction", &self.modify_action),
        ]);
        if let Some(set) = &self.set {
            rules.nested("Set", |r| {
                r.at_least_one_of(&[
                    field("Warehouse", &set.warehouse),
                    field("Schedule", &set.schedule),
                    field("Comment", &set.comment),
                ])
                .valid_identifier_if_set(set.warehouse.as_ref());
            });
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| {
                r.at_least_one_of(&[
                    field("Warehouse", &unset.warehouse),
                    field("Schedule", &unset.schedule),
                    field("Comment", &unset.comment),
                ]);
            });
        }
        rules.finish()
    }
}

// =============================================================================
// DROP / SHOW / DESCRIBE / EXECUTE
// =============================================================================

/// `DROP ALERT [IF EXISTS] <name>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropAlertOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,
}

impl DropAlertOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropAlertOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP ALERT"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DropAlertOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropAlertOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW [TERSE] ALERTS [LIKE ...] [IN ...] [STARTS WITH ...] [LIMIT ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowAlertOptions {
    pub terse: Option<bool>,
    pub like: Option<Like>,
    pub r#in: Option<In>,
    pub starts_with: Option<String>,
    pub limit: Option<LimitFrom>,
}

impl Structure for ShowAlertOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW"),
            Field::flag("TERSE", self.terse),
            Field::Static("ALERTS"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("IN", self.r#in.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::param(
                "STARTS WITH",
                self.starts_with.as_ref(),
                Modifiers::NO_EQUALS.single_quotes(),
            ),
            Field::record("", self.limit.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowAlertOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowAlertOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

/// A single-identifier statement on an alert: `DESCRIBE ALERT` or `EXECUTE ALERT`.
#[derive(Debug, Clone)]
struct AlertCommand {
    verb: &'static str,
    name: SchemaObjectIdentifier,
}

impl Structure for AlertCommand {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static(self.verb),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for AlertCommand {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("AlertCommandOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AlertRow {
    created_on: DateTime<Utc>,
    name: String,
    database_name: String,
    schema_name: String,
    owner: String,
    comment: Option<String>,
    warehouse: Option<String>,
    schedule: String,
    state: String,
    condition: String,
    action: String,
    #[serde(default)]
    owner_role_type: Option<String>,
}

/// An alert as reported by `SHOW ALERTS` and `DESCRIBE ALERT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub owner: String,
    pub comment: String,
    pub warehouse: String,
    pub schedule: Schedule,
    pub state: AlertState,
    pub condition: String,
    pub action: String,
    pub owner_role_type: Option<String>,
}

impl Alert {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

impl ConvertibleRow for AlertRow {
    type Plain = Alert;

    fn convert(&self) -> Result<Alert> {
        Ok(Alert {
            created_on: self.created_on,
            name: self.name.clone(),
            database_name: self.database_name.clone(),
            schema_name: self.schema_name.clone(),
            owner: self.owner.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            warehouse: self.warehouse.clone().unwrap_or_default(),
            schedule: self.schedule.parse()?,
            state: self.state.parse()?,
            condition: self.condition.clone(),
            action: self.action.clone(),
            owner_role_type: self.owner_role_type.clone(),
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Alert operations, obtained from [`Client::alerts`].
pub struct Alerts<'a> {
    client: &'a Client,
}

impl<'a> Alerts<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateAlertOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterAlertOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropAlertOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowAlertOptions>) -> Result<Vec<Alert>> {
        let default = ShowAlertOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, AlertRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<Alert> {
        let opts = ShowAlertOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::schema(id.schema_id())),
            ..Default::default()
        };
        let alerts = self.show(Some(&opts)).await?;
        executor::show_by_id(alerts, |a| a.name == id.name())
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifier) -> Result<Alert> {
        let opts = AlertCommand {
            verb: "DESCRIBE ALERT",
            name: id.clone(),
        };
        executor::validate_and_query_one::<_, AlertRow>(self.client, Some(&opts)).await
    }

    /// Run the alert once, outside its schedule.
    pub async fn execute(&self, id: &SchemaObjectIdentifier) -> Result<()> {
        let opts = AlertCommand {
            verb: "EXECUTE ALERT",
            name: id.clone(),
        };
        executor::validate_and_exec(self.client, Some(&opts)).await?;
        Ok(())
    }
}
