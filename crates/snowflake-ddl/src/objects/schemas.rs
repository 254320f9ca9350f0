//! Schemas.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{
    create_tags, set_tags, unset_tags, validate_filters, validate_tags, CloneSource, In, Like,
    LimitFrom, LogLevel, TagAssociation, TraceLevel,
};
use crate::client::Client;
use crate::core::identifier::{DatabaseObjectIdentifier, Identifier, ObjectIdentifier};
use crate::core::traits::Options;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_flag, deserialize_lenient_int, ConvertibleRow};
use crate::validation::{field, list, Rules, ValidationErrors};

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] [TRANSIENT] SCHEMA [IF NOT EXISTS] <name> [CLONE ...] ...`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSchemaOptions {
    pub or_replace: Option<bool>,
    pub transient: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: DatabaseObjectIdentifier,
    pub clone: Option<CloneSource<DatabaseObjectIdentifier>>,

    pub with_managed_access: Option<bool>,
    pub data_retention_time_in_days: Option<i32>,
    pub max_data_extension_time_in_days: Option<i32>,
    pub default_ddl_collation: Option<String>,
    pub log_level: Option<LogLevel>,
    pub trace_level: Option<TraceLevel>,
    pub comment: Option<String>,
    pub tag: Option<Vec<TagAssociation>>,
}

impl CreateSchemaOptions {
    pub fn new(name: DatabaseObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for CreateSchemaOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::flag("TRANSIENT", self.transient),
            Field::Static("SCHEMA"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::record("", self.clone.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::flag("WITH MANAGED ACCESS", self.with_managed_access),
            Field::param(
                "DATA_RETENTION_TIME_IN_DAYS",
                self.data_retention_time_in_days.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "MAX_DATA_EXTENSION_TIME_IN_DAYS",
                self.max_data_extension_time_in_days.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "DEFAULT_DDL_COLLATION",
                self.default_ddl_collation.as_ref(),
                Modifiers::SINGLE_QUOTED,
            ),
            Field::param("LOG_LEVEL", self.log_level.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("TRACE_LEVEL", self.trace_level.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            create_tags(self.tag.as_deref()),
        ]
    }
}

impl Options for CreateSchemaOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("CreateSchemaOptions");
        rules.valid_identifier(&self.name).one_of(&[
            field("OrReplace", &self.or_replace),
            field("IfNotExists", &self.if_not_exists),
        ]);
        if let Some(clone) = &self.clone {
            clone.validate(&mut rules);
        }
        rules
            .int_in_range(
                "DataRetentionTimeInDays",
                self.data_retention_time_in_days.map(i64::from),
                0,
                90,
            )
            .int_in_range(
                "MaxDataExtensionTimeInDays",
                self.max_data_extension_time_in_days.map(i64::from),
                0,
                90,
            );
        validate_tags(&mut rules, self.tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// ALTER
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaSet {
    pub data_retention_time_in_days: Option<i32>,
    pub max_data_extension_time_in_days: Option<i32>,
    pub default_ddl_collation: Option<String>,
    pub log_level: Option<LogLevel>,
    pub trace_level: Option<TraceLevel>,
    pub comment: Option<String>,
}

impl Structure for SchemaSet {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param(
                "DATA_RETENTION_TIME_IN_DAYS",
                self.data_retention_time_in_days.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "MAX_DATA_EXTENSION_TIME_IN_DAYS",
                self.max_data_extension_time_in_days.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::param(
                "DEFAULT_DDL_COLLATION",
                self.default_ddl_collation.as_ref(),
                Modifiers::SINGLE_QUOTED,
            ),
            Field::param("LOG_LEVEL", self.log_level.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("TRACE_LEVEL", self.trace_level.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaUnset {
    pub data_retention_time_in_days: Option<bool>,
    pub max_data_extension_time_in_days: Option<bool>,
    pub default_ddl_collation: Option<bool>,
    pub log_level: Option<bool>,
    pub trace_level: Option<bool>,
    pub comment: Option<bool>,
}

impl Structure for SchemaUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("DATA_RETENTION_TIME_IN_DAYS", self.data_retention_time_in_days),
            Field::flag(
                "MAX_DATA_EXTENSION_TIME_IN_DAYS",
                self.max_data_extension_time_in_days,
            ),
            Field::flag("DEFAULT_DDL_COLLATION", self.default_ddl_collation),
            Field::flag("LOG_LEVEL", self.log_level),
            Field::flag("TRACE_LEVEL", self.trace_level),
            Field::flag("COMMENT", self.comment),
        ]
    }
}

/// `ALTER SCHEMA [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterSchemaOptions {
    pub if_exists: Option<bool>,
    pub name: DatabaseObjectIdentifier,

    pub new_name: Option<DatabaseObjectIdentifier>,
    pub swap_with: Option<DatabaseObjectIdentifier>,
    pub set: Option<SchemaSet>,
    pub unset: Option<SchemaUnset>,
    pub set_tag: Option<Vec<TagAssociation>>,
    pub unset_tag: Option<Vec<Identifier>>,
    pub enable_managed_access: Option<bool>,
    pub disable_managed_access: Option<bool>,
}

impl AlterSchemaOptions {
    pub fn new(name: DatabaseObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for AlterSchemaOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER SCHEMA"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::ident("RENAME TO", self.new_name.as_ref(), Modifiers::NO_EQUALS),
            Field::ident("SWAP WITH", self.swap_with.as_ref(), Modifiers::NO_EQUALS),
            Field::record("SET", self.set.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            set_tags(self.set_tag.as_deref()),
            unset_tags(self.unset_tag.as_deref()),
            Field::flag("ENABLE MANAGED ACCESS", self.enable_managed_access),
            Field::flag("DISABLE MANAGED ACCESS", self.disable_managed_access),
        ]
    }
}

impl Options for AlterSchemaOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterSchemaOptions");
        rules
            .valid_identifier(&self.name)
            .exactly_one_of(&[
                field("NewName", &self.new_name),
                field("SwapWith", &self.swap_with),
                field("Set", &self.set),
                field("Unset", &self.unset),
                list("SetTag", &self.set_tag),
                list("UnsetTag", &self.unset_tag),
                field("EnableManagedAccess", &self.enable_managed_access),
                field("DisableManagedAccess", &self.disable_managed_access),
            ])
            .valid_identifier_if_set(self.new_name.as_ref())
            .valid_identifier_if_set(self.swap_with.as_ref());
        if let Some(set) = &self.set {
            rules.nested("Set", |r| {
                r.at_least_one_of(&[
                    field("DataRetentionTimeInDays", &set.data_retention_time_in_days),
                    field("MaxDataExtensionTimeInDays", &set.max_data_extension_time_in_days),
                    field("DefaultDDLCollation", &set.default_ddl_collation),
                    field("LogLevel", &set.log_level),
                    field("TraceLevel", &set.trace_level),
                    field("Comment", &set.comment),
                ])
                .int_in_range(
                    "DataRetentionTimeInDays",
                    set.data_retention_time_in_days.map(i64::from),
                    0,
                    90,
                );
            });
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| {
                r.at_least_one_of(&[
                    field("DataRetentionTimeInDays", &unset.data_retention_time_in_days),
                    field(
                        "MaxDataExtensionTimeInDays",
                        &unset.max_data_extension_time_in_days,
                    ),
                    field("DefaultDDLCollation", &unset.default_ddl_collation),
                    field("LogLevel", &unset.log_level),
                    field("TraceLevel", &unset.trace_level),
                    field("Comment", &unset.comment),
                ]);
            });
        }
        validate_tags(&mut rules, self.set_tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// DROP / SHOW
// =============================================================================

/// `DROP SCHEMA [IF EXISTS] <name> [CASCADE | RESTRICT]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropSchemaOptions {
    pub if_exists: Option<bool>,
    pub name: DatabaseObjectIdentifier,
    pub cascade: Option<bool>,
    pub restrict: Option<bool>,
}

impl DropSchemaOptions {
    pub fn new(name: DatabaseObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for DropSchemaOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP SCHEMA"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::flag("CASCADE", self.cascade),
            Field::flag("RESTRICT", self.restrict),
        ]
    }
}

impl Options for DropSchemaOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropSchemaOptions")
            .valid_identifier(&self.name)
            .one_of(&[field("Cascade", &self.cascade), field("Restrict", &self.restrict)])
            .finish()
    }
}

/// `SHOW [TERSE] SCHEMAS [HISTORY] [LIKE ...] [IN ...] [STARTS WITH ...] [LIMIT ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowSchemaOptions {
    pub terse: Option<bool>,
    pub history: Option<bool>,
    pub like: Option<Like>,
    pub r#in: Option<In>,
    pub starts_with: Option<String>,
    pub limit: Option<LimitFrom>,
}

impl Structure for ShowSchemaOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW"),
            Field::flag("TERSE", self.terse),
            Field::Static("SCHEMAS"),
            Field::flag("HISTORY", self.history),
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

impl Options for ShowSchemaOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowSchemaOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

#[derive(Debug, Deserialize)]
struct SchemaRow {
    created_on: DateTime<Utc>,
    name: String,
    #[serde(deserialize_with = "deserialize_flag")]
    is_default: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    is_current: bool,
    database_name: String,
    owner: String,
    comment: Option<String>,
    options: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    retention_time: Option<i64>,
    #[serde(default)]
    owner_role_type: Option<String>,
}

/// A schema as reported by `SHOW SCHEMAS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub is_default: bool,
    pub is_current: bool,
    pub database_name: String,
    pub owner: String,
    pub comment: String,
    pub options: String,
    pub managed_access: bool,
    pub transient: bool,
    pub retention_time: Option<i64>,
    pub owner_role_type: Option<String>,
}

impl Schema {
    pub fn id(&self) -> DatabaseObjectIdentifier {
        DatabaseObjectIdentifier::new(&self.database_name, &self.name)
    }
}

impl ConvertibleRow for SchemaRow {
    type Plain = Schema;

    fn convert(&self) -> Result<Schema> {
        let options = self.options.clone().unwrap_or_default();
        let has = |flag: &str| options.split(',').any(|o| o.trim() == flag);
        Ok(Schema {
            created_on: self.created_on,
            name: self.name.clone(),
            is_default: self.is_default,
            is_current: self.is_current,
            database_name: self.database_name.clone(),
            owner: self.owner.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            managed_access: has("MANAGED ACCESS"),
            transient: has("TRANSIENT"),
            options: options.clone(),
            retention_time: self.retention_time,
            owner_role_type: self.owner_role_type.clone(),
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Schema operations, obtained from [`Client::schemas`].
pub struct Schemas<'a> {
    client: &'a Client,
}

impl<'a> Schemas<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateSchemaOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterSchemaOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropSchemaOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowSchemaOptions>) -> Result<Vec<Schema>> {
        let default = ShowSchemaOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, SchemaRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &DatabaseObjectIdentifier) -> Result<Schema> {
        let opts = ShowSchemaOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::database(id.database_id())),
            ..Default::default()
        };
        let schemas = self.show(Some(&opts)).await?;
        executor::show_by_id(schemas, |s| {
            s.name == id.name() && s.database_name == id.database_name()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::AccountObjectIdentifier;
    use crate::ddl::to_sql;
    use crate::objects::common::TimeTravel;
    use crate::objects::testing::{client, row};
    use crate::validation::{err_at_least_one_of, err_exactly_one_of, ValidationError};
    use serde_json::json;

    fn id() -> DatabaseObjectIdentifier {
        DatabaseObjectIdentifier::new("db", "sch")
    }

    #[test]
    fn test_create() {
        let opts = CreateSchemaOptions {
            transient: Some(true),
            if_not_exists: Some(true),
            with_managed_access: Some(true),
            data_retention_time_in_days: Some(1),
            comment: Some("c".into()),
            ..CreateSchemaOptions::new(id())
        };
        assert!(opts.validate().is_ok());
        assert_eq!(
            to_sql(&opts).unwrap(),
            "CREATE TRANSIENT SCHEMA IF NOT EXISTS \"db\".\"sch\" WITH MANAGED ACCESS \
             DATA_RETENTION_TIME_IN_DAYS = 1 COMMENT = 'c'"
        );
    }

    #[test]
    fn test_create_clone_at_timestamp() {
        let opts = CreateSchemaOptions {
            or_replace: Some(true),
            clone: Some(CloneSource {
                source: DatabaseObjectIdentifier::new("db", "src"),
                at: Some(TimeTravel {
                    timestamp: Some("2024-01-01 00:00:00".into()),
                    ..Default::default()
                }),
                before: None,
            }),
            ..CreateSchemaOptions::new(id())
        };
        assert_eq!(
            to_sql(&opts).unwrap(),
            "CREATE OR REPLACE SCHEMA \"db\".\"sch\" CLONE \"db\".\"src\" \
             AT (TIMESTAMP => '2024-01-01 00:00:00')"
        );
    }

    #[test]
    fn test_alter_forms() {
        let swap = AlterSchemaOptions {
            if_exists: Some(true),
            swap_with: Some(DatabaseObjectIdentifier::new("db", "other")),
            ..AlterSchemaOptions::new(id())
        };
        assert_eq!(
            to_sql(&swap).unwrap(),
            "ALTER SCHEMA IF EXISTS \"db\".\"sch\" SWAP WITH \"db\".\"other\""
        );

        let managed = AlterSchemaOptions {
            enable_managed_access: Some(true),
            ..AlterSchemaOptions::new(id())
        };
        assert_eq!(
            to_sql(&managed).unwrap(),
            "ALTER SCHEMA \"db\".\"sch\" ENABLE MANAGED ACCESS"
        );

        let set = AlterSchemaOptions {
            set: Some(SchemaSet {
                log_level: Some(LogLevel::Warn),
                comment: Some("x".into()),
                ..Default::default()
            }),
            ..AlterSchemaOptions::new(id())
        };
        assert_eq!(
            to_sql(&set).unwrap(),
            "ALTER SCHEMA \"db\".\"sch\" SET LOG_LEVEL = 'WARN', COMMENT = 'x'"
        );

        let unset_tag = AlterSchemaOptions {
            unset_tag: Some(vec![
                AccountObjectIdentifier::new("a").into(),
                AccountObjectIdentifier::new("b").into(),
            ]),
            ..AlterSchemaOptions::new(id())
        };
        assert_eq!(
            to_sql(&unset_tag).unwrap(),
            "ALTER SCHEMA \"db\".\"sch\" UNSET TAG \"a\", \"b\""
        );
    }

    #[test]
    fn test_alter_validation() {
        let opts = AlterSchemaOptions {
            unset: Some(SchemaUnset::default()),
            ..AlterSchemaOptions::new(DatabaseObjectIdentifier::new("", ""))
        };
        assert_eq!(
            opts.validate().unwrap_err().as_slice(),
            &[
                ValidationError::InvalidObjectIdentifier,
                err_at_least_one_of(
                    "AlterSchemaOptions.Unset",
                    &[
                        "DataRetentionTimeInDays",
                        "MaxDataExtensionTimeInDays",
                        "DefaultDDLCollation",
                        "LogLevel",
                        "TraceLevel",
                        "Comment"
                    ]
                ),
            ]
        );

        let none = AlterSchemaOptions::new(id());
        assert!(none.validate().unwrap_err().contains(&err_exactly_one_of(
            "AlterSchemaOptions",
            &[
                "NewName",
                "SwapWith",
                "Set",
                "Unset",
                "SetTag",
                "UnsetTag",
                "EnableManagedAccess",
                "DisableManagedAccess"
            ]
        )));
    }

    #[test]
    fn test_show_in_database() {
        let opts = ShowSchemaOptions {
            terse: Some(true),
            like: Some(Like::new("s%")),
            r#in: Some(In::database(AccountObjectIdentifier::new("db"))),
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
        assert_eq!(
            to_sql(&opts).unwrap(),
            "SHOW TERSE SCHEMAS LIKE 's%' IN DATABASE \"db\""
        );

        let empty_scope = ShowSchemaOptions {
            r#in: Some(In::default()),
            ..Default::default()
        };
        assert!(empty_scope
            .validate()
            .unwrap_err()
            .contains(&ValidationError::ScopeRequiredForInKeyword));
    }

    #[tokio::test]
    async fn test_show_by_id_filters_database() {
        let (executor, client) = client();
        let schema_row = |db: &str| {
            row(json!({
                "created_on": "2024-02-03T04:05:06Z",
                "name": "sch",
                "is_default": "N",
                "is_current": "Y",
                "database_name": db,
                "owner": "SYSADMIN",
                "comment": null,
                "options": "TRANSIENT, MANAGED ACCESS",
                "retention_time": 1
            }))
        };
        executor.push_rows(vec![schema_row("other"), schema_row("db")]);
        let schema = client.schemas().show_by_id(&id()).await.unwrap();
        assert_eq!(schema.id(), id());
        assert!(schema.managed_access);
        assert!(schema.transient);
        assert_eq!(
            executor.statements(),
            vec!["SHOW SCHEMAS LIKE 'sch' IN DATABASE \"db\""]
        );
    }

    #[test]
    fn test_alter_empty_tag_lists_are_not_an_action() {
        let expected = err_exactly_one_of(
            "AlterSchemaOptions",
            &[
                "NewName",
                "SwapWith",
                "Set",
                "Unset",
                "SetTag",
                "UnsetTag",
                "EnableManagedAccess",
                "DisableManagedAccess",
            ],
        );
        let set_tag = AlterSchemaOptions {
            set_tag: Some(vec![]),
            ..AlterSchemaOptions::new(id())
        };
        let unset_tag = AlterSchemaOptions {
            unset_tag: Some(vec![]),
            ..AlterSchemaOptions::new(id())
        };
        assert!(set_tag.validate().unwrap_err().contains(&expected));
        assert!(unset_tag.validate().unwrap_err().contains(&expected));
    }
}
