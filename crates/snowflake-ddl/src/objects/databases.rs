//! Databases.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{
    create_tags, set_tags, unset_tags, validate_filters, validate_tags, CloneSource, Like,
    LimitFrom, LogLevel, TagAssociation, TraceLevel,
};
use crate::client::Client;
use crate::core::identifier::{AccountObjectIdentifier, Identifier, ObjectIdentifier};
use crate::core::traits::Options;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_flag, deserialize_lenient_int, ConvertibleRow};
use crate::validation::{field, list, Rules, ValidationErrors};

/// Days of time travel a database may retain.
const MAX_RETENTION_DAYS: i64 = 90;

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] [TRANSIENT] DATABASE [IF NOT EXISTS] <name> [CLONE ...] ...`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateDatabaseOptions {
    pub or_replace: Option<bool>,
    pub transient: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: AccountObjectIdentifier,
    pub clone: Option<CloneSource<AccountObjectIdentifier>>,

    pub data_retention_time_in_days: Option<i32>,
    pub max_data_extension_time_in_days: Option<i32>,
    pub external_volume: Option<AccountObjectIdentifier>,
    pub catalog: Option<AccountObjectIdentifier>,
    pub default_ddl_collation: Option<String>,
    pub log_level: Option<LogLevel>,
    pub trace_level: Option<TraceLevel>,
    pub comment: Option<String>,
    pub tag: Option<Vec<TagAssociation>>,
}

impl CreateDatabaseOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for CreateDatabaseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::flag("TRANSIENT", self.transient),
            Field::Static("DATABASE"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::record("", self.clone.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
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
            Field::ident("EXTERNAL_VOLUME", self.external_volume.as_ref(), Modifiers::EQUALS),
            Field::ident("CATALOG", self.catalog.as_ref(), Modifiers::EQUALS),
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

fn validate_retention(rules: &mut Rules, retention: Option<i32>, extension: Option<i32>) {
    rules
        .int_in_range(
            "DataRetentionTimeInDays",
            retention.map(i64::from),
            0,
            MAX_RETENTION_DAYS,
        )
        .int_in_range(
            "MaxDataExtensionTimeInDays",
            extension.map(i64::from),
            0,
            MAX_RETENTION_DAYS,
        );
}

impl Options for CreateDatabaseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("CreateDatabaseOptions");
        rules
            .valid_identifier(&self.name)
            .one_of(&[
                field("OrReplace", &self.or_replace),
                field("IfNotExists", &self.if_not_exists),
            ])
            .valid_identifier_if_set(self.external_volume.as_ref())
            .valid_identifier_if_set(self.catalog.as_ref());
        if let Some(clone) = &self.clone {
            clone.validate(&mut rules);
        }
        validate_retention(
            &mut rules,
            self.data_retention_time_in_days,
            self.max_data_extension_time_in_days,
        );
        validate_tags(&mut rules, self.tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// ALTER
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSet {
    pub data_retention_time_in_days: Option<i32>,
    pub max_data_extension_time_in_days: Option<i32>,
    pub external_volume: Option<AccountObjectIdentifier>,
    pub catalog: Option<AccountObjectIdentifier>,
    pub default_ddl_collation: Option<String>,
    pub log_level: Option<LogLevel>,
    pub trace_level: Option<TraceLevel>,
    pub comment: Option<String>,
}

impl Structure for DatabaseSet {
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
            Field::ident("EXTERNAL_VOLUME", self.external_volume.as_ref(), Modifiers::EQUALS),
            Field::ident("CATALOG", self.catalog.as_ref(), Modifiers::EQUALS),
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

impl DatabaseSet {
    fn validate(&self, rules: &mut Rules) {
        rules
            .at_least_one_of(&[
                field("DataRetentionTimeInDays", &self.data_retention_time_in_days),
                field("MaxDataExtensionTimeInDays", &self.max_data_extension_time_in_days),
                field("ExternalVolume", &self.external_volume),
                field("Catalog", &self.catalog),
                field("DefaultDDLCollation", &self.default_ddl_collation),
                field("LogLevel", &self.log_level),
                field("TraceLevel", &self.trace_level),
                field("Comment", &self.comment),
            ])
            .valid_identifier_if_set(self.external_volume.as_ref())
            .valid_identifier_if_set(self.catalog.as_ref());
        validate_retention(
            rules,
            self.data_retention_time_in_days,
            self.max_data_extension_time_in_days,
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseUnset {
    pub data_retention_time_in_days: Option<bool>,
    pub max_data_extension_time_in_days: Option<bool>,
    pub external_volume: Option<bool>,
    pub catalog: Option<bool>,
    pub default_ddl_collation: Option<bool>,
    pub log_level: Option<bool>,
    pub trace_level: Option<bool>,
    pub comment: Option<bool>,
}

impl Structure for DatabaseUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("DATA_RETENTION_TIME_IN_DAYS", self.data_retention_time_in_days),
            Field::flag(
                "MAX_DATA_EXTENSION_TIME_IN_DAYS",
                self.max_data_extension_time_in_days,
            ),
            Field::flag("EXTERNAL_VOLUME", self.external_volume),
            Field::flag("CATALOG", self.catalog),
            Field::flag("DEFAULT_DDL_COLLATION", self.default_ddl_collation),
            Field::flag("LOG_LEVEL", self.log_level),
            Field::flag("TRACE_LEVEL", self.trace_level),
            Field::flag("COMMENT", self.comment),
        ]
    }
}

impl DatabaseUnset {
    fn validate(&self, rules: &mut Rules) {
        rules.at_least_one_of(&[
            field("DataRetentionTimeInDays", &self.data_retention_time_in_days),
            field("MaxDataExtensionTimeInDays", &self.max_data_extension_time_in_days),
            field("ExternalVolume", &self.external_volume),
            field("Catalog", &self.catalog),
            field("DefaultDDLCollation", &self.default_ddl_collation),
            field("LogLevel", &self.log_level),
            field("TraceLevel", &self.trace_level),
            field("Comment", &self.comment),
        ]);
    }
}

/// `ALTER DATABASE [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterDatabaseOptions {
    pub if_exists: Option<bool>,
    pub name: AccountObjectIdentifier,

    pub new_name: Option<AccountObjectIdentifier>,
    pub swap_with: Option<AccountObjectIdentifier>,
    pub set: Option<DatabaseSet>,
    pub unset: Option<DatabaseUnset>,
    pub set_tag: Option<Vec<TagAssociation>>,
    pub unset_tag: Option<Vec<Identifier>>,
}

impl AlterDatabaseOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for AlterDatabaseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER DATABASE"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::ident("RENAME TO", self.new_name.as_ref(), Modifiers::NO_EQUALS),
            Field::ident("SWAP WITH", self.swap_with.as_ref(), Modifiers::NO_EQUALS),
            Field::record("SET", self.set.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            set_tags(self.set_tag.as_deref()),
            unset_tags(self.unset_tag.as_deref()),
        ]
    }
}

impl Options for AlterDatabaseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterDatabaseOptions");
        rules
            .valid_identifier(&self.name)
            .exactly_one_of(&[
                field("NewName", &self.new_name),
                field("SwapWith", &self.swap_with),
                field("Set", &self.set),
                field("Unset", &self.unset),
                list("SetTag", &self.set_tag),
                list("UnsetTag", &self.unset_tag),
            ])
            .valid_identifier_if_set(self.new_name.as_ref())
            .valid_identifier_if_set(self.swap_with.as_ref());
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
// DROP / UNDROP
// =============================================================================

/// `DROP DATABASE [IF EXISTS] <name> [CASCADE | RESTRICT]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropDatabaseOptions {
    pub if_exists: Option<bool>,
    pub name: AccountObjectIdentifier,
    pub cascade: Option<bool>,
    pub restrict: Option<bool>,
}

impl DropDatabaseOptions {
    pub fn new(name: AccountObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for DropDatabaseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP DATABASE"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::flag("CASCADE", self.cascade),
            Field::flag("RESTRICT", self.restrict),
        ]
    }
}

impl Options for DropDatabaseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropDatabaseOptions")
            .valid_identifier(&self.name)
            .one_of(&[field("Cascade", &self.cascade), field("Restrict", &self.restrict)])
            .finish()
    }
}

/// `UNDROP DATABASE <name>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UndropDatabaseOptions {
    pub name: AccountObjectIdentifier,
}

impl Structure for UndropDatabaseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("UNDROP DATABASE"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for UndropDatabaseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("UndropDatabaseOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

// =============================================================================
// SHOW
// =============================================================================

/// `SHOW [TERSE] DATABASES [HISTORY] [LIKE ...] [STARTS WITH ...] [LIMIT ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowDatabaseOptions {
    pub terse: Option<bool>,
    pub history: Option<bool>,
    pub like: Option<Like>,
    pub starts_with: Option<String>,
    pub limit: Option<LimitFrom>,
}

impl Structure for ShowDatabaseOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW"),
            Field::flag("TERSE", self.terse),
            Field::Static("DATABASES"),
            Field::flag("HISTORY", self.history),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::param(
                "STARTS WITH",
                self.starts_with.as_ref(),
                Modifiers::NO_EQUALS.single_quotes(),
            ),
            Field::record("", self.limit.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowDatabaseOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowDatabaseOptions");
        validate_filters(&mut rules, self.like.as_ref(), None);
        rules.finish()
    }
}

#[derive(Debug, Deserialize)]
struct DatabaseRow {
    created_on: DateTime<Utc>,
    name: String,
    #[serde(deserialize_with = "deserialize_flag")]
    is_default: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    is_current: bool,
    origin: Option<String>,
    owner: String,
    comment: Option<String>,
    options: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    retention_time: Option<i64>,
    #[serde(default)]
    dropped_on: Option<DateTime<Utc>>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    owner_role_type: Option<String>,
}

/// A database as reported by `SHOW DATABASES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub is_default: bool,
    pub is_current: bool,
    pub origin: Option<String>,
    pub owner: String,
    pub comment: String,
    pub options: String,
    pub transient: bool,
    pub retention_time: Option<i64>,
    pub dropped_on: Option<DateTime<Utc>>,
    pub kind: Option<String>,
    pub owner_role_type: Option<String>,
}

impl Database {
    pub fn id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(&self.name)
    }
}

impl ConvertibleRow for DatabaseRow {
    type Plain = Database;

    fn convert(&self) -> Result<Database> {
        let options = self.options.clone().unwrap_or_default();
        Ok(Database {
            created_on: self.created_on,
            name: self.name.clone(),
            is_default: self.is_default,
            is_current: self.is_current,
            origin: self.origin.clone().filter(|o| !o.is_empty()),
            owner: self.owner.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            transient: options.split(',').any(|o| o.trim() == "TRANSIENT"),
            options,
            retention_time: self.retention_time,
            dropped_on: self.dropped_on,
            kind: self.kind.clone(),
            owner_role_type: self.owner_role_type.clone(),
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Database operations, obtained from [`Client::databases`].
pub struct Databases<'a> {
    client: &'a Client,
}

impl<'a> Databases<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateDatabaseOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterDatabaseOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropDatabaseOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn undrop(&self, id: &AccountObjectIdentifier) -> Result<()> {
        let opts = UndropDatabaseOptions { name: id.clone() };
        executor::validate_and_exec(self.client, Some(&opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowDatabaseOptions>) -> Result<Vec<Database>> {
        let default = ShowDatabaseOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, DatabaseRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &AccountObjectIdentifier) -> Result<Database> {
        let opts = ShowDatabaseOptions {
            like: Some(Like::new(id.name())),
            ..Default::default()
        };
        let databases = self.show(Some(&opts)).await?;
        executor::show_by_id(databases, |d| d.name == id.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::to_sql;
    use crate::objects::common::TimeTravel;
    use crate::objects::testing::{client, row};
    use crate::validation::{err_exactly_one_of, err_int_between, err_one_of};
    use serde_json::json;

    fn id() -> AccountObjectIdentifier {
        AccountObjectIdentifier::new("db")
    }

    #[test]
    fn test_create() {
        let opts = CreateDatabaseOptions {
            or_replace: Some(true),
            transient: Some(true),
            data_retention_time_in_days: Some(1),
            max_data_extension_time_in_days: Some(10),
            external_volume: Some(AccountObjectIdentifier::new("ev")),
            log_level: Some(LogLevel::Info),
            trace_level: Some(TraceLevel::OnEvent),
            comment: Some("c".into()),
            tag: Some(vec![TagAssociation::new(AccountObjectIdentifier::new("t"), "v")]),
            ..CreateDatabaseOptions::new(id())
        };
        assert!(opts.validate().is_ok());
        assert_eq!(
            to_sql(&opts).unwrap(),
            "CREATE OR REPLACE TRANSIENT DATABASE \"db\" DATA_RETENTION_TIME_IN_DAYS = 1 \
             MAX_DATA_EXTENSION_TIME_IN_DAYS = 10 EXTERNAL_VOLUME = \"ev\" LOG_LEVEL = 'INFO' \
             TRACE_LEVEL = 'ON_EVENT' COMMENT = 'c' TAG (\"t\" = 'v')"
        );
    }

    #[test]
    fn test_create_clone() {
        let opts = CreateDatabaseOptions {
            if_not_exists: Some(true),
            clone: Some(CloneSource {
                source: AccountObjectIdentifier::new("src"),
                at: None,
                before: Some(TimeTravel {
                    statement: Some("01a2b3".into()),
                    ..Default::default()
                }),
            }),
            ..CreateDatabaseOptions::new(id())
        };
        assert!(opts.validate().is_ok());
        assert_eq!(
            to_sql(&opts).unwrap(),
            "CREATE DATABASE IF NOT EXISTS \"db\" CLONE \"src\" BEFORE (STATEMENT => '01a2b3')"
        );
    }

    #[test]
    fn test_create_validation() {
        let opts = CreateDatabaseOptions {
            or_replace: Some(true),
            if_not_exists: Some(true),
            data_retention_time_in_days: Some(91),
            ..CreateDatabaseOptions::new(id())
        };
        assert_eq!(
            opts.validate().unwrap_err().as_slice(),
            &[
                err_one_of("CreateDatabaseOptions", &["OrReplace", "IfNotExists"]),
                err_int_between("CreateDatabaseOptions", "DataRetentionTimeInDays", 0, 90),
            ]
        );
    }

    #[test]
    fn test_alter() {
        let rename = AlterDatabaseOptions {
            if_exists: Some(true),
            new_name: Some(AccountObjectIdentifier::new("db2")),
            ..AlterDatabaseOptions::new(id())
        };
        assert_eq!(
            to_sql(&rename).unwrap(),
            "ALTER DATABASE IF EXISTS \"db\" RENAME TO \"db2\""
        );

        let swap = AlterDatabaseOptions {
            swap_with: Some(AccountObjectIdentifier::new("other")),
            ..AlterDatabaseOptions::new(id())
        };
        assert_eq!(
            to_sql(&swap).unwrap(),
            "ALTER DATABASE \"db\" SWAP WITH \"other\""
        );

        let set = AlterDatabaseOptions {
            set: Some(DatabaseSet {
                data_retention_time_in_days: Some(5),
                comment: Some("x".into()),
                ..Default::default()
            }),
            ..AlterDatabaseOptions::new(id())
        };
        assert_eq!(
            to_sql(&set).unwrap(),
            "ALTER DATABASE \"db\" SET DATA_RETENTION_TIME_IN_DAYS = 5, COMMENT = 'x'"
        );

        let unset = AlterDatabaseOptions {
            unset: Some(DatabaseUnset {
                log_level: Some(true),
                trace_level: Some(true),
                ..Default::default()
            }),
            ..AlterDatabaseOptions::new(id())
        };
        assert_eq!(
            to_sql(&unset).unwrap(),
            "ALTER DATABASE \"db\" UNSET LOG_LEVEL, TRACE_LEVEL"
        );
    }

    #[test]
    fn test_alter_requires_one_action() {
        let opts = AlterDatabaseOptions {
            new_name: Some(AccountObjectIdentifier::new("a")),
            swap_with: Some(AccountObjectIdentifier::new("b")),
            ..AlterDatabaseOptions::new(id())
        };
        assert!(opts.validate().unwrap_err().contains(&err_exactly_one_of(
            "AlterDatabaseOptions",
            &["NewName", "SwapWith", "Set", "Unset", "SetTag", "UnsetTag"]
        )));
    }

    #[test]
    fn test_drop_undrop_show() {
        let drop = DropDatabaseOptions {
            if_exists: Some(true),
            cascade: Some(true),
            ..DropDatabaseOptions::new(id())
        };
        assert_eq!(to_sql(&drop).unwrap(), "DROP DATABASE IF EXISTS \"db\" CASCADE");

        let both = DropDatabaseOptions {
            cascade: Some(true),
            restrict: Some(true),
            ..DropDatabaseOptions::new(id())
        };
        assert!(both
            .validate()
            .unwrap_err()
            .contains(&err_one_of("DropDatabaseOptions", &["Cascade", "Restrict"])));

        let undrop = UndropDatabaseOptions { name: id() };
        assert_eq!(to_sql(&undrop).unwrap(), "UNDROP DATABASE \"db\"");

        let show = ShowDatabaseOptions {
            terse: Some(true),
            history: Some(true),
            like: Some(Like::new("db%")),
            starts_with: Some("d".into()),
            limit: Some(LimitFrom {
                rows: 10,
                from: Some("db1".into()),
            }),
        };
        assert_eq!(
            to_sql(&show).unwrap(),
            "SHOW TERSE DATABASES HISTORY LIKE 'db%' STARTS WITH 'd' LIMIT 10 FROM 'db1'"
        );
    }

    #[tokio::test]
    async fn test_show_by_id() {
        let (executor, client) = client();
        executor.push_rows(vec![row(json!({
            "created_on": "2024-02-03T04:05:06Z",
            "name": "db",
            "is_default": "N",
            "is_current": "N",
            "origin": "",
            "owner": "ACCOUNTADMIN",
            "comment": "",
            "options": "TRANSIENT",
            "retention_time": "1",
            "kind": "STANDARD"
        }))]);
        let db = client.databases().show_by_id(&id()).await.unwrap();
        assert!(db.transient);
        assert_eq!(db.retention_time, Some(1));
        assert_eq!(db.origin, None);
        assert_eq!(db.id(), id());
        assert_eq!(executor.statements(), vec!["SHOW DATABASES LIKE 'db'"]);
    }

    #[tokio::test]
    async fn test_undrop_runs_statement() {
        let (executor, client) = client();
        client.databases().undrop(&id()).await.unwrap();
        assert_eq!(executor.statements(), vec!["UNDROP DATABASE \"db\""]);
    }

    #[test]
    fn test_alter_empty_tag_lists_are_not_an_action() {
        let expected = err_exactly_one_of(
            "AlterDatabaseOptions",
            &["NewName", "SwapWith", "Set", "Unset", "SetTag", "UnsetTag"],
        );
        let set_tag = AlterDatabaseOptions {
            set_tag: Some(vec![]),
            ..AlterDatabaseOptions::new(id())
        };
        let unset_tag = AlterDatabaseOptions {
            unset_tag: Some(vec![]),
            ..AlterDatabaseOptions::new(id())
        };
        assert!(set_tag.validate().unwrap_err().contains(&expected));
        assert!(unset_tag.validate().unwrap_err().contains(&expected));
    }
}
