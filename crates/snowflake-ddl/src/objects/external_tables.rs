//! External tables.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{create_tags, validate_filters, validate_tags, In, Like, LimitFrom, TagAssociation};
use crate::client::Client;
use crate::core::identifier::{ObjectIdentifier, SchemaObjectIdentifier};
use crate::core::traits::Options;
use crate::core::value::sql_enum;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_optional_flag, ConvertibleRow};
use crate::validation::{field, Rules, ValidationErrors};

sql_enum! {
    pub enum ExternalTableFileFormatType ("external table file format type") {
        Csv = "CSV",
        Json = "JSON",
        Avro = "AVRO",
        Orc = "ORC",
        Parquet = "PARQUET",
        Xml = "XML",
    }
}

// =============================================================================
// CREATE
// =============================================================================

/// `"name" TYPE AS (expression) [NOT NULL]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalTableColumn {
    pub name: String,
    pub data_type: String,
    pub as_expression: String,
    pub not_null: Option<bool>,
}

impl ExternalTableColumn {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        as_expression: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            as_expression: as_expression.into(),
            not_null: None,
        }
    }
}

impl Structure for ExternalTableColumn {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param("", Some(&self.name), Modifiers::NO_EQUALS.double_quotes()),
            Field::keyword("", Some(&self.data_type), Modifiers::new()),
            Field::condition("AS", Some(&self.as_expression)),
            Field::flag("NOT NULL", self.not_null),
        ]
    }
}

/// `FILE_FORMAT = (FORMAT_NAME = '...' | TYPE = ...)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalTableFileFormat {
    pub format_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ExternalTableFileFormatType>,
}

impl ExternalTableFileFormat {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            format_name: Some(name.into()),
            kind: None,
        }
    }

    pub fn of_type(kind: ExternalTableFileFormatType) -> Self {
        Self {
            format_name: None,
            kind: Some(kind),
        }
    }
}

impl Structure for ExternalTableFileFormat {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param("FORMAT_NAME", self.format_name.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("TYPE", self.kind.as_ref(), Modifiers::EQUALS),
        ]
    }
}

/// `CREATE [OR REPLACE] EXTERNAL TABLE [IF NOT EXISTS] <name> ...`
///
/// The file format is either spelled out verbatim (`raw_file_format`) or
/// given as a structured [`ExternalTableFileFormat`]; exactly one is allowed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateExternalTableOptions {
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub columns: Option<Vec<ExternalTableColumn>>,
    pub cloud_provider_params: Option<String>,
    pub partition_by: Option<Vec<String>>,
    pub location: String,
    pub refresh_on_create: Option<bool>,
    pub auto_refresh: Option<bool>,
    pub pattern: Option<String>,
    pub raw_file_format: Option<String>,
    pub file_format: Option<ExternalTableFileFormat>,
    pub aws_sns_topic: Option<String>,
    pub copy_grants: Option<bool>,
    pub comment: Option<String>,
    pub tag: Option<Vec<TagAssociation>>,
}

impl CreateExternalTableOptions {
    pub fn new(name: SchemaObjectIdentifier, location: impl Into<String>) -> Self {
        Self {
            name,
            location: location.into(),
            ..Default::default()
        }
    }
}

impl Structure for CreateExternalTableOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::Static("EXTERNAL TABLE"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::records(
                "",
                self.columns.as_deref(),
                Separator::Comma,
                Modifiers::NO_EQUALS.parentheses(),
            ),
            Field::param(
                "CLOUD_PROVIDER_PARAMS",
                self.cloud_provider_params.as_ref(),
                Modifiers::EQUALS.parentheses(),
            ),
            Field::values(
                "PARTITION BY",
                self.partition_by.as_deref(),
                Separator::Comma,
                Modifiers::NO_EQUALS.parentheses(),
            ),
            Field::param("WITH LOCATION", Some(&self.location), Modifiers::EQUALS),
            Field::param("REFRESH_ON_CREATE", self.refresh_on_create.as_ref(), Modifiers::EQUALS),
            Field::param("AUTO_REFRESH", self.auto_refresh.as_ref(), Modifiers::EQUALS),
            Field::param("PATTERN", self.pattern.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param(
                "FILE_FORMAT",
                self.raw_file_format.as_ref(),
                Modifiers::EQUALS.parentheses(),
            ),
            Field::record(
                "FILE_FORMAT",
                self.file_format.as_ref(),
                Separator::Space,
                Modifiers::EQUALS.parentheses(),
            ),
            Field::param("AWS_SNS_TOPIC", self.aws_sns_topic.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::flag("COPY GRANTS", self.copy_grants),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            create_tags(self.tag.as_deref()),
        ]
    }
}

impl Options for CreateExternalTableOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("CreateExternalTableOptions");
        rules
            .one_of(&[
                field("OrReplace", &self.or_replace),
                field("IfNotExists", &self.if_not_exists),
            ])
            .valid_identifier(&self.name)
            .required("Location", &self.location)
            .exactly_one_of(&[
                field("RawFileFormat", &self.raw_file_format),
                field("FileFormat", &self.file_format),
            ]);
        if let Some(format) = &self.file_format {
            rules.nested("FileFormat", |r| {
                r.exactly_one_of(&[
                    field("FormatName", &format.format_name),
                    field("Type", &format.kind),
                ]);
            });
        }
        validate_tags(&mut rules, self.tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// DROP / SHOW
// =============================================================================

/// `DROP EXTERNAL TABLE [IF EXISTS] <name> [CASCADE | RESTRICT]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropExternalTableOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,
    pub cascade: Option<bool>,
    pub restrict: Option<bool>,
}

impl DropExternalTableOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for DropExternalTableOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP EXTERNAL TABLE"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::flag("CASCADE", self.cascade),
            Field::flag("RESTRICT", self.restrict),
        ]
    }
}

impl Options for DropExternalTableOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropExternalTableOptions")
            .valid_identifier(&self.name)
            .one_of(&[field("Cascade", &self.cascade), field("Restrict", &self.restrict)])
            .finish()
    }
}

/// `SHOW [TERSE] EXTERNAL TABLES [LIKE ...] [IN ...] [STARTS WITH ...] [LIMIT ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowExternalTableOptions {
    pub terse: Option<bool>,
    pub like: Option<Like>,
    pub r#in: Option<In>,
    pub starts_with: Option<String>,
    pub limit: Option<LimitFrom>,
}

impl Structure for ShowExternalTableOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW"),
            Field::flag("TERSE", self.terse),
            Field::Static("EXTERNAL TABLES"),
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

impl Options for ShowExternalTableOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowExternalTableOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

#[derive(Debug, Deserialize)]
struct ExternalTableRow {
    created_on: DateTime<Utc>,
    name: String,
    database_name: String,
    schema_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    invalid: bool,
    invalid_reason: Option<String>,
    owner: String,
    comment: Option<String>,
    stage: Option<String>,
    location: String,
    file_format_name: Option<String>,
    file_format_type: Option<String>,
    cloud: Option<String>,
    region: Option<String>,
    notification_channel: Option<String>,
    #[serde(default)]
    owner_role_type: Option<String>,
}

/// An external table as reported by `SHOW EXTERNAL TABLES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTable {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub invalid: bool,
    pub invalid_reason: Option<String>,
    pub owner: String,
    pub comment: String,
    pub stage: Option<String>,
    pub location: String,
    pub file_format_name: Option<String>,
    pub file_format_type: Option<ExternalTableFileFormatType>,
    pub cloud: Option<String>,
    pub region: Option<String>,
    pub notification_channel: Option<String>,
    pub owner_role_type: Option<String>,
}

impl ExternalTable {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty() && v != "null")
}

impl ConvertibleRow for ExternalTableRow {
    type Plain = ExternalTable;

    fn convert(&self) -> Result<ExternalTable> {
        let file_format_type = present(&self.file_format_type)
            .map(|t| t.parse::<ExternalTableFileFormatType>())
            .transpose()?;
        Ok(ExternalTable {
            created_on: self.created_on,
            name: self.name.clone(),
            database_name: self.database_name.clone(),
            schema_name: self.schema_name.clone(),
            invalid: self.invalid,
            invalid_reason: present(&self.invalid_reason),
            owner: self.owner.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            stage: present(&self.stage),
            location: self.location.clone(),
            file_format_name: present(&self.file_format_name),
            file_format_type,
            cloud: present(&self.cloud),
            region: present(&self.region),
            notification_channel: present(&self.notification_channel),
            owner_role_type: self.owner_role_type.clone(),
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// External table operations, obtained from [`Client::external_tables`].
pub struct ExternalTables<'a> {
    client: &'a Client,
}

impl<'a> ExternalTables<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateExternalTableOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropExternalTableOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowExternalTableOptions>) -> Result<Vec<ExternalTable>> {
        let default = ShowExternalTableOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, ExternalTableRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<ExternalTable> {
        let opts = ShowExternalTableOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::schema(id.schema_id())),
            ..Default::default()
        };
        let tables = self.show(Some(&opts)).await?;
        executor::show_by_id(tables, |t| {
            t.name == id.name() && t.database_name == id.database_name()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::AccountObjectIdentifier;
    use crate::ddl::to_sql;
    use crate::error::SdkError;
    use crate::objects::testing::{client, row};
    use crate::validation::{err_exactly_one_of, err_not_set, err_one_of, ValidationError};
    use serde_json::json;

    fn id() -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new("db", "sch", "ext")
    }

    #[test]
    fn test_create_with_raw_file_format() {
        let opts = CreateExternalTableOptions {
            or_replace: Some(true),
            columns: Some(vec![
                ExternalTableColumn::new("id", "NUMBER", "value:id::NUMBER"),
                ExternalTableColumn {
                    not_null: Some(true),
                    ..ExternalTableColumn::new("ts", "TIMESTAMP", "value:ts::TIMESTAMP")
                },
            ]),
            partition_by: Some(vec!["ts".into()]),
            auto_refresh: Some(false),
            pattern: Some(".*[.]json".into()),
            raw_file_format: Some("TYPE = JSON".into()),
            comment: Some("c".into()),
            ..CreateExternalTableOptions::new(id(), "@db.sch.stage/path")
        };
        assert!(opts.validate().is_ok());
        assert_eq!(
            to_sql(&opts).unwrap(),
            "CREATE OR REPLACE EXTERNAL TABLE \"db\".\"sch\".\"ext\" \
             (\"id\" NUMBER AS (value:id::NUMBER), \"ts\" TIMESTAMP AS (value:ts::TIMESTAMP) NOT NULL) \
             PARTITION BY (ts) WITH LOCATION = @db.sch.stage/path AUTO_REFRESH = false \
             PATTERN = '.*[.]json' FILE_FORMAT = (TYPE = JSON) COMMENT = 'c'"
        );
    }

    #[test]
    fn test_create_with_named_format_and_tags() {
        let opts = CreateExternalTableOptions {
            if_not_exists: Some(true),
            file_format: Some(ExternalTableFileFormat::named("my_format")),
            copy_grants: Some(true),
            tag: Some(vec![TagAssociation::new(AccountObjectIdentifier::new("t"), "v")]),
            ..CreateExternalTableOptions::new(id(), "@s")
        };
        assert!(opts.validate().is_ok());
        assert_eq!(
            to_sql(&opts).unwrap(),
            "CREATE EXTERNAL TABLE IF NOT EXISTS \"db\".\"sch\".\"ext\" WITH LOCATION = @s \
             FILE_FORMAT = (FORMAT_NAME = 'my_format') COPY GRANTS TAG (\"t\" = 'v')"
        );

        let typed = CreateExternalTableOptions {
            file_format: Some(ExternalTableFileFormat::of_type(ExternalTableFileFormatType::Parquet)),
            ..CreateExternalTableOptions::new(id(), "@s")
        };
        assert!(to_sql(&typed).unwrap().ends_with("FILE_FORMAT = (TYPE = PARQUET)"));
    }

    #[test]
    fn test_create_collects_every_violation_in_order() {
        let opts = CreateExternalTableOptions {
            or_replace: Some(true),
            if_not_exists: Some(true),
            ..CreateExternalTableOptions::new(SchemaObjectIdentifier::new("", "", ""), "")
        };
        let errs = opts.validate().unwrap_err();
        assert_eq!(
            errs.as_slice(),
            &[
                err_one_of("CreateExternalTableOptions", &["OrReplace", "IfNotExists"]),
                ValidationError::InvalidObjectIdentifier,
                err_not_set("CreateExternalTableOptions", "Location"),
                err_exactly_one_of("CreateExternalTableOptions", &["RawFileFormat", "FileFormat"]),
            ]
        );
    }

    #[test]
    fn test_file_format_needs_name_or_type() {
        let opts = CreateExternalTableOptions {
            file_format: Some(ExternalTableFileFormat::default()),
            ..CreateExternalTableOptions::new(id(), "@s")
        };
        assert_eq!(
            opts.validate().unwrap_err().as_slice(),
            &[err_exactly_one_of(
                "CreateExternalTableOptions.FileFormat",
                &["FormatName", "Type"]
            )]
        );
    }

    #[test]
    fn test_drop() {
        let opts = DropExternalTableOptions {
            if_exists: Some(true),
            cascade: Some(true),
            ..DropExternalTableOptions::new(id())
        };
        assert_eq!(
            to_sql(&opts).unwrap(),
            "DROP EXTERNAL TABLE IF EXISTS \"db\".\"sch\".\"ext\" CASCADE"
        );
    }

    fn table_row(database: &str, format_type: &str) -> crate::core::traits::Row {
        row(json!({
            "created_on": "2024-03-01T10:00:00Z",
            "name": "ext",
            "database_name": database,
            "schema_name": "sch",
            "invalid": "false",
            "invalid_reason": null,
            "owner": "SYSADMIN",
            "comment": null,
            "stage": "@db.sch.stage",
            "location": "@db.sch.stage/path",
            "file_format_name": "",
            "file_format_type": format_type,
            "cloud": "aws",
            "region": "us-west-2",
            "notification_channel": null
        }))
    }

    #[tokio::test]
    async fn test_show_by_id_matches_database() {
        let (executor, client) = client();
        executor.push_rows(vec![table_row("other", "JSON"), table_row("db", "json")]);

        let table = client.external_tables().show_by_id(&id()).await.unwrap();
        assert_eq!(table.id(), id());
        assert_eq!(table.file_format_type, Some(ExternalTableFileFormatType::Json));
        assert_eq!(table.file_format_name, None);
        assert!(!table.invalid);
        assert_eq!(
            executor.last_statement().unwrap(),
            "SHOW EXTERNAL TABLES LIKE 'ext' IN SCHEMA \"db\".\"sch\""
        );
    }

    #[tokio::test]
    async fn test_show_rejects_unknown_format_type() {
        let (executor, client) = client();
        executor.push_rows(vec![table_row("db", "PAPYRUS")]);
        let err = client.external_tables().show(None).await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidEnum { .. }));
    }
}
