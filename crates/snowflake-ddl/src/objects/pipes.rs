//! Pipes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{unset_tags, validate_filters, validate_tags, In, Like, TagAssociation};
use crate::client::Client;
use crate::core::identifier::{Identifier, ObjectIdentifier, SchemaObjectIdentifier};
use crate::core::traits::Options;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::ConvertibleRow;
use crate::validation::{field, list, Rules, ValidationErrors};

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] PIPE [IF NOT EXISTS] <name> ... AS <copy statement>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePipeOptions {
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub auto_ingest: Option<bool>,
    pub error_integration: Option<String>,
    pub aws_sns_topic: Option<String>,
    pub integration: Option<String>,
    pub comment: Option<String>,
    pub copy_statement: String,
}

impl CreatePipeOptions {
    pub fn new(name: SchemaObjectIdentifier, copy_statement: impl Into<String>) -> Self {
        Self {
            name,
            copy_statement: copy_statement.into(),
            ..Default::default()
        }
    }
}

impl Structure for CreatePipeOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::Static("PIPE"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::param("AUTO_INGEST", self.auto_ingest.as_ref(), Modifiers::EQUALS),
            Field::param("ERROR_INTEGRATION", self.error_integration.as_ref(), Modifiers::EQUALS),
            Field::param("AWS_SNS_TOPIC", self.aws_sns_topic.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("INTEGRATION", self.integration.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("AS", Some(&self.copy_statement), Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for CreatePipeOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("CreatePipeOptions")
            .valid_identifier(&self.name)
            .one_of(&[
                field("OrReplace", &self.or_replace),
                field("IfNotExists", &self.if_not_exists),
            ])
            .required("CopyStatement", &self.copy_statement)
            .finish()
    }
}

// =============================================================================
// ALTER
// =============================================================================

/// Properties changed by `ALTER PIPE ... SET`. Tags may ride along with the
/// other properties.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipeSet {
    pub error_integration: Option<String>,
    pub pipe_execution_paused: Option<bool>,
    pub tag: Option<Vec<TagAssociation>>,
    pub comment: Option<String>,
}

impl Structure for PipeSet {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param(
                "ERROR_INTEGRATION",
                self.error_integration.as_ref(),
                Modifiers::SINGLE_QUOTED,
            ),
            Field::param(
                "PIPE_EXECUTION_PAUSED",
                self.pipe_execution_paused.as_ref(),
                Modifiers::EQUALS,
            ),
            Field::records("TAG", self.tag.as_deref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipeUnset {
    pub pipe_execution_paused: Option<bool>,
    pub comment: Option<bool>,
}

impl Structure for PipeUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("PIPE_EXECUTION_PAUSED", self.pipe_execution_paused),
            Field::flag("COMMENT", self.comment),
        ]
    }
}

/// `REFRESH [PREFIX = '...'] [MODIFIED_AFTER = '...']`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipeRefresh {
    pub prefix: Option<String>,
    pub modified_after: Option<String>,
}

impl Structure for PipeRefresh {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param("PREFIX", self.prefix.as_ref(), Modifiers::SINGLE_QUOTED),
            Field::param("MODIFIED_AFTER", self.modified_after.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

/// `ALTER PIPE [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterPipeOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub set: Option<PipeSet>,
    pub unset: Option<PipeUnset>,
    pub set_tag: Option<Vec<TagAssociation>>,
    pub unset_tag: Option<Vec<Identifier>>,
    pub refresh: Option<PipeRefresh>,
}

impl AlterPipeOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for AlterPipeOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER PIPE"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::record("SET", self.set.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Comma, Modifiers::NO_EQUALS),
            Field::records(
                "SET TAG",
                self.set_tag.as_deref(),
                Separator::Comma,
                Modifiers::NO_EQUALS,
            ),
            unset_tags(self.unset_tag.as_deref()),
            Field::record("REFRESH", self.refresh.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for AlterPipeOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterPipeOptions");
        rules.valid_identifier(&self.name).exactly_one_of(&[
            field("Set", &self.set),
            field("Unset", &self.unset),
            list("SetTag", &self.set_tag),
            list("UnsetTag", &self.unset_tag),
            field("Refresh", &self.refresh),
        ]);
        if let Some(set) = &self.set {
            rules.nested("Set", |r| {
                r.at_least_one_of(&[
                    field("ErrorIntegration", &set.error_integration),
                    field("PipeExecutionPaused", &set.pipe_execution_paused),
                    list("Tag", &set.tag),
                    field("Comment", &set.comment),
                ]);
                validate_tags(r, set.tag.as_deref());
            });
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| {
                r.at_least_one_of(&[
                    field("PipeExecutionPaused", &unset.pipe_execution_paused),
                    field("Comment", &unset.comment),
                ]);
            });
        }
        validate_tags(&mut rules, self.set_tag.as_deref());
        rules.finish()
    }
}

// =============================================================================
// DROP / SHOW / DESCRIBE
// =============================================================================

/// `DROP PIPE [IF EXISTS] <name>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropPipeOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,
}

impl DropPipeOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropPipeOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP PIPE"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DropPipeOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropPipeOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW PIPES [LIKE ...] [IN ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowPipeOptions {
    pub like: Option<Like>,
    pub r#in: Option<In>,
}

impl Structure for ShowPipeOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW PIPES"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("IN", self.r#in.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowPipeOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowPipeOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

/// `DESCRIBE PIPE <name>`
#[derive(Debug, Clone, Default)]
pub struct DescribePipeOptions {
    pub name: SchemaObjectIdentifier,
}

impl Structure for DescribePipeOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DESCRIBE PIPE"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DescribePipeOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DescribePipeOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct PipeRow {
    created_on: DateTime<Utc>,
    name: String,
    database_name: String,
    schema_name: String,
    definition: String,
    owner: String,
    notification_channel: Option<String>,
    comment: Option<String>,
    integration: Option<String>,
    pattern: Option<String>,
    error_integration: Option<String>,
    #[serde(default)]
    owner_role_type: Option<String>,
    #[serde(default)]
    invalid_reason: Option<String>,
}

/// A pipe as reported by `SHOW PIPES` and `DESCRIBE PIPE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipe {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub definition: String,
    pub owner: String,
    pub notification_channel: Option<String>,
    pub comment: String,
    pub integration: Option<String>,
    pub pattern: Option<String>,
    pub error_integration: Option<String>,
    pub owner_role_type: Option<String>,
    pub invalid_reason: Option<String>,
}

impl Pipe {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty() && v != "null")
}

impl ConvertibleRow for PipeRow {
    type Plain = Pipe;

    fn convert(&self) -> Result<Pipe> {
        Ok(Pipe {
            created_on: self.created_on,
            name: self.name.clone(),
            database_name: self.database_name.clone(),
            schema_name: self.schema_name.clone(),
            definition: self.definition.clone(),
            owner: self.owner.clone(),
            notification_channel: present(&self.notification_channel),
            comment: self.comment.clone().unwrap_or_default(),
            integration: present(&self.integration),
            pattern: present(&self.pattern),
            error_integration: present(&self.error_integration),
            owner_role_type: self.owner_role_type.clone(),
            invalid_reason: present(&self.invalid_reason),
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Pipe operations, obtained from [`Client::pipes`].
pub struct Pipes<'a> {
    client: &'a Client,
}

impl<'a> Pipes<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreatePipeOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterPipeOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropPipeOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowPipeOptions>) -> Result<Vec<Pipe>> {
        let default = ShowPipeOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, PipeRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<Pipe> {
        let opts = ShowPipeOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::schema(id.schema_id())),
        };
        let pipes = self.show(Some(&opts)).await?;
        executor::show_by_id(pipes, |p| p.name == id.name())
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifier) -> Result<Pipe> {
        let opts = DescribePipeOptions { name: id.clone() };
        executor::validate_and_query_one::<_, PipeRow>(self.client, Some(&opts)).await
    }
}
