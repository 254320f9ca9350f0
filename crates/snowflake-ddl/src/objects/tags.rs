//! Tags.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{validate_filters, In, Like};
use crate::client::Client;
use crate::core::identifier::{ObjectIdentifier, SchemaObjectIdentifier};
use crate::core::traits::Options;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::ConvertibleRow;
use crate::validation::{field, list, Rules, ValidationErrors};

/// A tag admits at most this many allowed values.
pub const MAX_ALLOWED_VALUES: i64 = 300;

fn allowed_values<'a>(literal: &'static str, values: Option<&'a [String]>) -> Field<'a> {
    Field::values(literal, values, Separator::Comma, Modifiers::NO_EQUALS.single_quotes())
}

fn masking_policies<'a>(
    literal: &'static str,
    policies: Option<&'a [SchemaObjectIdentifier]>,
) -> Field<'a> {
    Field::values(literal, policies, Separator::Comma, Modifiers::NO_EQUALS)
}

fn check_allowed_values(rules: &mut Rules, name: &str, values: Option<&[String]>) {
    if let Some(values) = values {
        let count = i64::try_from(values.len()).unwrap_or(i64::MAX);
        rules.int_in_range(name, Some(count), 1, MAX_ALLOWED_VALUES);
    }
}

// =============================================================================
// CREATE
// =============================================================================

/// `CREATE [OR REPLACE] TAG [IF NOT EXISTS] <name> [ALLOWED_VALUES ...] [COMMENT = ...]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTagOptions {
    pub or_replace: Option<bool>,
    pub if_not_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub allowed_values: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl CreateTagOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for CreateTagOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CREATE"),
            Field::flag("OR REPLACE", self.or_replace),
            Field::Static("TAG"),
            Field::flag("IF NOT EXISTS", self.if_not_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            allowed_values("ALLOWED_VALUES", self.allowed_values.as_deref()),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

impl Options for CreateTagOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("CreateTagOptions");
        rules.valid_identifier(&self.name).one_of(&[
            field("OrReplace", &self.or_replace),
            field("IfNotExists", &self.if_not_exists),
        ]);
        check_allowed_values(&mut rules, "AllowedValues", self.allowed_values.as_deref());
        rules.finish()
    }
}

// =============================================================================
// ALTER
// =============================================================================

/// `SET MASKING POLICY <p1>, <p2> [FORCE]` or `SET COMMENT = '...'`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagSet {
    pub masking_policies: Option<Vec<SchemaObjectIdentifier>>,
    pub force: Option<bool>,
    pub comment: Option<String>,
}

impl Structure for TagSet {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            masking_policies("MASKING POLICY", self.masking_policies.as_deref()),
            Field::flag("FORCE", self.force),
            Field::param("COMMENT", self.comment.as_ref(), Modifiers::SINGLE_QUOTED),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagUnset {
    pub masking_policies: Option<Vec<SchemaObjectIdentifier>>,
    pub allowed_values: Option<bool>,
    pub comment: Option<bool>,
}

impl Structure for TagUnset {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            masking_policies("MASKING POLICY", self.masking_policies.as_deref()),
            Field::flag("ALLOWED_VALUES", self.allowed_values),
            Field::flag("COMMENT", self.comment),
        ]
    }
}

/// `ALTER TAG [IF EXISTS] <name> <action>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlterTagOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,

    pub add_allowed_values: Option<Vec<String>>,
    pub drop_allowed_values: Option<Vec<String>>,
    pub set: Option<TagSet>,
    pub unset: Option<TagUnset>,
    pub rename_to: Option<SchemaObjectIdentifier>,
}

impl AlterTagOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Structure for AlterTagOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("ALTER TAG"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            allowed_values("ADD ALLOWED_VALUES", self.add_allowed_values.as_deref()),
            allowed_values("DROP ALLOWED_VALUES", self.drop_allowed_values.as_deref()),
            Field::record("SET", self.set.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("UNSET", self.unset.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::ident("RENAME TO", self.rename_to.as_ref(), Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for AlterTagOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("AlterTagOptions");
        rules
            .valid_identifier(&self.name)
            .exactly_one_of(&[
                list("AddAllowedValues", &self.add_allowed_values),
                list("DropAllowedValues", &self.drop_allowed_values),
                field("Set", &self.set),
                field("Unset", &self.unset),
                field("RenameTo", &self.rename_to),
            ])
            .valid_identifier_if_set(self.rename_to.as_ref());
        check_allowed_values(&mut rules, "AddAllowedValues", self.add_allowed_values.as_deref());
        check_allowed_values(&mut rules, "DropAllowedValues", self.drop_allowed_values.as_deref());
        if let Some(set) = &self.set {
            rules.nested("Set", |r| {
                r.exactly_one_of(&[
                    list("MaskingPolicies", &set.masking_policies),
                    field("Comment", &set.comment),
                ]);
                if let Some(policies) = &set.masking_policies {
                    r.valid_identifiers(policies);
                }
            });
        }
        if let Some(unset) = &self.unset {
            rules.nested("Unset", |r| {
                r.exactly_one_of(&[
                    list("MaskingPolicies", &unset.masking_policies),
                    field("AllowedValues", &unset.allowed_values),
                    field("Comment", &unset.comment),
                ]);
            });
        }
        rules.finish()
    }
}

// =============================================================================
// DROP / UNDROP / SHOW
// =============================================================================

/// `DROP TAG [IF EXISTS] <name>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropTagOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifier,
}

impl DropTagOptions {
    pub fn new(name: SchemaObjectIdentifier) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropTagOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("DROP TAG"),
            Field::flag("IF EXISTS", self.if_exists),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for DropTagOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropTagOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
struct UndropTagOptions {
    name: SchemaObjectIdentifier,
}

impl Structure for UndropTagOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("UNDROP TAG"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
        ]
    }
}

impl Options for UndropTagOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("UndropTagOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW TAGS [LIKE ...] [IN ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowTagOptions {
    pub like: Option<Like>,
    pub r#in: Option<In>,
}

impl Structure for ShowTagOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW TAGS"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("IN", self.r#in.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowTagOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowTagOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

#[derive(Debug, Deserialize)]
struct TagRow {
    created_on: DateTime<Utc>,
    name: String,
    database_name: String,
    schema_name: String,
    owner: String,
    comment: Option<String>,
    allowed_values: Option<String>,
    #[serde(default)]
    owner_role_type: Option<String>,
}

/// A tag as reported by `SHOW TAGS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub created_on: DateTime<Utc>,
    pub name: String,
    pub database_name: String,
    pub schema_name: String,
    pub owner: String,
    pub comment: String,
    /// `None` when the tag accepts any value.
    pub allowed_values: Option<Vec<String>>,
    pub owner_role_type: Option<String>,
}

impl Tag {
    pub fn id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(&self.database_name, &self.schema_name, &self.name)
    }
}

impl ConvertibleRow for TagRow {
    type Plain = Tag;

    fn convert(&self) -> Result<Tag> {
        let allowed_values = match self.allowed_values.as_deref().map(str::trim) {
            None | Some("") | Some("null") => None,
            Some(raw) => Some(serde_json::from_str::<Vec<String>>(raw)?),
        };
        Ok(Tag {
            created_on: self.created_on,
            name: self.name.clone(),
            database_name: self.database_name.clone(),
            schema_name: self.schema_name.clone(),
            owner: self.owner.clone(),
            comment: self.comment.clone().unwrap_or_default(),
            allowed_values,
            owner_role_type: self.owner_role_type.clone(),
        })
    }
}

// =============================================================================
// Accessor
// =============================================================================

/// Tag operations, obtained from [`Client::tags`].
pub struct Tags<'a> {
    client: &'a Client,
}

impl<'a> Tags<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, opts: &CreateTagOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn alter(&self, opts: &AlterTagOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn drop(&self, opts: &DropTagOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn undrop(&self, id: &SchemaObjectIdentifier) -> Result<()> {
        let opts = UndropTagOptions { name: id.clone() };
        executor::validate_and_exec(self.client, Some(&opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowTagOptions>) -> Result<Vec<Tag>> {
        let default = ShowTagOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, TagRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifier) -> Result<Tag> {
        let opts = ShowTagOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::schema(id.schema_id())),
        };
        let tags = self.show(Some(&opts)).await?;
        executor::show_by_id(tags, |t| t.name == id.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::to_sql;
    use crate::objects::testing::{client, row};
    use crate::validation::{err_exactly_one_of, err_int_between, err_one_of};
    use serde_json::json;

    fn id() -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new("db", "sch", "cost_center")
    }

    #[test]
    fn test_create() {
        let opts = CreateTagOptions {
            if_not_exists: Some(true),
            allowed_values: Some(vec!["finance".into(), "engineering".into()]),
            comment: Some("owner team".into()),
            ..CreateTagOptions::new(id())
        };
        assert!(opts.validate().is_ok());
        assert_eq!(
            to_sql(&opts).unwrap(),
            "CREATE TAG IF NOT EXISTS \"db\".\"sch\".\"cost_center\" \
             ALLOWED_VALUES 'finance', 'engineering' COMMENT = 'owner team'"
        );
    }

    #[test]
    fn test_create_validation() {
        let opts = CreateTagOptions {
            or_replace: Some(true),
            if_not_exists: Some(true),
            allowed_values: Some(vec![]),
            ..CreateTagOptions::new(id())
        };
        assert_eq!(
            opts.validate().unwrap_err().as_slice(),
            &[
                err_one_of("CreateTagOptions", &["OrReplace", "IfNotExists"]),
                err_int_between("CreateTagOptions", "AllowedValues", 1, 300),
            ]
        );

        let too_many = CreateTagOptions {
            allowed_values: Some((0..301).map(|i| i.to_string()).collect()),
            ..CreateTagOptions::new(id())
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_alter_forms() {
        let add = AlterTagOptions {
            add_allowed_values: Some(vec!["sales".into()]),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            to_sql(&add).unwrap(),
            "ALTER TAG \"db\".\"sch\".\"cost_center\" ADD ALLOWED_VALUES 'sales'"
        );

        let drop = AlterTagOptions {
            if_exists: Some(true),
            drop_allowed_values: Some(vec!["sales".into(), "hr".into()]),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            to_sql(&drop).unwrap(),
            "ALTER TAG IF EXISTS \"db\".\"sch\".\"cost_center\" DROP ALLOWED_VALUES 'sales', 'hr'"
        );

        let unset_values = AlterTagOptions {
            unset: Some(TagUnset {
                allowed_values: Some(true),
                ..Default::default()
            }),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            to_sql(&unset_values).unwrap(),
            "ALTER TAG \"db\".\"sch\".\"cost_center\" UNSET ALLOWED_VALUES"
        );

        let set_comment = AlterTagOptions {
            set: Some(TagSet {
                comment: Some("c".into()),
                ..Default::default()
            }),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            to_sql(&set_comment).unwrap(),
            "ALTER TAG \"db\".\"sch\".\"cost_center\" SET COMMENT = 'c'"
        );

        let set_policies = AlterTagOptions {
            set: Some(TagSet {
                masking_policies: Some(vec![SchemaObjectIdentifier::new("db", "sch", "mp")]),
                force: Some(true),
                comment: None,
            }),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            to_sql(&set_policies).unwrap(),
            "ALTER TAG \"db\".\"sch\".\"cost_center\" SET MASKING POLICY \"db\".\"sch\".\"mp\" FORCE"
        );

        let rename = AlterTagOptions {
            rename_to: Some(SchemaObjectIdentifier::new("db", "sch", "team")),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            to_sql(&rename).unwrap(),
            "ALTER TAG \"db\".\"sch\".\"cost_center\" RENAME TO \"db\".\"sch\".\"team\""
        );
    }

    #[test]
    fn test_alter_validation() {
        let opts = AlterTagOptions {
            unset: Some(TagUnset {
                allowed_values: Some(true),
                comment: Some(true),
                ..Default::default()
            }),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            opts.validate().unwrap_err().as_slice(),
            &[err_exactly_one_of(
                "AlterTagOptions.Unset",
                &["MaskingPolicies", "AllowedValues", "Comment"]
            )]
        );
    }

    #[tokio::test]
    async fn test_show_by_id_and_undrop() {
        let (executor, client) = client();
        executor.push_rows(vec![row(json!({
            "created_on": "2024-02-01T00:00:00Z",
            "name": "cost_center",
            "database_name": "db",
            "schema_name": "sch",
            "owner": "ACCOUNTADMIN",
            "comment": "owner team",
            "allowed_values": "[\"finance\",\"engineering\"]"
        }))]);

        let tag = client.tags().show_by_id(&id()).await.unwrap();
        assert_eq!(tag.id(), id());
        assert_eq!(
            tag.allowed_values,
            Some(vec!["finance".to_string(), "engineering".to_string()])
        );

        client.tags().undrop(&id()).await.unwrap();
        assert_eq!(
            executor.statements(),
            vec![
                "SHOW TAGS LIKE 'cost_center' IN SCHEMA \"db\".\"sch\"",
                "UNDROP TAG \"db\".\"sch\".\"cost_center\""
            ]
        );
    }

    #[tokio::test]
    async fn test_show_tag_without_allowed_values() {
        let (executor, client) = client();
        executor.push_rows(vec![row(json!({
            "created_on": "2024-02-01T00:00:00Z",
            "name": "free",
            "database_name": "db",
            "schema_name": "sch",
            "owner": "ACCOUNTADMIN",
            "comment": null,
            "allowed_values": null
        }))]);
        let tags = client.tags().show(None).await.unwrap();
        assert_eq!(tags[0].allowed_values, None);
        assert_eq!(executor.last_statement().unwrap(), "SHOW TAGS");
    }

    #[test]
    fn test_alter_empty_lists_are_not_an_action() {
        let empty_add = AlterTagOptions {
            add_allowed_values: Some(vec![]),
            ..AlterTagOptions::new(id())
        };
        assert!(empty_add.validate().unwrap_err().contains(&err_exactly_one_of(
            "AlterTagOptions",
            &["AddAllowedValues", "DropAllowedValues", "Set", "Unset", "RenameTo"]
        )));

        let empty_policies = AlterTagOptions {
            set: Some(TagSet {
                masking_policies: Some(vec![]),
                ..Default::default()
            }),
            ..AlterTagOptions::new(id())
        };
        assert_eq!(
            empty_policies.validate().unwrap_err().as_slice(),
            &[err_exactly_one_of("AlterTagOptions.Set", &["MaskingPolicies", "Comment"])]
        );
    }
}
