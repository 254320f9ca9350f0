//! Stored procedures.

use serde::Deserialize;

use super::common::{parse_argument_types, validate_filters, In, Like};
use super::functions::{same_arguments, signature_fields};
use crate::client::Client;
use crate::core::identifier::{
    ObjectIdentifier, SchemaObjectIdentifier, SchemaObjectIdentifierWithArguments,
};
use crate::core::traits::{Options, Row};
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_lenient_int, deserialize_optional_flag, ConvertibleRow};
use crate::validation::{Rules, ValidationErrors};

/// `DROP PROCEDURE [IF EXISTS] <name> (<argument types>)`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropProcedureOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifierWithArguments,
}

impl DropProcedureOptions {
    pub fn new(name: SchemaObjectIdentifierWithArguments) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropProcedureOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::Static("DROP PROCEDURE"),
            Field::flag("IF EXISTS", self.if_exists),
        ];
        fields.extend(signature_fields(&self.name));
        fields
    }
}

impl Options for DropProcedureOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropProcedureOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
struct DescribeProcedureOptions {
    name: SchemaObjectIdentifierWithArguments,
}

impl Structure for DescribeProcedureOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![Field::Static("DESCRIBE PROCEDURE")];
        fields.extend(signature_fields(&self.name));
        fields
    }
}

impl Options for DescribeProcedureOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DescribeProcedureOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `CALL <name> (<arg>, ...)`
///
/// Arguments are SQL expressions and are emitted verbatim; string literals
/// must carry their own quotes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallProcedureOptions {
    pub name: SchemaObjectIdentifier,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl CallProcedureOptions {
    pub fn new<I, S>(name: SchemaObjectIdentifier, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl Structure for CallProcedureOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("CALL"),
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::values(
                "",
                Some(self.arguments.as_slice()),
                Separator::Comma,
                Modifiers::NO_EQUALS.parentheses(),
            ),
        ]
    }
}

impl Options for CallProcedureOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("CallProcedureOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW PROCEDURES [LIKE ...] [IN ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowProcedureOptions {
    pub like: Option<Like>,
    pub r#in: Option<In>,
}

impl Structure for ShowProcedureOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW PROCEDURES"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("IN", self.r#in.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowProcedureOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowProcedureOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

#[derive(Debug, Deserialize)]
struct ProcedureRow {
    created_on: String,
    name: String,
    schema_name: String,
    catalog_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    is_builtin: bool,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    min_num_arguments: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    max_num_arguments: Option<i64>,
    arguments: String,
    description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    is_table_function: bool,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    is_secure: bool,
}

/// A stored procedure as reported by `SHOW PROCEDURES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub created_on: String,
    pub name: String,
    pub schema_name: String,
    pub catalog_name: String,
    pub is_builtin: bool,
    pub min_num_arguments: i64,
    pub max_num_arguments: i64,
    pub arguments: String,
    pub argument_types: Vec<String>,
    pub description: String,
    pub is_table_function: bool,
    pub is_secure: bool,
}

impl Procedure {
    pub fn id(&self) -> SchemaObjectIdentifierWithArguments {
        SchemaObjectIdentifierWithArguments::new(
            &self.catalog_name,
            &self.schema_name,
            &self.name,
            self.argument_types.iter().cloned(),
        )
    }
}

impl ConvertibleRow for ProcedureRow {
    type Plain = Procedure;

    fn convert(&self) -> Result<Procedure> {
        Ok(Procedure {
            created_on: self.created_on.clone(),
            name: self.name.clone(),
            schema_name: self.schema_name.clone(),
            catalog_name: self.catalog_name.clone(),
            is_builtin: self.is_builtin,
            min_num_arguments: self.min_num_arguments.unwrap_or_default(),
            max_num_arguments: self.max_num_arguments.unwrap_or_default(),
            arguments: self.arguments.clone(),
            argument_types: parse_argument_types(&self.arguments),
            description: self.description.clone().unwrap_or_default(),
            is_table_function: self.is_table_function,
            is_secure: self.is_secure,
        })
    }
}

/// One `property`/`value` row of `DESCRIBE PROCEDURE`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcedureDetail {
    pub property: String,
    pub value: Option<String>,
}

// =============================================================================
// Accessor
// =============================================================================

/// Procedure operations, obtained from [`Client::procedures`].
pub struct Procedures<'a> {
    client: &'a Client,
}

impl<'a> Procedures<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn drop(&self, opts: &DropProcedureOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowProcedureOptions>) -> Result<Vec<Procedure>> {
        let default = ShowProcedureOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, ProcedureRow>(self.client, Some(opts)).await
    }

    pub async fn show_by_id(&self, id: &SchemaObjectIdentifierWithArguments) -> Result<Procedure> {
        let opts = ShowProcedureOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::schema(id.schema_id())),
        };
        let procedures = self.show(Some(&opts)).await?;
        executor::show_by_id(procedures, |p| {
            p.name == id.name() && same_arguments(id, &p.argument_types)
        })
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifierWithArguments) -> Result<Vec<ProcedureDetail>> {
        let opts = DescribeProcedureOptions { name: id.clone() };
        executor::validate_and_query_plain(self.client, Some(&opts)).await
    }

    /// Call the procedure and return whatever rows it produces.
    pub async fn call(&self, opts: &CallProcedureOptions) -> Result<Vec<Row>> {
        let sql = executor::render(Some(opts))?;
        self.client.query(&sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::to_sql;
    use crate::error::SdkError;
    use crate::objects::testing::{client, row};
    use crate::validation::ValidationError;
    use serde_json::json;

    fn id() -> SchemaObjectIdentifierWithArguments {
        SchemaObjectIdentifierWithArguments::new("db", "sch", "p", ["NUMBER", "VARCHAR"])
    }

    #[test]
    fn test_drop_and_call() {
        assert_eq!(
            to_sql(&DropProcedureOptions::new(id())).unwrap(),
            "DROP PROCEDURE \"db\".\"sch\".\"p\" (NUMBER, VARCHAR)"
        );

        let call = CallProcedureOptions::new(SchemaObjectIdentifier::new("db", "sch", "p"), ["1", "'x'"]);
        assert_eq!(to_sql(&call).unwrap(), "CALL \"db\".\"sch\".\"p\" (1, 'x')");

        let bare = CallProcedureOptions::new(
            SchemaObjectIdentifier::new("db", "sch", "p"),
            Vec::<String>::new(),
        );
        assert_eq!(to_sql(&bare).unwrap(), "CALL \"db\".\"sch\".\"p\" ()");
    }

    #[test]
    fn test_call_requires_name() {
        let call = CallProcedureOptions::default();
        assert_eq!(
            call.validate().unwrap_err().as_slice(),
            &[ValidationError::InvalidObjectIdentifier]
        );
    }

    #[tokio::test]
    async fn test_call_returns_rows() {
        let (executor, client) = client();
        executor.push_rows(vec![row(json!({"P": "done"}))]);

        let call = CallProcedureOptions::new(SchemaObjectIdentifier::new("db", "sch", "p"), ["1", "'x'"]);
        let rows = client.procedures().call(&call).await.unwrap();
        assert_eq!(rows[0]["P"], json!("done"));
        assert_eq!(
            executor.last_statement().unwrap(),
            "CALL \"db\".\"sch\".\"p\" (1, 'x')"
        );
    }

    #[tokio::test]
    async fn test_show_by_id_and_describe() {
        let (executor, client) = client();
        executor.push_rows(vec![row(json!({
            "created_on": "2024-01-01 00:00:00.000 -0800",
            "name": "p",
            "schema_name": "sch",
            "catalog_name": "db",
            "is_builtin": "N",
            "min_num_arguments": "2",
            "max_num_arguments": "2",
            "arguments": "P(NUMBER, VARCHAR) RETURN VARCHAR",
            "description": null,
            "is_table_function": "N",
            "is_secure": "N"
        }))]);
        executor.push_rows(vec![row(json!({"property": "language", "value": "SQL"}))]);

        let procedure = client.procedures().show_by_id(&id()).await.unwrap();
        assert_eq!(procedure.id(), id());
        assert_eq!(procedure.description, "");

        let details = client.procedures().describe(&id()).await.unwrap();
        assert_eq!(details[0].property, "language");
        assert_eq!(
            executor.statements(),
            vec![
                "SHOW PROCEDURES LIKE 'p' IN SCHEMA \"db\".\"sch\"",
                "DESCRIBE PROCEDURE \"db\".\"sch\".\"p\" (NUMBER, VARCHAR)"
            ]
        );
    }

    #[tokio::test]
    async fn test_show_without_rows_is_not_found() {
        let (_executor, client) = client();
        let err = client.procedures().show_by_id(&id()).await.unwrap_err();
        assert!(matches!(err, SdkError::ObjectNotExistOrAuthorized));
    }
}
