//! User-defined functions.
//!
//! Functions are overloaded by argument types, so statements that name a
//! single function carry a [`SchemaObjectIdentifierWithArguments`].

use serde::Deserialize;

use super::common::{parse_argument_types, validate_filters, In, Like};
use crate::client::Client;
use crate::core::identifier::{ObjectIdentifier, SchemaObjectIdentifierWithArguments};
use crate::core::traits::Options;
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::Result;
use crate::executor;
use crate::mapper::{deserialize_lenient_int, deserialize_optional_flag, ConvertibleRow};
use crate::validation::{Rules, ValidationErrors};

/// `"db"."sch"."name" (T1, T2)` as DROP and DESCRIBE spell it.
pub(crate) fn signature_fields(id: &SchemaObjectIdentifierWithArguments) -> [Field<'_>; 2] {
    [
        Field::ident("", Some(id.without_arguments()), Modifiers::EQUALS),
        Field::values(
            "",
            Some(id.arguments()),
            Separator::Comma,
            Modifiers::NO_EQUALS.parentheses(),
        ),
    ]
}

/// `DROP FUNCTION [IF EXISTS] <name> (<argument types>)`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DropFunctionOptions {
    pub if_exists: Option<bool>,
    pub name: SchemaObjectIdentifierWithArguments,
}

impl DropFunctionOptions {
    pub fn new(name: SchemaObjectIdentifierWithArguments) -> Self {
        Self {
            if_exists: None,
            name,
        }
    }
}

impl Structure for DropFunctionOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::Static("DROP FUNCTION"),
            Field::flag("IF EXISTS", self.if_exists),
        ];
        fields.extend(signature_fields(&self.name));
        fields
    }
}

impl Options for DropFunctionOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DropFunctionOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
struct DescribeFunctionOptions {
    name: SchemaObjectIdentifierWithArguments,
}

impl Structure for DescribeFunctionOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![Field::Static("DESCRIBE FUNCTION")];
        fields.extend(signature_fields(&self.name));
        fields
    }
}

impl Options for DescribeFunctionOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Rules::new("DescribeFunctionOptions")
            .valid_identifier(&self.name)
            .finish()
    }
}

/// `SHOW USER FUNCTIONS [LIKE ...] [IN ...]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowFunctionOptions {
    pub like: Option<Like>,
    pub r#in: Option<In>,
}

impl Structure for ShowFunctionOptions {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Static("SHOW USER FUNCTIONS"),
            Field::record("", self.like.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
            Field::record("IN", self.r#in.as_ref(), Separator::Space, Modifiers::NO_EQUALS),
        ]
    }
}

impl Options for ShowFunctionOptions {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut rules = Rules::new("ShowFunctionOptions");
        validate_filters(&mut rules, self.like.as_ref(), self.r#in.as_ref());
        rules.finish()
    }
}

#[derive(Debug, Deserialize)]
struct FunctionRow {
    created_on: String,
    name: String,
    schema_name: String,
    catalog_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    is_builtin: bool,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    is_aggregate: bool,
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
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    is_external_function: bool,
    language: String,
}

/// A user function as reported by `SHOW USER FUNCTIONS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub created_on: String,
    pub name: String,
    pub schema_name: String,
    pub catalog_name: String,
    pub is_builtin: bool,
    pub is_aggregate: bool,
    pub min_num_arguments: i64,
    pub max_num_arguments: i64,
    /// Raw signature, e.g. `ADD(NUMBER, NUMBER) RETURN NUMBER`.
    pub arguments: String,
    pub argument_types: Vec<String>,
    pub description: String,
    pub is_table_function: bool,
    pub is_secure: bool,
    pub is_external_function: bool,
    pub language: String,
}

impl Function {
    pub fn id(&self) -> SchemaObjectIdentifierWithArguments {
        SchemaObjectIdentifierWithArguments::new(
            &self.catalog_name,
            &self.schema_name,
            &self.name,
            self.argument_types.iter().cloned(),
        )
    }
}

impl ConvertibleRow for FunctionRow {
    type Plain = Function;

    fn convert(&self) -> Result<Function> {
        Ok(Function {
            created_on: self.created_on.clone(),
            name: self.name.clone(),
            schema_name: self.schema_name.clone(),
            catalog_name: self.catalog_name.clone(),
            is_builtin: self.is_builtin,
            is_aggregate: self.is_aggregate,
            min_num_arguments: self.min_num_arguments.unwrap_or_default(),
            max_num_arguments: self.max_num_arguments.unwrap_or_default(),
            arguments: self.arguments.clone(),
            argument_types: parse_argument_types(&self.arguments),
            description: self.description.clone().unwrap_or_default(),
            is_table_function: self.is_table_function,
            is_secure: self.is_secure,
            is_external_function: self.is_external_function,
            language: self.language.clone(),
        })
    }
}

/// One `property`/`value` row of `DESCRIBE FUNCTION`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionDetail {
    pub property: String,
    pub value: Option<String>,
}

/// Whether `types` names the same argument list as `id`, ignoring case.
pub(crate) fn same_arguments(id: &SchemaObjectIdentifierWithArguments, types: &[String]) -> bool {
    id.arguments().len() == types.len()
        && id
            .arguments()
            .iter()
            .zip(types)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

// =============================================================================
// Accessor
// =============================================================================

/// Function operations, obtained from [`Client::functions`].
pub struct Functions<'a> {
    client: &'a Client,
}

impl<'a> Functions<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn drop(&self, opts: &DropFunctionOptions) -> Result<()> {
        executor::validate_and_exec(self.client, Some(opts)).await?;
        Ok(())
    }

    pub async fn show(&self, opts: Option<&ShowFunctionOptions>) -> Result<Vec<Function>> {
        let default = ShowFunctionOptions::default();
        let opts = opts.unwrap_or(&default);
        executor::validate_and_query::<_, FunctionRow>(self.client, Some(opts)).await
    }

    /// Find the overload whose argument types match `id`.
    pub async fn show_by_id(&self, id: &SchemaObjectIdentifierWithArguments) -> Result<Function> {
        let opts = ShowFunctionOptions {
            like: Some(Like::new(id.name())),
            r#in: Some(In::schema(id.schema_id())),
        };
        let functions = self.show(Some(&opts)).await?;
        executor::show_by_id(functions, |f| {
            f.name == id.name() && same_arguments(id, &f.argument_types)
        })
    }

    pub async fn describe(&self, id: &SchemaObjectIdentifierWithArguments) -> Result<Vec<FunctionDetail>> {
        let opts = DescribeFunctionOptions { name: id.clone() };
        executor::validate_and_query_plain(self.client, Some(&opts)).await
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
        SchemaObjectIdentifierWithArguments::new("db", "sch", "add", ["NUMBER", "VARCHAR"])
    }

    #[test]
    fn test_drop_spells_argument_types() {
        let opts = DropFunctionOptions {
            if_exists: Some(true),
            ..DropFunctionOptions::new(id())
        };
        assert_eq!(
            to_sql(&opts).unwrap(),
            "DROP FUNCTION IF EXISTS \"db\".\"sch\".\"add\" (NUMBER, VARCHAR)"
        );

        let no_args = DropFunctionOptions::new(SchemaObjectIdentifierWithArguments::new(
            "db",
            "sch",
            "now",
            Vec::<String>::new(),
        ));
        assert_eq!(
            to_sql(&no_args).unwrap(),
            "DROP FUNCTION \"db\".\"sch\".\"now\" ()"
        );
    }

    #[test]
    fn test_drop_rejects_empty_identifier() {
        let opts = DropFunctionOptions::default();
        assert_eq!(
            opts.validate().unwrap_err().as_slice(),
            &[ValidationError::InvalidObjectIdentifier]
        );
    }

    fn function_row(arguments: &str) -> crate::core::traits::Row {
        row(json!({
            "created_on": "2024-01-01 00:00:00.000 -0800",
            "name": "add",
            "schema_name": "sch",
            "catalog_name": "db",
            "is_builtin": "N",
            "is_aggregate": "N",
            "min_num_arguments": 2,
            "max_num_arguments": "2",
            "arguments": arguments,
            "description": "user-defined function",
            "is_table_function": "N",
            "is_secure": "Y",
            "is_external_function": "N",
            "language": "SQL"
        }))
    }

    #[tokio::test]
    async fn test_show_by_id_picks_matching_overload() {
        let (executor, client) = client();
        executor.push_rows(vec![
            function_row("ADD(NUMBER, NUMBER) RETURN NUMBER"),
            function_row("ADD(NUMBER, VARCHAR) RETURN VARCHAR"),
        ]);

        let function = client.functions().show_by_id(&id()).await.unwrap();
        assert_eq!(function.argument_types, vec!["NUMBER", "VARCHAR"]);
        assert_eq!(function.id(), id());
        assert!(function.is_secure);
        assert_eq!(function.max_num_arguments, 2);
        assert_eq!(
            executor.last_statement().unwrap(),
            "SHOW USER FUNCTIONS LIKE 'add' IN SCHEMA \"db\".\"sch\""
        );
    }

    #[tokio::test]
    async fn test_show_by_id_without_matching_overload() {
        let (executor, client) = client();
        executor.push_rows(vec![function_row("ADD(NUMBER) RETURN NUMBER")]);
        let err = client.functions().show_by_id(&id()).await.unwrap_err();
        assert!(matches!(err, SdkError::ObjectNotExistOrAuthorized));
    }

    #[tokio::test]
    async fn test_describe() {
        let (executor, client) = client();
        executor.push_rows(vec![
            row(json!({"property": "signature", "value": "(A NUMBER, B VARCHAR)"})),
            row(json!({"property": "body", "value": null})),
        ]);

        let details = client.functions().describe(&id()).await.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].value.as_deref(), Some("(A NUMBER, B VARCHAR)"));
        assert_eq!(
            executor.last_statement().unwrap(),
            "DESCRIBE FUNCTION \"db\".\"sch\".\"add\" (NUMBER, VARCHAR)"
        );
    }
}
