//! Object identifiers and their quoting discipline.
//!
//! Every name that reaches emitted SQL goes through one of the identifier
//! types in this module. Parts are stored unquoted; the fully qualified form
//! wraps each non-empty part in double quotes and joins them with dots:
//!
//! ```text
//! SchemaObjectIdentifier::new("db", "sch", "t1")
//!     name()                  -> t1
//!     literal()               -> db.sch.t1
//!     fully_qualified_name()  -> "db"."sch"."t1"
//! ```
//!
//! Surrounding double quotes are trimmed from every part on construction, so
//! feeding a fully qualified name back through a constructor or [`FromStr`]
//! yields the same identifier.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Failure to parse a fully qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The input was empty or whitespace.
    #[error("identifier is empty")]
    Empty,

    /// The number of dot-separated parts does not match the identifier kind.
    #[error("{kind} expects {expected} parts, got {got} in {input:?}")]
    PartCount {
        kind: &'static str,
        expected: usize,
        got: usize,
        input: String,
    },

    /// A double-quoted part was never closed.
    #[error("unterminated quote in {0:?}")]
    UnterminatedQuote(String),

    /// The argument list of a function identifier is malformed.
    #[error("malformed argument list in {0:?}")]
    InvalidArguments(String),
}

/// Common behavior of every identifier kind.
pub trait ObjectIdentifier: fmt::Debug + Send + Sync {
    /// The terminal component, unquoted.
    fn name(&self) -> &str;

    /// All components in order, unquoted.
    fn parts(&self) -> Vec<&str>;

    /// Dot-joined, unquoted form used for logging and row decoding.
    fn literal(&self) -> String {
        self.parts()
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Dot-joined form with every non-empty part in double quotes.
    ///
    /// Empty iff every part is empty.
    fn fully_qualified_name(&self) -> String {
        quote_parts(&self.parts())
    }

    /// An identifier is valid unless every part is empty.
    fn is_valid(&self) -> bool {
        self.parts().iter().any(|p| !p.is_empty())
    }
}

fn quote_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(".")
}

/// Strip surrounding double quotes from a part.
fn trim_quotes(part: impl Into<String>) -> String {
    let part = part.into();
    part.trim_matches('"').to_string()
}

/// Split a fully qualified name on dots outside double quotes.
///
/// Returns the unquoted parts.
fn split_parts(input: &str) -> Result<Vec<String>, IdentifierError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '.' if !in_quotes => {
                parts.push(trim_quotes(std::mem::take(&mut current)));
            }
            _ => current.push(c),
        }
    }
    if in_quotes {
        return Err(IdentifierError::UnterminatedQuote(input.to_string()));
    }
    parts.push(trim_quotes(current));
    Ok(parts)
}

fn expect_parts(
    kind: &'static str,
    input: &str,
    expected: usize,
) -> Result<Vec<String>, IdentifierError> {
    let parts = split_parts(input)?;
    if parts.len() != expected {
        return Err(IdentifierError::PartCount {
            kind,
            expected,
            got: parts.len(),
            input: input.to_string(),
        });
    }
    Ok(parts)
}

macro_rules! identifier_common_impls {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.fully_qualified_name())
                }
            }

            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(&self.fully_qualified_name())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let raw = String::deserialize(deserializer)?;
                    raw.parse().map_err(de::Error::custom)
                }
            }
        )+
    };
}

/// Account-scoped object: warehouse, database, role, network policy, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountObjectIdentifier {
    name: String,
}

impl AccountObjectIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: trim_quotes(name),
        }
    }
}

impl ObjectIdentifier for AccountObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn parts(&self) -> Vec<&str> {
        vec![&self.name]
    }
}

impl FromStr for AccountObjectIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = expect_parts("account object identifier", s, 1)?;
        Ok(Self::new(parts[0].clone()))
    }
}

/// Database-qualified object, typically a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatabaseObjectIdentifier {
    database: String,
    name: String,
}

impl DatabaseObjectIdentifier {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: trim_quotes(database),
            name: trim_quotes(name),
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// The owning database.
    pub fn database_id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(self.database.clone())
    }
}

impl ObjectIdentifier for DatabaseObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn parts(&self) -> Vec<&str> {
        vec![&self.database, &self.name]
    }
}

impl FromStr for DatabaseObjectIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = expect_parts("database object identifier", s, 2)?;
        Ok(Self::new(parts[0].clone(), parts[1].clone()))
    }
}

/// Schema-qualified object: table, view, stream, task, pipe, alert, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaObjectIdentifier {
    database: String,
    schema: String,
    name: String,
}

impl SchemaObjectIdentifier {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database: trim_quotes(database),
            schema: trim_quotes(schema),
            name: trim_quotes(name),
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    /// The owning schema.
    pub fn schema_id(&self) -> DatabaseObjectIdentifier {
        DatabaseObjectIdentifier::new(self.database.clone(), self.schema.clone())
    }

    /// Attach argument data types, e.g. for functions and procedures.
    pub fn with_arguments<I, S>(&self, arguments: I) -> SchemaObjectIdentifierWithArguments
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaObjectIdentifierWithArguments {
            id: self.clone(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl ObjectIdentifier for SchemaObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn parts(&self) -> Vec<&str> {
        vec![&self.database, &self.schema, &self.name]
    }
}

impl FromStr for SchemaObjectIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = expect_parts("schema object identifier", s, 3)?;
        Ok(Self::new(
            parts[0].clone(),
            parts[1].clone(),
            parts[2].clone(),
        ))
    }
}

/// Schema object identified together with its argument data types.
///
/// Overloaded functions and procedures share a name, so the argument list is
/// part of the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaObjectIdentifierWithArguments {
    id: SchemaObjectIdentifier,
    arguments: Vec<String>,
}

impl SchemaObjectIdentifierWithArguments {
    pub fn new<I, S>(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        arguments: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaObjectIdentifier::new(database, schema, name).with_arguments(arguments)
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The identifier without its argument list.
    pub fn without_arguments(&self) -> &SchemaObjectIdentifier {
        &self.id
    }

    pub fn schema_id(&self) -> DatabaseObjectIdentifier {
        self.id.schema_id()
    }
}

impl ObjectIdentifier for SchemaObjectIdentifierWithArguments {
    fn name(&self) -> &str {
        self.id.name()
    }

    fn parts(&self) -> Vec<&str> {
        self.id.parts()
    }

    fn fully_qualified_name(&self) -> String {
        let base = self.id.fully_qualified_name();
        if base.is_empty() {
            return base;
        }
        format!("{}({})", base, self.arguments.join(", "))
    }
}

impl FromStr for SchemaObjectIdentifierWithArguments {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let open = find_unquoted(s, '(')
            .ok_or_else(|| IdentifierError::InvalidArguments(s.to_string()))?;
        if !s.ends_with(')') {
            return Err(IdentifierError::InvalidArguments(s.to_string()));
        }
        let id: SchemaObjectIdentifier = s[..open].parse()?;
        let inner = s[open + 1..s.len() - 1].trim();
        let arguments = if inner.is_empty() {
            Vec::new()
        } else {
            split_arguments(inner)
        };
        if arguments.iter().any(|a| a.is_empty()) {
            return Err(IdentifierError::InvalidArguments(s.to_string()));
        }
        Ok(Self { id, arguments })
    }
}

/// Split an argument list on commas outside parentheses and quotes, so
/// `NUMBER(38, 0), VARCHAR` yields two arguments.
fn split_arguments(inner: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    for c in inner.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                arguments.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    arguments.push(current.trim().to_string());
    arguments
}

fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == target && !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Column of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableColumnIdentifier {
    database: String,
    schema: String,
    table: String,
    column: String,
}

impl TableColumnIdentifier {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            database: trim_quotes(database),
            schema: trim_quotes(schema),
            table: trim_quotes(table),
            column: trim_quotes(column),
        }
    }

    /// The owning table.
    pub fn table_id(&self) -> SchemaObjectIdentifier {
        SchemaObjectIdentifier::new(
            self.database.clone(),
            self.schema.clone(),
            self.table.clone(),
        )
    }
}

impl ObjectIdentifier for TableColumnIdentifier {
    fn name(&self) -> &str {
        &self.column
    }

    fn parts(&self) -> Vec<&str> {
        vec![&self.database, &self.schema, &self.table, &self.column]
    }
}

impl FromStr for TableColumnIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = expect_parts("table column identifier", s, 4)?;
        Ok(Self::new(
            parts[0].clone(),
            parts[1].clone(),
            parts[2].clone(),
            parts[3].clone(),
        ))
    }
}

/// Organization-qualified account name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountIdentifier {
    organization: String,
    account: String,
}

impl AccountIdentifier {
    pub fn new(organization: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            organization: trim_quotes(organization),
            account: trim_quotes(account),
        }
    }

    pub fn organization_name(&self) -> &str {
        &self.organization
    }
}

impl ObjectIdentifier for AccountIdentifier {
    fn name(&self) -> &str {
        &self.account
    }

    fn parts(&self) -> Vec<&str> {
        vec![&self.organization, &self.account]
    }
}

impl FromStr for AccountIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = expect_parts("account identifier", s, 2)?;
        Ok(Self::new(parts[0].clone(), parts[1].clone()))
    }
}

/// Legacy account locator, e.g. `xy12345`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountLocator {
    locator: String,
}

impl AccountLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: trim_quotes(locator),
        }
    }
}

impl ObjectIdentifier for AccountLocator {
    fn name(&self) -> &str {
        &self.locator
    }

    fn parts(&self) -> Vec<&str> {
        vec![&self.locator]
    }
}

impl FromStr for AccountLocator {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = expect_parts("account locator", s, 1)?;
        Ok(Self::new(parts[0].clone()))
    }
}

/// Object living in another account, e.g. a shared database.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExternalObjectIdentifier {
    account: AccountIdentifier,
    object: Box<Identifier>,
}

impl ExternalObjectIdentifier {
    pub fn new(account: AccountIdentifier, object: impl Into<Identifier>) -> Self {
        Self {
            account,
            object: Box::new(object.into()),
        }
    }

    pub fn account_identifier(&self) -> &AccountIdentifier {
        &self.account
    }

    pub fn object_identifier(&self) -> &Identifier {
        &self.object
    }
}

impl ObjectIdentifier for ExternalObjectIdentifier {
    fn name(&self) -> &str {
        self.object.name()
    }

    fn parts(&self) -> Vec<&str> {
        let mut parts = self.account.parts();
        parts.extend(self.object.parts());
        parts
    }

    fn fully_qualified_name(&self) -> String {
        let account = self.account.fully_qualified_name();
        let object = self.object.fully_qualified_name();
        match (account.is_empty(), object.is_empty()) {
            (true, _) => object,
            (_, true) => account,
            _ => format!("{}.{}", account, object),
        }
    }
}

impl FromStr for ExternalObjectIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // An argument list may hold dots of its own; split the path only.
        let (path, arguments) = match find_unquoted(s, '(') {
            Some(open) => (&s[..open], Some(&s[open..])),
            None => (s, None),
        };
        let parts = split_parts(path)?;
        if parts.len() < 3 {
            return Err(IdentifierError::PartCount {
                kind: "external object identifier",
                expected: 3,
                got: parts.len(),
                input: s.to_string(),
            });
        }
        let account = AccountIdentifier::new(parts[0].clone(), parts[1].clone());
        let object = match arguments {
            Some(arguments) => {
                let path: Vec<&str> = parts[2..].iter().map(String::as_str).collect();
                let id: SchemaObjectIdentifierWithArguments =
                    format!("{}{}", quote_parts(&path), arguments).parse()?;
                Identifier::SchemaObjectWithArguments(id)
            }
            None => Identifier::from_parts(s, &parts[2..])?,
        };
        Ok(Self::new(account, object))
    }
}

/// Any identifier kind.
///
/// Used where a field accepts objects of several kinds, such as tag
/// associations. Trait calls dispatch with a `match` over the variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    AccountObject(AccountObjectIdentifier),
    DatabaseObject(DatabaseObjectIdentifier),
    SchemaObject(SchemaObjectIdentifier),
    SchemaObjectWithArguments(SchemaObjectIdentifierWithArguments),
    TableColumn(TableColumnIdentifier),
    External(ExternalObjectIdentifier),
    Account(AccountIdentifier),
    Locator(AccountLocator),
}

impl Identifier {
    fn inner(&self) -> &dyn ObjectIdentifier {
        match self {
            Identifier::AccountObject(id) => id,
            Identifier::DatabaseObject(id) => id,
            Identifier::SchemaObject(id) => id,
            Identifier::SchemaObjectWithArguments(id) => id,
            Identifier::TableColumn(id) => id,
            Identifier::External(id) => id,
            Identifier::Account(id) => id,
            Identifier::Locator(id) => id,
        }
    }

    /// Pick the variant from the number of unquoted parts.
    fn from_parts(input: &str, parts: &[String]) -> Result<Self, IdentifierError> {
        match parts {
            [name] => Ok(AccountObjectIdentifier::new(name.clone()).into()),
            [db, name] => Ok(DatabaseObjectIdentifier::new(db.clone(), name.clone()).into()),
            [db, schema, name] => {
                Ok(SchemaObjectIdentifier::new(db.clone(), schema.clone(), name.clone()).into())
            }
            [db, schema, table, column] => Ok(TableColumnIdentifier::new(
                db.clone(),
                schema.clone(),
                table.clone(),
                column.clone(),
            )
            .into()),
            _ => Err(IdentifierError::PartCount {
                kind: "identifier",
                expected: 4,
                got: parts.len(),
                input: input.to_string(),
            }),
        }
    }
}

impl ObjectIdentifier for Identifier {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn parts(&self) -> Vec<&str> {
        self.inner().parts()
    }

    fn fully_qualified_name(&self) -> String {
        self.inner().fully_qualified_name()
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if find_unquoted(s, '(').is_some() {
            return Ok(Identifier::SchemaObjectWithArguments(s.parse()?));
        }
        let parts = split_parts(s)?;
        Self::from_parts(s, &parts)
    }
}

macro_rules! identifier_from {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Identifier {
                fn from(id: $ty) -> Self {
                    Identifier::$variant(id)
                }
            }
        )+
    };
}

identifier_from! {
    AccountObject => AccountObjectIdentifier,
    DatabaseObject => DatabaseObjectIdentifier,
    SchemaObject => SchemaObjectIdentifier,
    SchemaObjectWithArguments => SchemaObjectIdentifierWithArguments,
    TableColumn => TableColumnIdentifier,
    External => ExternalObjectIdentifier,
    Account => AccountIdentifier,
    Locator => AccountLocator,
}

identifier_common_impls!(
    AccountObjectIdentifier,
    DatabaseObjectIdentifier,
    SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments,
    TableColumnIdentifier,
    AccountIdentifier,
    AccountLocator,
    ExternalObjectIdentifier,
    Identifier,
);

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn test_account_object_rendering() {
        let id = AccountObjectIdentifier::new("wh1");
        assert_eq!(id.name(), "wh1");
        assert_eq!(id.literal(), "wh1");
        assert_eq!(id.fully_qualified_name(), "\"wh1\"");
    }

    #[test]
    fn test_schema_object_rendering() {
        let id = SchemaObjectIdentifier::new("db", "sch", "a1");
        assert_eq!(id.name(), "a1");
        assert_eq!(id.literal(), "db.sch.a1");
        assert_eq!(id.fully_qualified_name(), "\"db\".\"sch\".\"a1\"");
        assert_eq!(id.schema_id().fully_qualified_name(), "\"db\".\"sch\"");
        assert_eq!(id.schema_id().database_id().name(), "db");
    }

    #[test]
    fn test_table_column_rendering() {
        let id = TableColumnIdentifier::new("db", "sch", "t", "c");
        assert_eq!(id.fully_qualified_name(), "\"db\".\"sch\".\"t\".\"c\"");
        assert_eq!(id.table_id().name(), "t");
    }

    #[test]
    fn test_with_arguments_rendering() {
        let id = SchemaObjectIdentifierWithArguments::new("db", "sch", "fn", ["NUMBER", "VARCHAR"]);
        assert_eq!(id.name(), "fn");
        assert_eq!(
            id.fully_qualified_name(),
            "\"db\".\"sch\".\"fn\"(NUMBER, VARCHAR)"
        );
        let no_args = SchemaObjectIdentifierWithArguments::new("db", "sch", "fn", Vec::<String>::new());
        assert_eq!(no_args.fully_qualified_name(), "\"db\".\"sch\".\"fn\"()");
    }

    #[test]
    fn test_external_rendering() {
        let id = ExternalObjectIdentifier::new(
            AccountIdentifier::new("org", "acc"),
            AccountObjectIdentifier::new("shared_db"),
        );
        assert_eq!(id.name(), "shared_db");
        assert_eq!(id.fully_qualified_name(), "\"org\".\"acc\".\"shared_db\"");
    }

    #[test]
    fn test_empty_identifier_is_invalid() {
        let id = SchemaObjectIdentifier::new("", "", "");
        assert!(!id.is_valid());
        assert_eq!(id.fully_qualified_name(), "");
        assert!(!AccountObjectIdentifier::default().is_valid());
        assert!(SchemaObjectIdentifier::new("", "", "x").is_valid());
    }

    #[test]
    fn test_construction_trims_quotes() {
        let id = SchemaObjectIdentifier::new("\"db\"", "\"sch\"", "\"a1\"");
        assert_eq!(id, SchemaObjectIdentifier::new("db", "sch", "a1"));
        // trimming twice changes nothing
        let again = SchemaObjectIdentifier::new(
            id.database_name().to_string(),
            id.schema_name().to_string(),
            id.name().to_string(),
        );
        assert_eq!(again, id);
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_parse_round_trip_every_kind() {
        let account = AccountObjectIdentifier::new("wh");
        assert_eq!(account.fully_qualified_name().parse::<AccountObjectIdentifier>().unwrap(), account);

        let database = DatabaseObjectIdentifier::new("db", "sch");
        assert_eq!(database.fully_qualified_name().parse::<DatabaseObjectIdentifier>().unwrap(), database);

        let schema = SchemaObjectIdentifier::new("db", "sch", "t");
        assert_eq!(schema.fully_qualified_name().parse::<SchemaObjectIdentifier>().unwrap(), schema);

        let column = TableColumnIdentifier::new("db", "sch", "t", "c");
        assert_eq!(column.fully_qualified_name().parse::<TableColumnIdentifier>().unwrap(), column);

        let with_args = SchemaObjectIdentifierWithArguments::new("db", "sch", "f", ["NUMBER", "VARCHAR"]);
        assert_eq!(
            with_args.fully_qualified_name().parse::<SchemaObjectIdentifierWithArguments>().unwrap(),
            with_args
        );

        let with_precision =
            SchemaObjectIdentifierWithArguments::new("db", "sch", "f", ["NUMBER(38, 0)", "VARCHAR"]);
        assert_eq!(
            with_precision.fully_qualified_name().parse::<SchemaObjectIdentifierWithArguments>().unwrap(),
            with_precision
        );

        let external = ExternalObjectIdentifier::new(
            AccountIdentifier::new("org", "acc"),
            DatabaseObjectIdentifier::new("db", "sch"),
        );
        assert_eq!(external.fully_qualified_name().parse::<ExternalObjectIdentifier>().unwrap(), external);
    }

    #[test]
    fn test_external_keeps_arguments() {
        let external = ExternalObjectIdentifier::new(
            AccountIdentifier::new("org", "acc"),
            SchemaObjectIdentifierWithArguments::new("db", "sch", "f", ["NUMBER(38, 0)", "VARCHAR"]),
        );
        let fqn = external.fully_qualified_name();
        assert_eq!(fqn, "\"org\".\"acc\".\"db\".\"sch\".\"f\"(NUMBER(38, 0), VARCHAR)");

        let parsed: ExternalObjectIdentifier = fqn.parse().unwrap();
        assert_eq!(parsed, external);
        assert!(matches!(
            parsed.object_identifier(),
            Identifier::SchemaObjectWithArguments(_)
        ));

        let err = "org.acc.db.f(NUMBER)".parse::<ExternalObjectIdentifier>().unwrap_err();
        assert!(matches!(err, IdentifierError::PartCount { expected: 3, .. }));
    }

    #[test]
    fn test_parse_arguments_with_precision() {
        let id: SchemaObjectIdentifierWithArguments =
            "db.sch.f(NUMBER(38, 0), VARCHAR(16))".parse().unwrap();
        assert_eq!(id.arguments(), ["NUMBER(38, 0)", "VARCHAR(16)"]);
    }

    #[test]
    fn test_parse_unquoted_input() {
        let id: SchemaObjectIdentifier = "db.sch.t".parse().unwrap();
        assert_eq!(id, SchemaObjectIdentifier::new("db", "sch", "t"));
    }

    #[test]
    fn test_parse_keeps_dots_inside_quotes() {
        let id: DatabaseObjectIdentifier = "\"my.db\".\"sch\"".parse().unwrap();
        assert_eq!(id.database_name(), "my.db");
        assert_eq!(id.name(), "sch");
    }

    #[test]
    fn test_parse_wrong_arity_is_structured_error() {
        let err = "\"a\".\"b\"".parse::<SchemaObjectIdentifier>().unwrap_err();
        assert!(matches!(
            err,
            IdentifierError::PartCount { expected: 3, got: 2, .. }
        ));
    }

    #[test]
    fn test_parse_empty_and_unterminated() {
        assert_eq!("".parse::<AccountObjectIdentifier>().unwrap_err(), IdentifierError::Empty);
        assert!(matches!(
            "\"db.sch".parse::<DatabaseObjectIdentifier>().unwrap_err(),
            IdentifierError::UnterminatedQuote(_)
        ));
    }

    #[test]
    fn test_parse_arguments_malformed() {
        assert!("\"db\".\"sch\".\"f\"(NUMBER".parse::<SchemaObjectIdentifierWithArguments>().is_err());
        assert!("\"db\".\"sch\".\"f\"(NUMBER, )".parse::<SchemaObjectIdentifierWithArguments>().is_err());
        let empty: SchemaObjectIdentifierWithArguments = "\"db\".\"sch\".\"f\"()".parse().unwrap();
        assert!(empty.arguments().is_empty());
    }

    #[test]
    fn test_identifier_enum_picks_variant_by_parts() {
        assert!(matches!("\"a\"".parse::<Identifier>().unwrap(), Identifier::AccountObject(_)));
        assert!(matches!("\"a\".\"b\"".parse::<Identifier>().unwrap(), Identifier::DatabaseObject(_)));
        assert!(matches!("a.b.c".parse::<Identifier>().unwrap(), Identifier::SchemaObject(_)));
        assert!(matches!("a.b.c.d".parse::<Identifier>().unwrap(), Identifier::TableColumn(_)));
        assert!(matches!(
            "a.b.c(NUMBER)".parse::<Identifier>().unwrap(),
            Identifier::SchemaObjectWithArguments(_)
        ));
        assert!("a.b.c.d.e".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_serde_uses_fully_qualified_name() {
        let id = SchemaObjectIdentifier::new("db", "sch", "t");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""\"db\".\"sch\".\"t\"""#);
        let back: SchemaObjectIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let from_yaml: AccountObjectIdentifier = serde_yaml::from_str("wh1").unwrap();
        assert_eq!(from_yaml, AccountObjectIdentifier::new("wh1"));
    }
}
