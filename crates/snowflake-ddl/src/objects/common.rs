//! Records shared by several object kinds.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::core::identifier::{
    AccountObjectIdentifier, DatabaseObjectIdentifier, Identifier, ObjectIdentifier,
};
use crate::core::value::{sql_enum, SqlValue, ToSqlValue};
use crate::ddl::{Field, Modifiers, Separator, Structure};
use crate::error::SdkError;
use crate::validation::{field, Rules, ValidationError, ValidationErrors};

sql_enum! {
    pub enum LogLevel ("log level") {
        Trace = "TRACE",
        Debug = "DEBUG",
        Info = "INFO",
        Warn = "WARN",
        Error = "ERROR",
        Fatal = "FATAL",
        Off = "OFF",
    }
}

sql_enum! {
    pub enum TraceLevel ("trace level") {
        Always = "ALWAYS",
        OnEvent = "ON_EVENT",
        Off = "OFF",
    }
}

// =============================================================================
// Filters
// =============================================================================

/// `LIKE '<pattern>'` filter of SHOW commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Like {
    pub pattern: String,
}

impl Like {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new("Like")
            .check(
                self.pattern.is_empty(),
                ValidationError::PatternRequiredForLikeKeyword,
            )
            .finish()
    }
}

impl Structure for Like {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::param(
            "LIKE",
            Some(&self.pattern),
            Modifiers::NO_EQUALS.single_quotes(),
        )]
    }
}

/// `IN ACCOUNT | DATABASE <db> | SCHEMA <db>.<schema>` scope of SHOW commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct In {
    pub account: Option<bool>,
    pub database: Option<AccountObjectIdentifier>,
    pub schema: Option<DatabaseObjectIdentifier>,
}

impl In {
    pub fn account() -> Self {
        Self {
            account: Some(true),
            ..Default::default()
        }
    }

    pub fn database(id: AccountObjectIdentifier) -> Self {
        Self {
            database: Some(id),
            ..Default::default()
        }
    }

    pub fn schema(id: DatabaseObjectIdentifier) -> Self {
        Self {
            schema: Some(id),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let any_set =
            self.account == Some(true) || self.database.is_some() || self.schema.is_some();
        let mut rules = Rules::new("In");
        rules.check(!any_set, ValidationError::ScopeRequiredForInKeyword);
        if any_set {
            rules.one_of(&[
                field("Account", &self.account),
                field("Database", &self.database),
                field("Schema", &self.schema),
            ]);
        }
        rules
            .valid_identifier_if_set(self.database.as_ref())
            .valid_identifier_if_set(self.schema.as_ref())
            .finish()
    }
}

impl Structure for In {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::flag("ACCOUNT", self.account),
            Field::ident("DATABASE", self.database.as_ref(), Modifiers::NO_EQUALS),
            Field::ident("SCHEMA", self.schema.as_ref(), Modifiers::NO_EQUALS),
        ]
    }
}

/// `LIMIT <rows> FROM '<name>'`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LimitFrom {
    pub rows: i32,
    pub from: Option<String>,
}

impl LimitFrom {
    pub fn new(rows: i32) -> Self {
        Self { rows, from: None }
    }
}

impl Structure for LimitFrom {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param("LIMIT", Some(&self.rows), Modifiers::NO_EQUALS),
            Field::param(
                "FROM",
                self.from.as_ref(),
                Modifiers::NO_EQUALS.single_quotes(),
            ),
        ]
    }
}

/// Validate the optional `LIKE` and `IN` filters of a SHOW record.
pub(crate) fn validate_filters(rules: &mut Rules, like: Option<&Like>, scope: Option<&In>) {
    if let Some(like) = like {
        rules.extend(like.validate());
    }
    if let Some(scope) = scope {
        rules.extend(scope.validate());
    }
}

// =============================================================================
// Tags
// =============================================================================

/// `"tag" = 'value'` pair of `TAG (...)` and `SET TAG` clauses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagAssociation {
    pub name: Identifier,
    pub value: String,
}

impl TagAssociation {
    pub fn new(name: impl Into<Identifier>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Structure for TagAssociation {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::ident("", Some(&self.name), Modifiers::EQUALS),
            Field::param("=", Some(&self.value), Modifiers::NO_EQUALS.single_quotes()),
        ]
    }
}

/// `TAG ("t1" = 'v1', "t2" = 'v2')` of CREATE statements.
pub(crate) fn create_tags(tags: Option<&[TagAssociation]>) -> Field<'_> {
    Field::records("TAG", tags, Separator::Comma, Modifiers::NO_EQUALS.parentheses())
}

/// `SET TAG "t1" = 'v1', "t2" = 'v2'` of ALTER statements.
pub(crate) fn set_tags(tags: Option<&[TagAssociation]>) -> Field<'_> {
    Field::records("SET TAG", tags, Separator::Comma, Modifiers::NO_EQUALS)
}

/// `UNSET TAG "t1", "t2"` of ALTER statements.
pub(crate) fn unset_tags(tags: Option<&[Identifier]>) -> Field<'_> {
    Field::values("UNSET TAG", tags, Separator::Comma, Modifiers::NO_EQUALS)
}

pub(crate) fn validate_tags(rules: &mut Rules, tags: Option<&[TagAssociation]>) {
    if let Some(tags) = tags {
        let names: Vec<&Identifier> = tags.iter().map(|t| &t.name).collect();
        rules.check(
            names.iter().any(|n| !n.is_valid()),
            ValidationError::InvalidObjectIdentifier,
        );
    }
}

// =============================================================================
// Cloning and time travel
// =============================================================================

/// `AT | BEFORE (TIMESTAMP => '...' | OFFSET => -60 | STATEMENT => '...')`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimeTravel {
    pub timestamp: Option<String>,
    pub offset: Option<i32>,
    pub statement: Option<String>,
}

impl TimeTravel {
    fn validate(&self, rules: &mut Rules) {
        rules.exactly_one_of(&[
            field("Timestamp", &self.timestamp),
            field("Offset", &self.offset),
            field("Statement", &self.statement),
        ]);
    }
}

impl Structure for TimeTravel {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::param(
                "TIMESTAMP",
                self.timestamp.as_ref(),
                Modifiers::new().arrow().single_quotes(),
            ),
            Field::param("OFFSET", self.offset.as_ref(), Modifiers::new().arrow()),
            Field::param(
                "STATEMENT",
                self.statement.as_ref(),
                Modifiers::new().arrow().single_quotes(),
            ),
        ]
    }
}

/// `CLONE <source> [AT (...) | BEFORE (...)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CloneSource<I> {
    pub source: I,
    pub at: Option<TimeTravel>,
    pub before: Option<TimeTravel>,
}

impl<I: ObjectIdentifier> CloneSource<I> {
    pub fn new(source: I) -> Self {
        Self {
            source,
            at: None,
            before: None,
        }
    }

    /// Rules for a clone clause nested under `path` (e.g. `CreateDatabaseOptions`).
    pub(crate) fn validate(&self, rules: &mut Rules) {
        rules.valid_identifier(&self.source);
        rules.nested("Clone", |r| {
            r.one_of(&[field("At", &self.at), field("Before", &self.before)]);
            if let Some(at) = &self.at {
                r.nested("At", |r| at.validate(r));
            }
            if let Some(before) = &self.before {
                r.nested("Before", |r| before.validate(r));
            }
        });
    }
}

impl<I: ObjectIdentifier> Structure for CloneSource<I> {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::ident("CLONE", Some(&self.source), Modifiers::NO_EQUALS),
            Field::record(
                "AT",
                self.at.as_ref(),
                Separator::Space,
                Modifiers::NO_EQUALS.parentheses(),
            ),
            Field::record(
                "BEFORE",
                self.before.as_ref(),
                Separator::Space,
                Modifiers::NO_EQUALS.parentheses(),
            ),
        ]
    }
}

// =============================================================================
// Schedule
// =============================================================================

/// Task and alert schedule: `N MINUTE` or `USING CRON <expr> <time zone>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Minutes(u32),
    Cron { expression: String, time_zone: String },
}

impl Schedule {
    pub fn minutes(n: u32) -> Self {
        Schedule::Minutes(n)
    }

    pub fn cron(expression: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Schedule::Cron {
            expression: expression.into(),
            time_zone: time_zone.into(),
        }
    }

    /// Parse a schedule column. `None` when the text matches neither form.
    ///
    /// The cron form is five cron fields followed by a time zone, with or
    /// without the `USING CRON` prefix.
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [n, unit] if unit.eq_ignore_ascii_case("MINUTE") || unit.eq_ignore_ascii_case("MINUTES") => {
                n.parse().ok().map(Schedule::Minutes)
            }
            [using, cron, rest @ ..]
                if using.eq_ignore_ascii_case("USING") && cron.eq_ignore_ascii_case("CRON") =>
            {
                Self::from_cron_tokens(rest)
            }
            other => Self::from_cron_tokens(other),
        }
    }

    fn from_cron_tokens(tokens: &[&str]) -> Option<Self> {
        match tokens {
            [fields @ .., time_zone] if fields.len() == 5 => {
                Some(Schedule::cron(fields.join(" "), *time_zone))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Minutes(n) => write!(f, "{n} MINUTE"),
            Schedule::Cron {
                expression,
                time_zone,
            } => write!(f, "USING CRON {expression} {time_zone}"),
        }
    }
}

impl FromStr for Schedule {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_lenient(s).ok_or_else(|| SdkError::invalid_enum("schedule", s))
    }
}

impl ToSqlValue for Schedule {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Str(self.to_string())
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// =============================================================================
// Signatures
// =============================================================================

/// Argument types of a SHOW FUNCTIONS / SHOW PROCEDURES signature such as
/// `ADD(NUMBER, [VARCHAR]) RETURN NUMBER`. Optional arguments lose their
/// brackets.
pub(crate) fn parse_argument_types(signature: &str) -> Vec<String> {
    let head = signature.split(" RETURN ").next().unwrap_or(signature);
    let (Some(open), Some(close)) = (head.find('('), head.rfind(')')) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    head[open + 1..close]
        .split(',')
        .map(|a| a.trim().trim_start_matches('[').trim_end_matches(']').trim())
        .filter(|a| !a.is_empty())
        .map(str::to_uppercase)
        .collect()
}
