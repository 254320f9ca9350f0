//! Field descriptors.
//!
//! An options record describes itself as an ordered list of [`Field`]s.
//! Each field carries its SQL literal, its current value (borrowed from the
//! record) and the [`Modifiers`] that control quoting and layout.

use crate::core::identifier::ObjectIdentifier;
use crate::core::value::{SqlValue, ToSqlValue};

use super::Structure;

/// Quoting applied to a rendered value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quotes {
    #[default]
    None,
    Single,
    Double,
}

/// How a literal is tied to its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assignment {
    /// `LITERAL = value`
    #[default]
    Equals,
    /// `LITERAL value`
    NoEquals,
    /// `LITERAL => value`
    Arrow,
}

impl Assignment {
    pub(crate) fn join(self, left: &str, right: &str) -> String {
        match self {
            Assignment::Equals => format!("{left} = {right}"),
            Assignment::NoEquals => format!("{left} {right}"),
            Assignment::Arrow => format!("{left} => {right}"),
        }
    }
}

/// Whether a value is wrapped in parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    #[default]
    None,
    Parentheses,
}

/// Whether the literal precedes or follows its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitOrder {
    #[default]
    Natural,
    Reversed,
}

/// Rendering modifiers of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub quotes: Quotes,
    pub assignment: Assignment,
    pub grouping: Grouping,
    pub order: EmitOrder,
}

impl Modifiers {
    /// `LITERAL = value`, unquoted.
    pub const EQUALS: Modifiers = Modifiers::new();

    /// `LITERAL = 'value'`.
    pub const SINGLE_QUOTED: Modifiers = Modifiers::new().single_quotes();

    /// `LITERAL value`, unquoted.
    pub const NO_EQUALS: Modifiers = Modifiers::new().no_equals();

    /// No quotes, `=` assignment, no parentheses, natural order.
    pub const fn new() -> Self {
        Self {
            quotes: Quotes::None,
            assignment: Assignment::Equals,
            grouping: Grouping::None,
            order: EmitOrder::Natural,
        }
    }

    pub const fn single_quotes(self) -> Self {
        Self {
            quotes: Quotes::Single,
            ..self
        }
    }

    pub const fn double_quotes(self) -> Self {
        Self {
            quotes: Quotes::Double,
            ..self
        }
    }

    pub const fn no_equals(self) -> Self {
        Self {
            assignment: Assignment::NoEquals,
            ..self
        }
    }

    pub const fn arrow(self) -> Self {
        Self {
            assignment: Assignment::Arrow,
            ..self
        }
    }

    pub const fn parentheses(self) -> Self {
        Self {
            grouping: Grouping::Parentheses,
            ..self
        }
    }

    pub const fn reversed(self) -> Self {
        Self {
            order: EmitOrder::Reversed,
            ..self
        }
    }

    /// Apply the quoting modifier. Identifiers carry their own quoting and
    /// are never wrapped.
    pub(crate) fn quote(&self, value: &SqlValue) -> String {
        let raw = value.render();
        if matches!(value, SqlValue::Ident(_)) {
            return raw;
        }
        match self.quotes {
            Quotes::None => raw,
            Quotes::Single => format!("'{raw}'"),
            Quotes::Double => format!("\"{raw}\""),
        }
    }

    pub(crate) fn group(&self, body: &str) -> String {
        match self.grouping {
            Grouping::None => body.to_string(),
            Grouping::Parentheses => format!("({body})"),
        }
    }
}

/// Item separator of a list or sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    /// `a, b, c`
    #[default]
    Comma,
    /// `a b c`
    Space,
}

impl Separator {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Separator::Comma => ", ",
            Separator::Space => " ",
        }
    }
}

/// One element of a list field.
pub enum ListItem<'a> {
    /// A scalar or identifier, quoted by the list's modifiers.
    Value(SqlValue),
    /// A nested record rendered with its own fields, space-separated.
    Record(&'a dyn Structure),
}

/// Description of one field of an options record.
pub enum Field<'a> {
    /// A fixed keyword such as `CREATE` or `WAREHOUSE`. Always emitted.
    Static(&'static str),

    /// Boolean flag or bare enum/string value. `None` and `false` emit
    /// nothing.
    Keyword {
        literal: &'static str,
        value: Option<SqlValue>,
        modifiers: Modifiers,
    },

    /// `LITERAL = value` with modifiers.
    Parameter {
        literal: &'static str,
        value: Option<SqlValue>,
        modifiers: Modifiers,
    },

    /// Object name. Inactive when absent or invalid.
    Identifier {
        literal: &'static str,
        value: Option<&'a dyn ObjectIdentifier>,
        modifiers: Modifiers,
    },

    /// Sequence of values or records. `None` is inactive.
    List {
        literal: &'static str,
        items: Option<Vec<ListItem<'a>>>,
        separator: Separator,
        modifiers: Modifiers,
    },

    /// Nested record, walked recursively.
    Record {
        literal: &'static str,
        value: Option<&'a dyn Structure>,
        separator: Separator,
        modifiers: Modifiers,
    },

    /// `LITERAL (expression)`.
    Condition {
        literal: &'static str,
        value: Option<SqlValue>,
    },

    /// Verbatim SQL text.
    Raw(Option<String>),
}

impl<'a> Field<'a> {
    /// Boolean flag: emits the literal iff `Some(true)`.
    pub fn flag(literal: &'static str, value: Option<bool>) -> Self {
        Field::Keyword {
            literal,
            value: value.map(SqlValue::Bool),
            modifiers: Modifiers::new(),
        }
    }

    /// Bare keyword value, optionally prefixed by a literal.
    pub fn keyword<V: ToSqlValue + ?Sized>(
        literal: &'static str,
        value: Option<&V>,
        modifiers: Modifiers,
    ) -> Self {
        Field::Keyword {
            literal,
            value: value.map(ToSqlValue::to_sql_value),
            modifiers,
        }
    }

    pub fn param<V: ToSqlValue + ?Sized>(
        literal: &'static str,
        value: Option<&V>,
        modifiers: Modifiers,
    ) -> Self {
        Field::Parameter {
            literal,
            value: value.map(ToSqlValue::to_sql_value),
            modifiers,
        }
    }

    pub fn ident<I: ObjectIdentifier>(
        literal: &'static str,
        value: Option<&'a I>,
        modifiers: Modifiers,
    ) -> Self {
        Field::Identifier {
            literal,
            value: value.map(|v| v as &dyn ObjectIdentifier),
            modifiers,
        }
    }

    /// List of scalar or identifier values.
    pub fn values<V: ToSqlValue>(
        literal: &'static str,
        value: Option<&[V]>,
        separator: Separator,
        modifiers: Modifiers,
    ) -> Self {
        Field::List {
            literal,
            items: value.map(|vs| {
                vs.iter()
                    .map(|v| ListItem::Value(v.to_sql_value()))
                    .collect()
            }),
            separator,
            modifiers,
        }
    }

    /// List of nested records.
    pub fn records<S: Structure>(
        literal: &'static str,
        value: Option<&'a [S]>,
        separator: Separator,
        modifiers: Modifiers,
    ) -> Self {
        Field::List {
            literal,
            items: value.map(|rs| {
                rs.iter()
                    .map(|r| ListItem::Record(r as &dyn Structure))
                    .collect()
            }),
            separator,
            modifiers,
        }
    }

    pub fn record<S: Structure>(
        literal: &'static str,
        value: Option<&'a S>,
        separator: Separator,
        modifiers: Modifiers,
    ) -> Self {
        Field::Record {
            literal,
            value: value.map(|v| v as &dyn Structure),
            separator,
            modifiers,
        }
    }

    pub fn condition<V: ToSqlValue + ?Sized>(literal: &'static str, value: Option<&V>) -> Self {
        Field::Condition {
            literal,
            value: value.map(ToSqlValue::to_sql_value),
        }
    }

    pub fn raw(value: Option<&str>) -> Self {
        Field::Raw(value.map(str::to_string))
    }
}
