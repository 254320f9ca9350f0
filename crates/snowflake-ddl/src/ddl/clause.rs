//! Field to clause conversion.

use crate::core::value::SqlValue;

use super::field::{Assignment, EmitOrder, Field, Grouping, ListItem, Modifiers, Separator};
use super::{render_fields, SqlError};

/// A rendered fragment of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Clause {
    /// Inactive field.
    Empty,

    /// Text emitted as-is.
    Text(String),

    /// Literal bound to a value.
    Assigned {
        literal: &'static str,
        value: String,
        assignment: Assignment,
        order: EmitOrder,
    },
}

impl Clause {
    fn assigned(literal: &'static str, value: String, modifiers: &Modifiers) -> Self {
        if literal.is_empty() {
            return Clause::Text(value);
        }
        Clause::Assigned {
            literal,
            value,
            assignment: modifiers.assignment,
            order: modifiers.order,
        }
    }

    pub(crate) fn render(self) -> String {
        match self {
            Clause::Empty => String::new(),
            Clause::Text(text) => text,
            Clause::Assigned {
                literal,
                value,
                assignment,
                order: EmitOrder::Natural,
            } => assignment.join(literal, &value),
            Clause::Assigned {
                literal,
                value,
                assignment,
                order: EmitOrder::Reversed,
            } => assignment.join(&value, literal),
        }
    }
}

fn unknown_kind(literal: &'static str, value: &SqlValue) -> SqlError {
    SqlError::UnknownKind {
        literal,
        kind: value.type_name(),
        value: value.render(),
    }
}

impl Field<'_> {
    pub(crate) fn into_clause(self) -> Result<Clause, SqlError> {
        let clause = match self {
            Field::Static(text) => Clause::Text(text.to_string()),

            Field::Keyword {
                literal,
                value,
                modifiers,
            } => match value {
                None | Some(SqlValue::Bool(false)) => Clause::Empty,
                Some(SqlValue::Bool(true)) => Clause::Text(literal.to_string()),
                Some(v @ (SqlValue::Str(_) | SqlValue::Enum(_))) => {
                    let quoted = modifiers.quote(&v);
                    if literal.is_empty() {
                        Clause::Text(quoted)
                    } else {
                        Clause::Text(format!("{literal} {quoted}"))
                    }
                }
                Some(other) => return Err(unknown_kind(literal, &other)),
            },

            Field::Parameter {
                literal,
                value,
                modifiers,
            } => match value {
                None => Clause::Empty,
                Some(v) => {
                    let rendered = modifiers.group(&modifiers.quote(&v));
                    Clause::assigned(literal, rendered, &modifiers)
                }
            },

            Field::Identifier {
                literal,
                value,
                modifiers,
            } => match value {
                Some(id) if id.is_valid() => {
                    let rendered = modifiers.group(&id.fully_qualified_name());
                    Clause::assigned(literal, rendered, &modifiers)
                }
                _ => Clause::Empty,
            },

            Field::List {
                literal,
                items,
                separator,
                modifiers,
            } => match items {
                None => Clause::Empty,
                Some(items) if items.is_empty() && modifiers.grouping == Grouping::None => {
                    Clause::Empty
                }
                Some(items) => {
                    let rendered = items
                        .into_iter()
                        .map(|item| match item {
                            ListItem::Value(v) => Ok(modifiers.quote(&v)),
                            ListItem::Record(r) => render_fields(r.fields(), Separator::Space),
                        })
                        .collect::<Result<Vec<_>, _>>()?
                        .join(separator.as_str());
                    Clause::assigned(literal, modifiers.group(&rendered), &modifiers)
                }
            },

            Field::Record {
                literal,
                value,
                separator,
                modifiers,
            } => match value {
                None => Clause::Empty,
                Some(record) => {
                    let body = render_fields(record.fields(), separator)?;
                    let body = modifiers.group(&body);
                    if body.is_empty() {
                        Clause::Text(literal.to_string())
                    } else {
                        Clause::assigned(literal, body, &modifiers)
                    }
                }
            },

            Field::Condition { literal, value } => match value {
                None => Clause::Empty,
                Some(SqlValue::Str(expr)) if literal.is_empty() => Clause::Text(format!("({expr})")),
                Some(SqlValue::Str(expr)) => Clause::Text(format!("{literal} ({expr})")),
                Some(other) => return Err(unknown_kind(literal, &other)),
            },

            Field::Raw(text) => text.map(Clause::Text).unwrap_or(Clause::Empty),
        };
        Ok(clause)
    }
}
