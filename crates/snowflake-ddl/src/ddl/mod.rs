//! Statement serialization.
//!
//! Options records implement [`Structure`] by listing their fields in
//! statement order. [`to_sql`] walks that list, renders every active field
//! and joins the fragments with single spaces. There is no hidden state:
//! rendering the same record twice yields the same text.

mod clause;
pub mod field;

use thiserror::Error;

pub use field::{Assignment, EmitOrder, Field, Grouping, ListItem, Modifiers, Quotes, Separator};

/// Failure to render a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// A keyword or condition field holds a value of a kind it cannot render.
    #[error("field {literal:?} cannot render a {kind} value ({value})")]
    UnknownKind {
        literal: &'static str,
        kind: &'static str,
        value: String,
    },
}

/// A record that renders as SQL.
pub trait Structure {
    /// Fields in the order they appear in the statement.
    fn fields(&self) -> Vec<Field<'_>>;
}

/// Render a record as one SQL statement.
pub fn to_sql<S: Structure + ?Sized>(record: &S) -> Result<String, SqlError> {
    let sql = render_fields(record.fields(), Separator::Space)?;
    Ok(collapse_spaces(sql.trim()))
}

/// Squeeze runs of spaces left by empty or padded fragments. Text inside
/// single or double quotes is kept as written.
fn collapse_spaces(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut prev_space = false;
    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == ' ' => {
                if prev_space {
                    continue;
                }
                prev_space = true;
                out.push(c);
                continue;
            }
            None => {}
        }
        prev_space = false;
        out.push(c);
    }
    out
}

pub(crate) fn render_fields(fields: Vec<Field<'_>>, separator: Separator) -> Result<String, SqlError> {
    let mut parts = Vec::with_capacity(fields.len());
    for field in fields {
        let text = field.into_clause()?.render();
        if !text.is_empty() {
            parts.push(text);
        }
    }
    Ok(parts.join(separator.as_str()))
}
