//! Core abstractions shared by every object module.
//!
//! - [`identifier`]: Typed object names and their quoting rules
//! - [`value`]: SQL scalar values and value enums
//! - [`traits`]: The executor seam and the options contract

pub mod identifier;
pub mod traits;
pub mod value;

// Re-export commonly used types for convenience
pub use identifier::{
    AccountIdentifier, AccountLocator, AccountObjectIdentifier, DatabaseObjectIdentifier,
    ExternalObjectIdentifier, Identifier, IdentifierError, ObjectIdentifier,
    SchemaObjectIdentifier, SchemaObjectIdentifierWithArguments, TableColumnIdentifier,
};
pub use traits::{ExecResult, Executor, Options, Row};
pub use value::{SqlValue, ToSqlValue};
