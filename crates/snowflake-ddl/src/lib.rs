//! # snowflake-ddl
//!
//! Typed DDL builder, validation and result mapping for Snowflake SQL.
//!
//! The library turns typed options records into Snowflake SQL text:
//!
//! - **Identifiers** for every object scope, with quoting and FQN parsing
//! - **Validation** that collects every rule violation of a record
//! - **Rendering** of options records through a declarative field model
//! - **Result mapping** from `SHOW`/`DESCRIBE` rows to plain records
//! - **Object accessors** (`client.warehouses()`, `client.tasks()`, ...)
//!   running statements through a pluggable [`Executor`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use snowflake_ddl::objects::warehouses::{CreateWarehouseOptions, WarehouseSize};
//! use snowflake_ddl::{AccountObjectIdentifier, Client, RecordingExecutor};
//!
//! #[tokio::main]
//! async fn main() -> snowflake_ddl::Result<()> {
//!     let client = Client::new(Arc::new(RecordingExecutor::new()));
//!     let mut opts = CreateWarehouseOptions::new(AccountObjectIdentifier::new("wh1"));
//!     opts.warehouse_size = Some(WarehouseSize::XSmall);
//!     client.warehouses().create(&opts).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod ddl;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod objects;
pub mod statement;
pub mod validation;

// Re-exports for convenient access
pub use client::Client;
pub use config::{ClientConfig, Config, ConnectionConfig};
pub use crate::core::{
    AccountObjectIdentifier, DatabaseObjectIdentifier, ExecResult, Executor,
    ObjectIdentifier, Options, Row, SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments, TableColumnIdentifier,
};
pub use error::{Result, SdkError};
pub use executor::RecordingExecutor;
pub use statement::{Plan, Statement, StatementErrors};
pub use validation::{ValidationError, ValidationErrors};
