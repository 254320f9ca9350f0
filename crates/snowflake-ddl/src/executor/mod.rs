//! Invocation glue.
//!
//! Every object operation follows the same sequence: reject absent options,
//! validate, render, run through the client, map rows. The functions here
//! implement that sequence once for all object modules.

mod recording;

pub use recording::RecordingExecutor;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::Client;
use crate::core::traits::{ExecResult, Options};
use crate::ddl;
use crate::error::{Result, SdkError};
use crate::mapper::{self, ConvertibleRow};

/// Validate and render an options record without running it.
pub fn render<O: Options + ?Sized>(opts: Option<&O>) -> Result<String> {
    let opts = opts.ok_or(SdkError::NilOptions)?;
    opts.validate()?;
    let sql = ddl::to_sql(opts)?;
    debug!(sql = %sql, "rendered statement");
    Ok(sql)
}

/// Run a statement that returns no rows.
pub async fn validate_and_exec<O: Options + ?Sized>(
    client: &Client,
    opts: Option<&O>,
) -> Result<ExecResult> {
    let sql = render(opts)?;
    client.exec(&sql).await
}

/// Run a query and convert every row.
pub async fn validate_and_query<O, R>(client: &Client, opts: Option<&O>) -> Result<Vec<R::Plain>>
where
    O: Options + ?Sized,
    R: DeserializeOwned + ConvertibleRow,
{
    let sql = render(opts)?;
    let rows = client.query(&sql).await?;
    let bound: Vec<R> = mapper::bind_rows(rows)?;
    mapper::convert_rows(&bound)
}

/// Run a query that must return exactly one row.
pub async fn validate_and_query_one<O, R>(client: &Client, opts: Option<&O>) -> Result<R::Plain>
where
    O: Options + ?Sized,
    R: DeserializeOwned + ConvertibleRow,
{
    let sql = render(opts)?;
    let row = client.query_one(&sql).await?;
    let bound: R = mapper::bind_row(row)?;
    bound.convert()
}

/// Run a query whose rows bind directly to a plain record.
pub async fn validate_and_query_plain<O, T>(client: &Client, opts: Option<&O>) -> Result<Vec<T>>
where
    O: Options + ?Sized,
    T: DeserializeOwned,
{
    let sql = render(opts)?;
    let rows = client.query(&sql).await?;
    mapper::bind_rows(rows)
}

/// Pick the object a show-by-id lookup asked for.
///
/// Snowflake reports missing and unauthorized objects identically, so an
/// empty match is [`SdkError::ObjectNotExistOrAuthorized`].
pub fn show_by_id<T, P>(items: Vec<T>, predicate: P) -> Result<T>
where
    P: FnMut(&T) -> bool,
{
    mapper::find_one(items, predicate).map_err(|err| match err {
        SdkError::ObjectNotFound => SdkError::ObjectNotExistOrAuthorized,
        other => other,
    })
}
