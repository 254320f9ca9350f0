//! Object modules.
//!
//! One module per Snowflake object kind. Each defines the options records
//! of its statements, the row records of its SHOW/DESCRIBE output and an
//! accessor borrowed from [`Client`](crate::client::Client).

pub mod accounts;
pub mod alerts;
pub mod common;
pub mod databases;
pub mod external_tables;
pub mod functions;
pub mod network_policies;
pub mod pipes;
pub mod procedures;
pub mod schemas;
pub mod tags;
pub mod tasks;
pub mod warehouses;

pub use common::{
    CloneSource, In, Like, LimitFrom, LogLevel, Schedule, TagAssociation, TimeTravel, TraceLevel,
};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use serde_json::Value;

    use crate::client::Client;
    use crate::core::traits::Row;
    use crate::executor::RecordingExecutor;

    pub(crate) fn client() -> (Arc<RecordingExecutor>, Client) {
        let executor = Arc::new(RecordingExecutor::new());
        let client = Client::new(executor.clone());
        (executor, client)
    }

    pub(crate) fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("row fixture must be an object, got {other}"),
        }
    }
}
