//! Configuration types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snowflake session parameters.
    pub connection: ConnectionConfig,

    /// SDK client behavior.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Snowflake connection configuration.
///
/// The SDK never connects on its own; these values are handed to whatever
/// driver backs the [`Executor`](crate::core::Executor).
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Account identifier, e.g. `myorg-myaccount`.
    pub account: String,

    /// Login name.
    pub user: String,

    /// Password. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Role to assume after login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Default warehouse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,

    /// Default database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Default schema (requires `database`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Authenticator (default: "snowflake").
    #[serde(default = "default_authenticator")]
    pub authenticator: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("authenticator", &self.authenticator)
            .finish()
    }
}

/// Client behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Log every rendered statement at debug level (default: true).
    #[serde(default = "default_true")]
    pub log_statements: bool,

    /// Per-statement timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_timeout_secs: Option<u64>,

    /// Render and record statements without running them (default: false).
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_statements: true,
            statement_timeout_secs: None,
            dry_run: false,
        }
    }
}

/// Authenticators accepted by the driver.
pub const AUTHENTICATORS: &[&str] = &[
    "snowflake",
    "externalbrowser",
    "snowflake_jwt",
    "oauth",
    "username_password_mfa",
];

// Default value functions for serde
fn default_authenticator() -> String {
    "snowflake".to_string()
}

fn default_true() -> bool {
    true
}
