//! Configuration validation.

use super::{Config, AUTHENTICATORS};
use crate::error::{Result, SdkError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;

    if conn.account.trim().is_empty() {
        return Err(SdkError::Config("connection.account is required".into()));
    }
    if conn.user.trim().is_empty() {
        return Err(SdkError::Config("connection.user is required".into()));
    }

    let authenticator = conn.authenticator.to_lowercase();
    if !AUTHENTICATORS.contains(&authenticator.as_str()) {
        return Err(SdkError::Config(format!(
            "connection.authenticator must be one of {}, got '{}'",
            AUTHENTICATORS.join(", "),
            conn.authenticator
        )));
    }
    if authenticator == "snowflake" && conn.password.is_empty() {
        return Err(SdkError::Config(
            "connection.password is required for the snowflake authenticator".into(),
        ));
    }

    for (field, value) in [
        ("role", &conn.role),
        ("warehouse", &conn.warehouse),
        ("database", &conn.database),
        ("schema", &conn.schema),
    ] {
        if matches!(value, Some(v) if v.trim().is_empty()) {
            return Err(SdkError::Config(format!(
                "connection.{field} must not be empty when set"
            )));
        }
    }
    if conn.schema.is_some() && conn.database.is_none() {
        return Err(SdkError::Config(
            "connection.schema requires connection.database".into(),
        ));
    }

    if let Some(0) = config.client.statement_timeout_secs {
        return Err(SdkError::Config(
            "client.statement_timeout_secs must be at least 1".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, ConnectionConfig};

    fn valid_config() -> Config {
        Config {
            connection: ConnectionConfig {
                account: "myorg-myaccount".to_string(),
                user: "loader".to_string(),
                password: "hunter2".to_string(),
                role: Some("SYSADMIN".to_string()),
                warehouse: Some("COMPUTE_WH".to_string()),
                database: Some("ANALYTICS".to_string()),
                schema: Some("PUBLIC".to_string()),
                authenticator: "snowflake".to_string(),
            },
            client: ClientConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_account() {
        let mut config = valid_config();
        config.connection.account = "".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("connection.account"));
    }

    #[test]
    fn test_missing_user() {
        let mut config = valid_config();
        config.connection.user = " ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_authenticator() {
        let mut config = valid_config();
        config.connection.authenticator = "kerberos".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("authenticator"));
    }

    #[test]
    fn test_password_required_for_default_authenticator() {
        let mut config = valid_config();
        config.connection.password = String::new();
        assert!(validate(&config).is_err());

        config.connection.authenticator = "externalbrowser".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_schema_requires_database() {
        let mut config = valid_config();
        config.connection.database = None;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("connection.schema"));
    }

    #[test]
    fn test_empty_optional_field_rejected() {
        let mut config = valid_config();
        config.connection.role = Some("".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.client.statement_timeout_secs = Some(0);
        assert!(validate(&config).is_err());

        config.client.statement_timeout_secs = Some(30);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_connection_debug_redacts_password() {
        let config = valid_config();
        let debug_output = format!("{:?}", config.connection);
        assert!(
            !debug_output.contains("hunter2"),
            "Debug output should not contain the password"
        );
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
    }
}
