//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl ConnectionConfig {
    /// Build a gosnowflake-style DSN:
    /// `user:password@account/database/schema?warehouse=..&role=..&authenticator=..`
    pub fn dsn(&self) -> String {
        self.build_dsn(&self.password)
    }

    /// The DSN with the password masked, safe to print or log.
    pub fn redacted_dsn(&self) -> String {
        if self.password.is_empty() {
            self.build_dsn("")
        } else {
            self.build_dsn("****")
        }
    }

    fn build_dsn(&self, password: &str) -> String {
        let mut dsn = if password.is_empty() {
            format!("{}@{}", self.user, self.account)
        } else {
            format!("{}:{}@{}", self.user, password, self.account)
        };

        if let Some(database) = &self.database {
            dsn.push('/');
            dsn.push_str(database);
            if let Some(schema) = &self.schema {
                dsn.push('/');
                dsn.push_str(schema);
            }
        }

        let mut params = Vec::new();
        if let Some(warehouse) = &self.warehouse {
            params.push(format!("warehouse={warehouse}"));
        }
        if let Some(role) = &self.role {
            params.push(format!("role={role}"));
        }
        params.push(format!("authenticator={}", self.authenticator));

        format!("{}?{}", dsn, params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
connection:
  account: myorg-myaccount
  user: loader
  password: hunter2
  warehouse: COMPUTE_WH
  database: ANALYTICS
  schema: PUBLIC
client:
  statement_timeout_secs: 30
"#;

    #[test]
    fn test_from_yaml_applies_defaults() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(config.connection.authenticator, "snowflake");
        assert!(config.client.log_statements);
        assert!(!config.client.dry_run);
        assert_eq!(config.client.statement_timeout_secs, Some(30));
    }

    #[test]
    fn test_client_section_is_optional() {
        let yaml = "connection:\n  account: a\n  user: u\n  password: p\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_from_yaml_rejects_invalid() {
        let yaml = "connection:\n  account: ''\n  user: u\n  password: p\n";
        assert!(Config::from_yaml(yaml).is_err());
        assert!(Config::from_yaml("connection: [").is_err());
    }

    #[test]
    fn test_dsn() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(
            config.connection.dsn(),
            "loader:hunter2@myorg-myaccount/ANALYTICS/PUBLIC?warehouse=COMPUTE_WH&authenticator=snowflake"
        );
        assert_eq!(
            config.connection.redacted_dsn(),
            "loader:****@myorg-myaccount/ANALYTICS/PUBLIC?warehouse=COMPUTE_WH&authenticator=snowflake"
        );
    }

    #[test]
    fn test_password_never_serialized() {
        let config = Config::from_yaml(YAML).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("hunter2"));
        assert!(yaml.contains("loader"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/snowflake.yaml").unwrap_err();
        assert!(matches!(err, crate::error::SdkError::Io(_)));
    }
}
