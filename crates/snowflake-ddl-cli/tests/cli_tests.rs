//! CLI integration tests for snowflake-ddl.
//!
//! These tests verify command-line argument parsing, help output,
//! rendered SQL and exit codes for various error conditions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Get a command for the snowflake-ddl binary.
fn cmd() -> Command {
    Command::cargo_bin("snowflake-ddl").unwrap()
}

/// Write YAML content to a temporary file.
fn yaml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

const PLAN: &str = r#"
statements:
  - kind: create_warehouse
    if_not_exists: true
    name: wh1
    warehouse_size: XSMALL
  - kind: drop_pipe
    if_exists: true
    name: db.sch.p
"#;

const INVALID_PLAN: &str = r#"
statements:
  - kind: drop_warehouse
    name: ok
  - kind: create_pipe
    or_replace: true
    if_not_exists: true
    name: db.sch.p
"#;

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("parse-identifier"))
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("snowflake-ddl"));
}

#[test]
fn test_parse_identifier_help_lists_kinds() {
    cmd()
        .args(["parse-identifier", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("schema-object-with-arguments"))
        .stdout(predicate::str::contains("table-column"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

// =============================================================================
// Render Tests
// =============================================================================

#[test]
fn test_render_prints_sql() {
    let plan = yaml_file(PLAN);

    cmd()
        .args(["render", plan.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CREATE WAREHOUSE IF NOT EXISTS \"wh1\" WAREHOUSE_SIZE = 'XSMALL';",
        ))
        .stdout(predicate::str::contains(
            "DROP PIPE IF EXISTS \"db\".\"sch\".\"p\";",
        ));
}

#[test]
fn test_render_output_json() {
    let plan = yaml_file(PLAN);

    cmd()
        .args(["--output-json", "render", plan.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains(
            "\"DROP PIPE IF EXISTS \\\"db\\\".\\\"sch\\\".\\\"p\\\"\"",
        ));
}

#[test]
fn test_render_invalid_plan_exits_with_code_2() {
    let plan = yaml_file(INVALID_PLAN);

    cmd()
        .args(["render", plan.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_render_missing_plan_exits_with_code_7() {
    cmd()
        .args(["render", "nonexistent_plan.yaml"])
        .assert()
        .code(7);
}

#[test]
fn test_render_unknown_kind_exits_with_code_1() {
    let plan = yaml_file("statements:\n  - kind: create_unicorn\n    name: u\n");

    cmd()
        .args(["render", plan.path().to_str().unwrap()])
        .assert()
        .code(1);
}

const CLIENT_CONFIG: &str = r#"
connection:
  account: myorg-acct
  user: me
  password: hunter2
client:
  log_statements: false
  dry_run: true
"#;

#[test]
fn test_render_uses_client_settings_from_config() {
    let plan = yaml_file(PLAN);
    let config = yaml_file(CLIENT_CONFIG);

    // dry_run is ignored for rendering; log_statements: false keeps the
    // per-statement debug line off stderr.
    cmd()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "--verbosity",
            "debug",
            "render",
            plan.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("DROP PIPE IF EXISTS \"db\".\"sch\".\"p\";"))
        .stderr(predicate::str::contains("executing statement").not());
}

#[test]
fn test_render_logs_statements_without_config() {
    let plan = yaml_file(PLAN);

    cmd()
        .args([
            "--config",
            "nonexistent_config_file.yaml",
            "--verbosity",
            "debug",
            "render",
            plan.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("executing statement"));
}

#[test]
fn test_render_invalid_client_config_exits_with_code_1() {
    let plan = yaml_file(PLAN);
    let config = yaml_file(
        "connection:\n  account: a\n  user: u\n  password: p\nclient:\n  statement_timeout_secs: 0\n",
    );

    cmd()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "render",
            plan.path().to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("client.statement_timeout_secs"));
}

// =============================================================================
// Validate Tests
// =============================================================================

#[test]
fn test_validate_valid_plan() {
    let plan = yaml_file(PLAN);

    cmd()
        .args(["validate", plan.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 statement(s) valid"));
}

#[test]
fn test_validate_reports_failing_statement() {
    let plan = yaml_file(INVALID_PLAN);

    cmd()
        .args(["validate", plan.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("statement 2 (create_pipe):"))
        .stdout(predicate::str::contains("incompatible"));
}

#[test]
fn test_validate_output_json() {
    let plan = yaml_file(INVALID_PLAN);

    cmd()
        .args(["--output-json", "validate", plan.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"kind\": \"create_pipe\""))
        .stdout(predicate::str::contains("\"index\": 1"));
}

// =============================================================================
// Parse Identifier Tests
// =============================================================================

#[test]
fn test_parse_schema_object() {
    cmd()
        .args(["parse-identifier", "schema-object", "db.sch.\"My Table\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: My Table"))
        .stdout(predicate::str::contains(
            "fully qualified name: \"db\".\"sch\".\"My Table\"",
        ));
}

#[test]
fn test_parse_identifier_with_arguments() {
    cmd()
        .args([
            "parse-identifier",
            "schema-object-with-arguments",
            "db.sch.fn(NUMBER, VARCHAR)",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"db\".\"sch\".\"fn\"(NUMBER, VARCHAR)"));
}

#[test]
fn test_parse_identifier_output_json() {
    cmd()
        .args(["--output-json", "parse-identifier", "database-object", "db.sch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"sch\""))
        .stdout(predicate::str::contains("\"literal\": \"db.sch\""));
}

#[test]
fn test_parse_identifier_wrong_part_count_exits_with_code_3() {
    cmd()
        .args(["parse-identifier", "schema-object", "db.sch"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("expects 3 parts"));
}

#[test]
fn test_parse_identifier_unknown_kind_fails() {
    cmd()
        .args(["parse-identifier", "stage", "db.sch.s"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// =============================================================================
// Check Config Tests
// =============================================================================

#[test]
fn test_check_config_prints_redacted_dsn() {
    let config = yaml_file(
        r#"
connection:
  account: myorg-acct
  user: me
  password: hunter2
  warehouse: wh
  database: db
  schema: sch
"#,
    );

    cmd()
        .args(["--config", config.path().to_str().unwrap(), "check-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "me:****@myorg-acct/db/sch?warehouse=wh&authenticator=snowflake",
        ))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "check-config"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let config = yaml_file("invalid: yaml: content: [\n");

    cmd()
        .args(["--config", config.path().to_str().unwrap(), "check-config"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_password_exits_with_code_1() {
    let config = yaml_file("connection:\n  account: a\n  user: u\n");

    cmd()
        .args(["--config", config.path().to_str().unwrap(), "check-config"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("connection.password is required"));
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
