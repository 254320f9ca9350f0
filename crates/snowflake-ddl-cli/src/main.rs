//! snowflake-ddl CLI - render and validate Snowflake DDL statement plans.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use snowflake_ddl::core::{
    AccountIdentifier, AccountObjectIdentifier, DatabaseObjectIdentifier, ObjectIdentifier,
    SchemaObjectIdentifier, SchemaObjectIdentifierWithArguments, TableColumnIdentifier,
};
use snowflake_ddl::{Client, ClientConfig, Config, Plan, RecordingExecutor, SdkError, ValidationErrors};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "snowflake-ddl")]
#[command(about = "Render and validate Snowflake DDL statement plans")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a statement plan and print its SQL, one statement per line.
    /// Client settings come from the config file when it exists.
    Render {
        /// Path to the YAML statement plan
        plan: PathBuf,
    },

    /// Validate a statement plan and report every violation
    Validate {
        /// Path to the YAML statement plan
        plan: PathBuf,
    },

    /// Parse an identifier and print its parts
    ParseIdentifier {
        /// Identifier kind
        #[arg(value_enum)]
        kind: IdentifierKind,

        /// Identifier text, e.g. db.sch."My Table"
        value: String,
    },

    /// Load and validate the configuration file
    CheckConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum IdentifierKind {
    Account,
    AccountObject,
    DatabaseObject,
    SchemaObject,
    SchemaObjectWithArguments,
    TableColumn,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), SdkError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    match cli.command {
        Commands::Render { plan } => {
            let plan = Plan::load(&plan)?;
            info!(statements = plan.statements.len(), "loaded plan");

            // Run the plan against a recording executor so the statements
            // go through the same client path a live session would.
            let client_config = if cli.config.exists() {
                let config = Config::load(&cli.config)?;
                info!(config = %cli.config.display(), "using client settings");
                // Rendering never reaches a server; dry run would record nothing.
                ClientConfig {
                    dry_run: false,
                    ..config.client
                }
            } else {
                ClientConfig::default()
            };
            let executor = Arc::new(RecordingExecutor::new());
            let client = Client::with_config(executor.clone(), client_config);
            let cancel_token = setup_signal_handler();
            let client_token = client.cancellation_token();
            tokio::spawn(async move {
                cancel_token.cancelled().await;
                client_token.cancel();
            });

            plan.execute(&client).await?;
            let statements = executor.statements();

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else {
                for sql in statements {
                    println!("{};", sql);
                }
            }
        }

        Commands::Validate { plan } => {
            let plan = Plan::load(&plan)?;
            let failures = plan.validate();

            if cli.output_json {
                let report: Vec<_> = failures
                    .iter()
                    .map(|f| {
                        json!({
                            "index": f.index,
                            "kind": f.kind,
                            "errors": f.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if failures.is_empty() {
                println!("{} statement(s) valid", plan.statements.len());
            } else {
                for failure in &failures {
                    println!("statement {} ({}):", failure.index + 1, failure.kind);
                    for error in failure.errors.iter() {
                        println!("  - {}", error);
                    }
                }
            }

            if !failures.is_empty() {
                let all: Vec<_> = failures
                    .into_iter()
                    .flat_map(|f| f.errors.as_slice().to_vec())
                    .collect();
                return Err(SdkError::Validation(ValidationErrors::from(all)));
            }
        }

        Commands::ParseIdentifier { kind, value } => {
            let id: Box<dyn ObjectIdentifier> = match kind {
                IdentifierKind::Account => Box::new(value.parse::<AccountIdentifier>()?),
                IdentifierKind::AccountObject => Box::new(value.parse::<AccountObjectIdentifier>()?),
                IdentifierKind::DatabaseObject => Box::new(value.parse::<DatabaseObjectIdentifier>()?),
                IdentifierKind::SchemaObject => Box::new(value.parse::<SchemaObjectIdentifier>()?),
                IdentifierKind::SchemaObjectWithArguments => {
                    Box::new(value.parse::<SchemaObjectIdentifierWithArguments>()?)
                }
                IdentifierKind::TableColumn => Box::new(value.parse::<TableColumnIdentifier>()?),
            };

            if cli.output_json {
                let output = json!({
                    "name": id.name(),
                    "parts": id.parts(),
                    "literal": id.literal(),
                    "fully_qualified_name": id.fully_qualified_name(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("name: {}", id.name());
                println!("literal: {}", id.literal());
                println!("fully qualified name: {}", id.fully_qualified_name());
            }
        }

        Commands::CheckConfig => {
            let config = Config::load(&cli.config)?;
            info!("Loaded configuration from {:?}", cli.config);

            if cli.output_json {
                let output = json!({
                    "dsn": config.connection.redacted_dsn(),
                    "client": config.client,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Configuration OK");
                println!("  DSN: {}", config.connection.redacted_dsn());
                println!("  Log statements: {}", config.client.log_statements);
                match config.client.statement_timeout_secs {
                    Some(secs) => println!("  Statement timeout: {}s", secs),
                    None => println!("  Statement timeout: none"),
                }
                println!("  Dry run: {}", config.client.dry_run);
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout carries the rendered SQL.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Cancel in-flight statements on SIGINT or SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    let token_int = cancel_token.clone();
    let token_term = cancel_token.clone();

    tokio::spawn(async move {
        if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
            sigint.recv().await;
            eprintln!("\nReceived SIGINT. Cancelling...");
            token_int.cancel();
        }
    });

    tokio::spawn(async move {
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            sigterm.recv().await;
            eprintln!("\nReceived SIGTERM. Cancelling...");
            token_term.cancel();
        }
    });

    cancel_token
}

/// Cancel in-flight statements on Ctrl-C.
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl-C. Cancelling...");
            token.cancel();
        }
    });

    cancel_token
}
