//! Command-line front end for the customer core.
//!
//! # Responsibility
//! - Resolve configuration, open the store and select the adapter once.
//! - Map each subcommand onto one `CustomerService` call.
//! - Print results as JSON and turn error kinds into exit codes.

use anyhow::Context;
use clap::{Parser, Subcommand};
use customer_core::db::open_db;
use customer_core::{
    init_logging, open_customer_repository, CoreConfig, CustomerId, CustomerPatch,
    CustomerRegistration, CustomerService, CustomerServiceError, ErrorKind, StorageBackend,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Manage customer records", long_about = None)]
#[command(name = "customer_cli")]
struct Cli {
    /// SQLite database file (overrides CUSTOMER_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Storage adapter: query | orm (overrides CUSTOMER_STORAGE_BACKEND).
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,
    /// Absolute directory for rolling log files (overrides CUSTOMER_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace | debug | info | warn | error (overrides CUSTOMER_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every customer.
    List,
    /// Show one customer.
    Get { id: CustomerId },
    /// Register a new customer.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        age: i32,
    },
    /// Delete a customer.
    Delete { id: CustomerId },
    /// Change one or more fields of a customer.
    Update {
        id: CustomerId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        age: Option<i32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let repo = open_customer_repository(config.backend, &conn)?;
    let service = CustomerService::new(repo);
    info!(
        "event=cli_start module=cli status=ok backend={}",
        config.backend
    );

    match cli.command {
        Command::List => print_json(&service.get_all_customers()?),
        Command::Get { id } => print_json(&service.get_customer(id)?),
        Command::Register { name, email, age } => {
            let id = service.register_customer(&CustomerRegistration::new(name, email, age))?;
            print_json(&serde_json::json!({ "id": id }))
        }
        Command::Delete { id } => Ok(service.delete_customer(id)?),
        Command::Update {
            id,
            name,
            email,
            age,
        } => Ok(service.update_customer(id, &CustomerPatch { name, email, age })?),
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<CoreConfig> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }
    Ok(config)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err
        .downcast_ref::<CustomerServiceError>()
        .map(CustomerServiceError::kind)
    {
        Some(ErrorKind::NotFound) => 4,
        Some(ErrorKind::Conflict) => 9,
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::Internal) | None => 1,
    }
}
