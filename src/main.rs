//! carledger main entry point

use anyhow::{bail, Context};
use carledger_api::start_server;
use carledger_client::{CarClient, Dashboard, OpState};
use carledger_config::{Config, ConfigError};
use carledger_core::{Car, HolderChange, LedgerRef, MemoryLedger};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "carledger")]
#[command(version = "0.1.0")]
#[command(about = "Car-record ledger service and command-line client", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// List every car, sorted by numeric id
    Cars,
    /// Look up one car
    Car { id: String },
    /// Record a car, replacing any record under the same id
    Add {
        id: String,
        model: String,
        make: String,
        owner: String,
        color: String,
    },
    /// Hand a car over to a new holder
    Transfer { id: String, name: String },
    /// Show the writes applied to one car
    History { id: String },
    /// Print the default configuration file
    PrintConfig,
}

/// Load the config file; a missing file falls back to defaults
fn load_config(path: &Path) -> anyhow::Result<(Config, bool)> {
    match Config::load(path) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), false)),
        Err(e) => {
            let details = e.to_details();
            for suggestion in &details.suggestions {
                eprintln!("hint: {}", suggestion);
            }
            Err(e).with_context(|| format!("failed to load {}", path.display()))
        }
    }
}

fn init_logging(config: &Config) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    env_logger::Builder::from_env(env).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let command = args.command.unwrap_or(Command::Serve);
    if let Command::PrintConfig = command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, found) = load_config(&args.config)?;
    init_logging(&config);
    if found {
        log::info!("Config loaded from {}", args.config.display());
    } else {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(run(command, config))
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    if let Command::Serve = command {
        let ledger = MemoryLedger::open(&config.ledger)
            .await
            .context("failed to open ledger")?;
        log::info!("Ledger ready with {} cars", ledger.len().await);
        let ledger: LedgerRef = Arc::new(ledger);
        start_server(config, ledger).await?;
        return Ok(());
    }

    let client = CarClient::from_config(&config.client)?;
    log::debug!("Talking to {}", client.base_url());

    match command {
        Command::Cars => {
            let dashboard = Dashboard::new(client);
            let cars = success(dashboard.load_all_cars().await)?;
            if cars.is_empty() {
                println!("No cars recorded");
            }
            for car in &cars {
                print_car(car);
            }
        }
        Command::Car { id } => {
            let dashboard = Dashboard::new(client);
            print_car(&success(dashboard.lookup_car(&id).await)?);
        }
        Command::Add { id, model, make, owner, color } => {
            let dashboard = Dashboard::new(client);
            let car = Car::new(id, model, make, owner, color);
            print_car(&success(dashboard.record_car(&car).await)?);
        }
        Command::Transfer { id, name } => {
            let dashboard = Dashboard::new(client);
            let car = success(dashboard.transfer(&HolderChange::new(id, name)).await)?;
            println!("Holder changed");
            print_car(&car);
        }
        Command::History { id } => {
            for entry in client.history(&id).await? {
                println!(
                    "#{:<4} {:<8} {}  owner={}",
                    entry.seq,
                    entry.kind.to_string(),
                    entry.at.format("%Y-%m-%d %H:%M:%S"),
                    entry.car.owner
                );
            }
        }
        Command::Serve | Command::PrintConfig => {}
    }

    Ok(())
}

/// Final state of a finished dashboard call; only `Success` and `Error` come back
fn success<T>(state: OpState<T>) -> anyhow::Result<T> {
    match state {
        OpState::Success(value) => Ok(value),
        OpState::Error(message) => bail!("{}", message),
        OpState::Idle | OpState::Pending => bail!("operation ended without a result"),
    }
}

fn print_car(car: &Car) {
    println!(
        "{:<6} {:<12} {:<12} {:<16} {}",
        car.id, car.model, car.make, car.owner, car.color
    );
}
