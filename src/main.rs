//! Bank deployer CLI
//!
//! Command-line interface for deploying the Bank contract and calling it.

use alloy::primitives::{Address, U256};
use bank_deployer::contract::{self, artifact};
use bank_deployer::step::parse_amount;
use bank_deployer::wallet::Credentials;
use bank_deployer::{Config, Result, RpcConfig, Runner, Step};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bank-deployer")]
#[command(about = "Deploy the Bank contract and call its methods")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Node JSON-RPC URL (overrides config file and RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the contract and run the configured step sequence
    Run {
        /// Contract bytecode artifact (overrides config)
        #[arg(short, long)]
        artifact: Option<PathBuf>,

        /// Comma-separated steps, e.g. "admin,balance,deposit 2 ether"
        #[arg(short, long, value_delimiter = ',')]
        steps: Option<Vec<Step>>,
    },

    /// Deploy the contract only
    Deploy {
        /// Contract bytecode artifact (overrides config)
        #[arg(short, long)]
        artifact: Option<PathBuf>,
    },

    /// Read the admin address of a deployed contract
    Admin {
        /// Deployed contract address
        #[arg(long)]
        contract: Address,
    },

    /// Read the balance of a deployed contract
    Balance {
        /// Deployed contract address
        #[arg(long)]
        contract: Address,
    },

    /// Deposit into a deployed contract
    Deposit {
        /// Deployed contract address
        #[arg(long)]
        contract: Address,

        /// Amount in wei, or with a unit ("2 ether", "5 gwei")
        #[arg(long, value_parser = amount_arg)]
        amount: U256,
    },

    /// Withdraw from a deployed contract
    Withdraw {
        /// Deployed contract address
        #[arg(long)]
        contract: Address,

        /// Amount in wei, or with a unit ("1 ether")
        #[arg(long, value_parser = amount_arg)]
        amount: U256,
    },

    /// Print the address derived from the signing key (no network access)
    Address,

    /// Show the effective configuration
    Config,
}

fn amount_arg(s: &str) -> std::result::Result<U256, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for results
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(
            cli.json_logs
                .then(|| fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with((!cli.json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.kind(), "Aborting");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let rpc = RpcConfig::resolve(cli.rpc_url.as_deref(), config.rpc_url.as_deref())?;

    match cli.command {
        Commands::Run { artifact, steps } => {
            let mut config = config;
            if let Some(path) = artifact {
                config.artifact_path = path;
            }
            if let Some(steps) = steps {
                config.sequence = steps;
            }
            let runner = signing_runner(config, rpc)?;
            runner.run().await?;
        }
        Commands::Deploy { artifact } => {
            let mut config = config;
            if let Some(path) = artifact {
                config.artifact_path = path;
            }
            run_deploy(signing_runner(config, rpc)?).await?;
        }
        Commands::Admin { contract } => {
            run_step(Runner::new(config, rpc), contract, Step::Admin).await?;
        }
        Commands::Balance { contract } => {
            run_step(Runner::new(config, rpc), contract, Step::Balance).await?;
        }
        Commands::Deposit { contract, amount } => {
            run_step(signing_runner(config, rpc)?, contract, Step::Deposit(amount)).await?;
        }
        Commands::Withdraw { contract, amount } => {
            run_step(signing_runner(config, rpc)?, contract, Step::Withdraw(amount)).await?;
        }
        Commands::Address => {
            let credentials = Credentials::from_env(&config.key_env)?;
            println!("{}", credentials.address_string());
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Runner with credentials loaded from the configured environment variable
fn signing_runner(config: Config, rpc: RpcConfig) -> Result<Runner> {
    let credentials = Credentials::from_env(&config.key_env)?;
    tracing::info!(address = %credentials.address(), "Loaded signing key");
    Ok(Runner::new(config, rpc).with_credentials(credentials))
}

async fn run_deploy(runner: Runner) -> Result<()> {
    let bytecode = artifact::load_bytecode(&runner.config().artifact_path)?;
    let provider = runner.connect();

    let deployment = runner.deploy(&provider, &bytecode).await?;

    println!("{}", deployment.address.to_checksum(None));
    println!("{}", serde_json::to_string(&deployment.transaction)?);
    Ok(())
}

async fn run_step(runner: Runner, address: Address, step: Step) -> Result<()> {
    tracing::info!(contract = %address, step = %step, "Calling contract");

    let contract = contract::attach(address, runner.connect());
    let result = runner.execute_step(&contract, &step).await?;

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
