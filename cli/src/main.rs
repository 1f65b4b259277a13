//! Spotlend CLI - quote swaps and replay lending-market scenarios
//!
//! Drives an in-memory market: one constant product pool, one lending pool
//! that prices collateral off it, and a set of funded accounts.

use clap::{Parser, Subcommand};
use colored::Colorize;
use spotlend::{parse_amount, Amount, Asset};

mod attack;
mod config;
mod quote;
mod report;
mod scenario;

#[derive(Parser)]
#[command(name = "spotlend")]
#[command(about = "Spot-price lending market simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output (debug logging of every state change)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a swap against a pool with the given reserves
    Quote {
        /// Native reserve (decimal, e.g. 1)
        #[arg(long, value_parser = amount_arg)]
        native: Amount,

        /// Token reserve (decimal, e.g. 3000)
        #[arg(long, value_parser = amount_arg)]
        token: Amount,

        /// Asset sent in (native or token)
        #[arg(long, default_value = "native", value_parser = asset_arg)]
        asset_in: Asset,

        /// Amount sent in (decimal, e.g. 0.01)
        #[arg(value_parser = amount_arg)]
        amount: Amount,
    },

    /// Run every sequence in a scenario file against a fresh market
    Run {
        /// Path to the scenario TOML file
        scenario: String,

        /// Print a JSON report instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Replay the spot-price oracle manipulation
    Attack {
        /// Submit each step as its own sequence
        #[arg(long)]
        split: bool,

        /// Native funding the attacker starts with in split mode
        #[arg(long, default_value = "0.1", value_parser = amount_arg)]
        seed: Amount,

        /// Flash-loaned native amount swapped into the pool
        #[arg(long, default_value = "2", value_parser = amount_arg)]
        flash: Amount,
    },
}

fn amount_arg(text: &str) -> Result<Amount, String> {
    parse_amount(text).map_err(|e| e.to_string())
}

fn asset_arg(text: &str) -> Result<Asset, String> {
    match text {
        "native" => Ok(Asset::Native),
        "token" => Ok(Asset::Token),
        other => Err(format!("unknown asset {:?} (use native or token)", other)),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    match cli.command {
        Commands::Quote {
            native,
            token,
            asset_in,
            amount,
        } => {
            quote::show_quote(native, token, asset_in, amount)?;
        }
        Commands::Run { scenario, json } => {
            scenario::run_scenario(&scenario, json)?;
        }
        Commands::Attack { split, seed, flash } => {
            attack::run_attack(split, seed, flash)?;
        }
    }

    if cli.verbose {
        println!("\n{}", "Done".dimmed());
    }

    Ok(())
}
