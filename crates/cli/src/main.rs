//! Order relay CLI - database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the orders table
//! order-cli migrate
//!
//! # Insert one order from a JSON document
//! order-cli seed model.json
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string, or
//! - `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD`, `DBNAME` - assembled into one

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "order-cli")]
#[command(author, version, about = "Order relay CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert one order from a JSON file (line items are not stored)
    Seed {
        /// Path to the order JSON document
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::order(&file).await?,
    }
    Ok(())
}
