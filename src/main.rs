//! Portfolio Hub - API Server
//!
//! Serves the portfolio content API and broadcasts content changes to open
//! site contexts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portfolio_hub::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio API server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (overrides config.yaml and SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides config.yaml and SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Path to the YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a bcrypt hash for use as `auth.admin.password_hash`
    HashPassword {
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,portfolio_hub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, config } => {
            let mut config = Config::from_yaml_and_env(config.as_deref())?;
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            portfolio_hub::start_server(config).await
        }
        Commands::HashPassword { password } => {
            let hash = bcrypt::hash(password, portfolio_hub::auth::BCRYPT_COST)
                .context("Failed to hash password")?;
            println!("{}", hash);
            Ok(())
        }
    }
}
