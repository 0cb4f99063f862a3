//! Operator CLI for valetd.
//!
//! Subcommands run against a live server through the typed client, except
//! `seed` which opens the local database file directly:
//! - `status` - server health plus a per-site summary
//! - `sessions` - list parking sessions with optional filters
//! - `seed` - reset the local database to the fixture dataset

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::ValetClient;
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "valetd")]
#[command(author, version, about = "Valet parking management server and CLI", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API URL to connect to
    #[arg(long, env = "VALETD_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Authentication token (can also be set via VALETD_TOKEN env var)
    #[arg(long, env = "VALETD_TOKEN")]
    pub token: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show server health and a per-site summary
    Status,

    /// List parking sessions
    Sessions {
        /// Filter by status (parked, in-progress, retrieved)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by site id
        #[arg(long)]
        site_id: Option<String>,
        /// Free-text search on plate number or customer name
        #[arg(long)]
        search: Option<String>,
    },

    /// Reset the local database to the fixture dataset (no server needed)
    Seed,
}

/// Run a CLI subcommand.
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Some(Commands::Status) => cmd_status(cli).await,
        Some(Commands::Sessions {
            status,
            site_id,
            search,
        }) => cmd_sessions(cli, status.as_deref(), site_id.as_deref(), search.as_deref()).await,
        Some(Commands::Seed) => cmd_seed(config).await,
        None => Ok(()),
    }
}

async fn cmd_status(cli: &Cli) -> Result<()> {
    let client = ValetClient::new(&cli.api_url, cli.token.clone())?;

    println!("Connecting to {}...", cli.api_url);
    let health = client
        .health()
        .await
        .context("Failed to connect to server. Is valetd running?")?;

    println!();
    println!("=== valetd Server Status ===");
    println!();
    println!("Status:   [{}] {}", health.status.to_uppercase(), health.message);

    let sites = client.sites().await?;
    if sites.is_empty() {
        println!();
        println!("No sites configured. Run `valetd seed` or POST /api/admin/reset-database.");
        return Ok(());
    }

    println!();
    println!("Sites:");
    for site in &sites {
        let stats = client.site_stats(&site.id).await?;
        println!(
            "  {:<22} {:>3} active, {:>3} today, revenue {:>8.2}",
            site.name, stats.active_cars, stats.total_today, stats.revenue
        );
    }

    Ok(())
}

async fn cmd_sessions(
    cli: &Cli,
    status: Option<&str>,
    site_id: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    let client = ValetClient::new(&cli.api_url, cli.token.clone())?;
    let sessions = client.manager_sessions(status, site_id, search).await?;

    if sessions.is_empty() {
        println!("No sessions found");
        return Ok(());
    }

    println!(
        "{:<28} {:<12} {:<12} {:>8}  {:<20}",
        "TICKET", "PLATE", "STATUS", "AMOUNT", "SITE"
    );
    for session in &sessions {
        let plate = session
            .vehicle
            .as_ref()
            .map(|v| v.vehiclenumber.as_str())
            .unwrap_or("-");
        let site = session
            .site
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("-");
        println!(
            "{:<28} {:<12} {:<12} {:>8.2}  {:<20}",
            session.ticketid, plate, session.status, session.amount, site
        );
    }
    println!();
    println!("{} session(s)", sessions.len());

    Ok(())
}

async fn cmd_seed(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.database.data_dir)?;
    let pool = crate::db::init(&config.database.data_dir).await?;
    let users = crate::db::seeders::reset_and_seed(&pool).await?;

    println!("Database seeded with fixture data");
    println!();
    println!("Test accounts (password: pwd):");
    println!("  user1@test.com   {}", users.user1_id);
    println!("  user2@test.com   {}", users.user2_id);
    println!("  user3@test.com   {}", users.user3_id);
    println!("  user4@test.com   {}", users.user4_id);
    println!("  driver1@test.com {}", users.driver1_id);
    println!("  driver2@test.com {}", users.driver2_id);
    println!("  driver3@test.com {}", users.driver3_id);

    Ok(())
}
