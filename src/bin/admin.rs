//! CLI administration tool for tinylink.
//!
//! Provides commands for inspecting users and links, revoking sessions and
//! performing database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List users with their link counts
//! cargo run --bin admin -- users list
//!
//! # Sign a user out everywhere (clears their refresh token)
//! cargo run --bin admin -- users revoke alice@example.com
//!
//! # List all links with click counts
//! cargo run --bin admin -- links list
//!
//! # View totals
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use tinylink::domain::entities::normalize_email;
use tinylink::domain::repositories::{LinkRepository, UserRepository};
use tinylink::infrastructure::persistence::{PgLinkRepository, PgUserRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing tinylink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Inspect short links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,

    /// Revoke a user's session
    Revoke {
        /// Email of the user
        email: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// List all links
    List,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Users { action } => handle_user_action(action, &pool).await?,
        Commands::Links { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::List => list_users(&repo).await,
        UserAction::Revoke { email, yes } => revoke_session(&repo, &email, yes).await,
    }
}

async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let repo = PgLinkRepository::new(Arc::new(pool.clone()));

    match action {
        LinkAction::List => list_links(&repo).await,
    }
}

/// Lists users, newest first.
///
/// # Output Format
///
/// ```text
/// 👥 Users
///
///   ID  User name         Email                          Created           Links
///   ──────────────────────────────────────────────────────────────────────────────
///   2   alice             alice@example.com              2024-01-16 14:20  3
/// ```
async fn list_users(repo: &PgUserRepository) -> Result<()> {
    println!("{}", "👥 Users".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<17} {:<30} {:<17} {}",
        "ID".bright_white().bold(),
        "User name".bright_white().bold(),
        "Email".bright_white().bold(),
        "Created".bright_white().bold(),
        "Links".bright_white().bold()
    );
    println!("  {}", "─".repeat(78).bright_black());

    for user in &users {
        println!(
            "  {:<5} {:<17} {:<30} {:<17} {}",
            user.id.to_string().bright_black(),
            user.user_name.cyan(),
            user.email,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            user.link_count
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Clears a user's stored refresh digest.
///
/// Their current access token stays valid until it expires; no new one can
/// be obtained with the old refresh token.
async fn revoke_session(repo: &PgUserRepository, email: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔒 Revoke Session".bright_blue().bold());
    println!();

    let user = repo
        .find_by_email(&normalize_email(email))
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    if !user.has_session() {
        println!("{}", "⚠️  This user has no active session".yellow());
        return Ok(());
    }

    println!("  User:  {}", user.user_name.cyan());
    println!("  Email: {}", user.email);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Revoke this user's session?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.save_session(&user.end_session())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke session: {}", e))?;

    println!();
    println!("{}", "✅ Session revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Lists links, newest first, with owner and click count.
async fn list_links(repo: &PgLinkRepository) -> Result<()> {
    println!("{}", "🔗 Links".bright_blue().bold());
    println!();

    let links = repo
        .list_all()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<31} {:<8} {:<20} {}",
        "Short ID".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(78).bright_black());

    for link in &links {
        let owner = link.owner_name.as_deref().unwrap_or("-");

        println!(
            "  {:<31} {:<8} {:<20} {}",
            link.summary.short_id.cyan(),
            link.summary.click_count.to_string().bright_green(),
            owner,
            link.summary.original_url.bright_black()
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of users
/// - Total number of links
/// - Total number of clicks
/// - Users with an active session
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool)
        .await?;

    let sessions_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE refresh_token_hash IS NOT NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Users:           {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Links:           {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:          {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!(
        "  Active sessions: {}",
        sessions_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
            )
            .fetch_one(pool)
            .await
            .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
