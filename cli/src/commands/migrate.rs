// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Database Migration Command
//!
//! Implements `reviewer migrate`, applying the schema migrations embedded in
//! `reviewer-core` to the configured PostgreSQL database.
//!
//! # Architecture
//!
//! - **Layer:** CLI/Presentation
//! - **Purpose:** Database schema migration management
//! - **Integration:** CLI → SQLx Migrator → PostgreSQL
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! reviewer migrate
//!
//! # Preview migrations without applying
//! reviewer migrate --dry-run
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use reviewer_core::domain::config::ReviewerConfigManifest;
use reviewer_core::infrastructure::db::{Database, MIGRATOR};
use tracing::{debug, info};

#[derive(Args)]
pub struct MigrateCommand {
    /// List pending migrations without applying them
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: MigrateCommand, config: &ReviewerConfigManifest) -> Result<()> {
    println!("{}", "Reviewer database migration".bold().green());

    let database_url = config.spec.database.url.as_deref().context(
        "No database configured. Set spec.database.url or REVIEWER_DATABASE_URL.",
    )?;

    println!("Connecting to database...");
    let db = Database::new(database_url, &config.spec.database)
        .await
        .context("Failed to connect to database")?;

    // the bookkeeping table does not exist before the first run
    let applied_count = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(db.get_pool())
        .await
        .map(|rows| rows.len())
        .unwrap_or(0);

    let total_migrations = MIGRATOR.iter().count();
    debug!(applied = applied_count, total = total_migrations, "Read migration status");

    println!(
        "Migration status: {} applied, {} total available.",
        applied_count, total_migrations
    );

    if applied_count >= total_migrations {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if cmd.dry_run {
        println!("Pending migrations (dry run):");
        for migration in MIGRATOR.iter().skip(applied_count) {
            println!(" - {} {}", migration.version, migration.description);
        }
        return Ok(());
    }

    info!(pending = total_migrations - applied_count, "Applying pending migrations");
    println!("Applying pending migrations...");
    db.migrate().await.context("Failed to apply migrations")?;
    info!("Migrations applied");
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}
