// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Connection Pool
//!
//! Wraps `sqlx::postgres::PgPool` together with the isolation level every
//! mutating unit of work runs under. Executors start their transactions
//! through [`Database::begin`] so the level is always declared explicitly
//! instead of inheriting the server default (read committed).

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use crate::domain::config::{DatabaseConfig, IsolationLevel};
use crate::domain::errors::RepositoryError;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    isolation: IsolationLevel,
}

impl Database {
    pub async fn new(connection_string: &str, config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(connection_string)
            .await?;

        Ok(Self::from_pool(pool, config.isolation))
    }

    pub fn from_pool(pool: PgPool, isolation: IsolationLevel) -> Self {
        Self { pool, isolation }
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Begin a transaction at the configured isolation level.
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub async fn begin(&self, operation: &str) -> Result<Transaction<'static, Postgres>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::Database(format!("failed to begin tx while {}: {}", operation, e))
        })?;

        let statement = format!("SET TRANSACTION ISOLATION LEVEL {}", self.isolation.as_sql());
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::Database(format!(
                    "failed to set isolation level while {}: {}",
                    operation, e
                ))
            })?;

        Ok(tx)
    }

    pub async fn commit(tx: Transaction<'static, Postgres>, operation: &str) -> Result<(), RepositoryError> {
        tx.commit().await.map_err(|e| {
            RepositoryError::Database(format!("failed to commit tx while {}: {}", operation, e))
        })
    }
}
