// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on the storage backend
//! configuration, keeping the domain layer free of infrastructure types.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Select in-memory or PostgreSQL executors at startup

use std::sync::Arc;
use anyhow::{Context, Result};
use tracing::info;
use crate::domain::config::DatabaseConfig;
use crate::domain::repository::{
    MemberRepository, PullRequestRepository, StatisticsRepository, StorageBackend, TeamRepository,
};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres_member::PostgresMemberRepository;
use crate::infrastructure::repositories::postgres_pull_request::PostgresPullRequestRepository;
use crate::infrastructure::repositories::postgres_statistics::PostgresStatisticsRepository;
use crate::infrastructure::repositories::postgres_team::PostgresTeamRepository;
use crate::infrastructure::repositories::{
    InMemoryMemberRepository, InMemoryPullRequestRepository, InMemoryStatisticsRepository,
    InMemoryStore, InMemoryTeamRepository,
};

/// Opened storage shared by every repository of one process
#[derive(Clone)]
pub enum StorageHandle {
    InMemory(Arc<InMemoryStore>),
    PostgreSQL(Database),
}

impl StorageHandle {
    /// Open the configured backend. PostgreSQL connections are established eagerly.
    pub async fn open(backend: &StorageBackend, config: &DatabaseConfig) -> Result<Self> {
        match backend {
            StorageBackend::InMemory => {
                info!("Using in-memory storage backend");
                Ok(Self::InMemory(Arc::new(InMemoryStore::new())))
            }
            StorageBackend::PostgreSQL(pg) => {
                let db = Database::new(&pg.connection_string, config)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                info!(isolation = db.isolation().as_sql(), "Using PostgreSQL storage backend");
                Ok(Self::PostgreSQL(db))
            }
        }
    }
}

/// Creates a PullRequestRepository implementation for the opened backend
pub fn create_pull_request_repository(storage: &StorageHandle) -> Arc<dyn PullRequestRepository> {
    match storage {
        StorageHandle::InMemory(store) => Arc::new(InMemoryPullRequestRepository::new(store.clone())),
        StorageHandle::PostgreSQL(db) => Arc::new(PostgresPullRequestRepository::new(db.clone())),
    }
}

/// Creates a TeamRepository implementation for the opened backend
pub fn create_team_repository(storage: &StorageHandle) -> Arc<dyn TeamRepository> {
    match storage {
        StorageHandle::InMemory(store) => Arc::new(InMemoryTeamRepository::new(store.clone())),
        StorageHandle::PostgreSQL(db) => Arc::new(PostgresTeamRepository::new(db.clone())),
    }
}

/// Creates a MemberRepository implementation for the opened backend
pub fn create_member_repository(storage: &StorageHandle) -> Arc<dyn MemberRepository> {
    match storage {
        StorageHandle::InMemory(store) => Arc::new(InMemoryMemberRepository::new(store.clone())),
        StorageHandle::PostgreSQL(db) => Arc::new(PostgresMemberRepository::new(db.clone())),
    }
}

/// Creates a StatisticsRepository implementation for the opened backend
pub fn create_statistics_repository(storage: &StorageHandle) -> Arc<dyn StatisticsRepository> {
    match storage {
        StorageHandle::InMemory(store) => Arc::new(InMemoryStatisticsRepository::new(store.clone())),
        StorageHandle::PostgreSQL(db) => Arc::new(PostgresStatisticsRepository::new(db.clone())),
    }
}
