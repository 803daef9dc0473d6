// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Statistics
//!
//! Assignment counts grouped by reviewer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements `StatisticsRepository`

use async_trait::async_trait;
use sqlx::Row;
use crate::domain::errors::RepositoryError;
use crate::domain::member::MemberId;
use crate::domain::repository::StatisticsRepository;
use crate::domain::statistics::{AssignmentsPerMember, Page};
use crate::infrastructure::db::Database;

pub struct PostgresStatisticsRepository {
    db: Database,
}

impl PostgresStatisticsRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatisticsRepository for PostgresStatisticsRepository {
    async fn assignments_per_member(
        &self,
        page: Page,
    ) -> Result<Vec<AssignmentsPerMember>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT member_id, COUNT(*) AS assignments_count
            FROM assigned_reviewer
            GROUP BY member_id
            ORDER BY assignments_count DESC, member_id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(self.db.get_pool())
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to count assignments: {}", e)))?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in rows {
            stats.push(AssignmentsPerMember {
                member_id: MemberId(row.try_get("member_id")?),
                assignments_count: row.try_get("assignments_count")?,
            });
        }
        Ok(stats)
    }
}
