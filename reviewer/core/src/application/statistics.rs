// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Statistics Application Service
//!
//! Read-only assignment counts per reviewer.

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, error};
use crate::domain::config::StatisticsSettings;
use crate::domain::errors::StatisticsError;
use crate::domain::repository::StatisticsRepository;
use crate::domain::statistics::{AssignmentsPerMember, Page};

#[async_trait]
pub trait StatisticsService: Send + Sync {
    /// Assignment counts, highest first, ties by member id
    async fn assignments_per_member(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<AssignmentsPerMember>, StatisticsError>;
}

pub struct StandardStatisticsService {
    repository: Arc<dyn StatisticsRepository>,
    settings: StatisticsSettings,
}

impl StandardStatisticsService {
    pub fn new(repository: Arc<dyn StatisticsRepository>, settings: StatisticsSettings) -> Self {
        Self { repository, settings }
    }
}

#[async_trait]
impl StatisticsService for StandardStatisticsService {
    async fn assignments_per_member(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<AssignmentsPerMember>, StatisticsError> {
        if limit == 0 {
            return Err(StatisticsError::InvalidInput("limit must be at least 1".to_string()));
        }

        let page = Page {
            limit: limit.min(self.settings.max_page_size),
            offset,
        };

        let stats = self.repository.assignments_per_member(page).await.map_err(|e| {
            error!(error = %e, "Failed to count assignments");
            StatisticsError::from(e)
        })?;

        debug!(limit = page.limit, offset, rows = stats.len(), "Counted assignments per member");
        Ok(stats)
    }
}
