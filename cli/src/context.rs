// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service wiring
//!
//! Builds the application services for one CLI invocation from the loaded
//! configuration manifest.

use std::sync::Arc;
use anyhow::{Context, Result};
use reviewer_core::application::repository_factory::{
    create_member_repository, create_pull_request_repository, create_statistics_repository,
    create_team_repository,
};
use reviewer_core::application::{
    MemberService, PullRequestService, StandardMemberService, StandardPullRequestService,
    StandardStatisticsService, StandardTeamService, StatisticsService, StorageHandle, TeamService,
};
use reviewer_core::domain::assignment::ReviewerPicker;
use reviewer_core::domain::config::ReviewerConfigManifest;
use tracing::{debug, info};

pub struct AppContext {
    pub pull_requests: Arc<dyn PullRequestService>,
    pub teams: Arc<dyn TeamService>,
    pub members: Arc<dyn MemberService>,
    pub statistics: Arc<dyn StatisticsService>,
}

impl AppContext {
    /// Validate the manifest, open storage and wire every service to it.
    /// `seed` makes reviewer selection reproducible.
    pub async fn build(config: &ReviewerConfigManifest, seed: Option<u64>) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        info!(config = %config.metadata.name, "Building services");

        let storage = StorageHandle::open(&config.storage_backend(), &config.spec.database)
            .await
            .context("Failed to open storage")?;

        Ok(Self::from_storage(&storage, config, seed))
    }

    pub fn from_storage(
        storage: &StorageHandle,
        config: &ReviewerConfigManifest,
        seed: Option<u64>,
    ) -> Self {
        let picker = Arc::new(match seed {
            Some(seed) => {
                debug!(seed, "Using seeded reviewer selection");
                ReviewerPicker::seeded(seed)
            }
            None => ReviewerPicker::from_entropy(),
        });

        Self {
            pull_requests: Arc::new(StandardPullRequestService::new(
                create_pull_request_repository(storage),
                config.spec.pull_requests.clone(),
                picker,
            )),
            teams: Arc::new(StandardTeamService::new(create_team_repository(storage))),
            members: Arc::new(StandardMemberService::new(create_member_repository(storage))),
            statistics: Arc::new(StandardStatisticsService::new(
                create_statistics_repository(storage),
                config.spec.statistics.clone(),
            )),
        }
    }
}
