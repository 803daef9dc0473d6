// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared fixtures: every service wired to one in-memory store with a
//! seeded reviewer picker.

#![allow(dead_code)]

use std::sync::Arc;
use reviewer_core::application::repository_factory::{
    create_member_repository, create_pull_request_repository, create_statistics_repository,
    create_team_repository,
};
use reviewer_core::application::{
    StandardMemberService, StandardPullRequestService, StandardStatisticsService,
    StandardTeamService, StorageHandle, TeamService,
};
use reviewer_core::domain::assignment::ReviewerPicker;
use reviewer_core::domain::config::{PullRequestSettings, StatisticsSettings};
use reviewer_core::domain::member::{Member, MemberActivity};
use reviewer_core::domain::team::Team;
use reviewer_core::infrastructure::repositories::InMemoryStore;

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub pull_requests: StandardPullRequestService,
    pub teams: StandardTeamService,
    pub members: StandardMemberService,
    pub statistics: StandardStatisticsService,
}

impl Harness {
    pub fn new(seed: u64) -> Self {
        Self::with_settings(
            seed,
            PullRequestSettings {
                target_reviewers_count: 2,
                out_limit: 10,
            },
            StatisticsSettings { max_page_size: 100 },
        )
    }

    pub fn with_settings(seed: u64, pr: PullRequestSettings, stats: StatisticsSettings) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let storage = StorageHandle::InMemory(store.clone());
        let picker = Arc::new(ReviewerPicker::seeded(seed));

        Self {
            store,
            pull_requests: StandardPullRequestService::new(
                create_pull_request_repository(&storage),
                pr,
                picker,
            ),
            teams: StandardTeamService::new(create_team_repository(&storage)),
            members: StandardMemberService::new(create_member_repository(&storage)),
            statistics: StandardStatisticsService::new(create_statistics_repository(&storage), stats),
        }
    }

    /// Reconcile `name` with the given (id, active) roster
    pub async fn team(&self, name: &str, roster: &[(&str, bool)]) -> Team {
        let members = roster.iter().map(|(id, active)| member(id, *active)).collect();
        self.teams
            .upsert_team(name.to_string(), members)
            .await
            .expect("team reconciliation")
    }
}

pub fn member(id: &str, active: bool) -> Member {
    Member::new(id, format!("user-{}", id), MemberActivity::from_flag(active))
}
