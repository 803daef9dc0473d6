// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Team Application Service
//!
//! Team reconciliation, lookup and bulk deactivation.

use std::collections::HashSet;
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use crate::domain::assignment::roster_matches;
use crate::domain::errors::{ErrorKind, TeamError};
use crate::domain::member::{Member, MemberActivity, MemberId};
use crate::domain::repository::{TeamMatcher, TeamRepository};
use crate::domain::team::Team;

#[async_trait]
pub trait TeamService: Send + Sync {
    /// Reconcile the named team with `members`. Creates the team on first use.
    async fn upsert_team(&self, name: String, members: Vec<Member>) -> Result<Team, TeamError>;

    async fn get_team(&self, name: &str) -> Result<Team, TeamError>;

    /// Mark every current member inactive. Existing reviewer assignments stay.
    async fn deactivate_all(&self, name: &str) -> Result<Team, TeamError>;
}

pub struct StandardTeamService {
    repository: Arc<dyn TeamRepository>,
}

impl StandardTeamService {
    pub fn new(repository: Arc<dyn TeamRepository>) -> Self {
        Self { repository }
    }
}

fn validate_roster(name: &str, members: &[Member]) -> Result<(), TeamError> {
    if name.trim().is_empty() {
        return Err(TeamError::InvalidInput("team_name must not be empty".to_string()));
    }

    let mut seen = HashSet::new();
    for member in members {
        if member.id.as_str().trim().is_empty() {
            return Err(TeamError::InvalidInput("user_id must not be empty".to_string()));
        }
        if member.username.trim().is_empty() {
            return Err(TeamError::InvalidInput(format!(
                "username of {} must not be empty",
                member.id
            )));
        }
        if !seen.insert(&member.id) {
            return Err(TeamError::InvalidInput(format!(
                "user {} listed more than once",
                member.id
            )));
        }
    }
    Ok(())
}

fn log_failure(operation: &str, team: &str, err: &TeamError) {
    match err.kind() {
        ErrorKind::Internal => error!(operation, team, error = %err, "Team operation failed"),
        _ => warn!(operation, team, code = err.code(), error = %err, "Team operation rejected"),
    }
}

#[async_trait]
impl TeamService for StandardTeamService {
    async fn upsert_team(&self, name: String, members: Vec<Member>) -> Result<Team, TeamError> {
        validate_roster(&name, &members)?;

        let target = Team::new(name.clone(), members);
        let target_ids = target.member_ids();

        // roster seen by the matcher, for the added/removed counts below
        let previous: Arc<Mutex<Option<HashSet<MemberId>>>> = Arc::new(Mutex::new(None));
        let observed = previous.clone();
        let matcher: TeamMatcher = Box::new(move |current| {
            *observed.lock() = Some(current.member_ids());
            roster_matches(&target_ids, current)
        });

        let team = self
            .repository
            .upsert(target, matcher)
            .await
            .inspect_err(|e| log_failure("upsert", &name, e))?;

        let previous = previous.lock().take().unwrap_or_default();
        let current = team.member_ids();
        info!(
            team = %team.name,
            members = team.members.len(),
            added = current.difference(&previous).count(),
            removed = previous.difference(&current).count(),
            "Team reconciled"
        );
        Ok(team)
    }

    async fn get_team(&self, name: &str) -> Result<Team, TeamError> {
        debug!(team = name, "Getting team");
        self.repository
            .find_by_name(name)
            .await
            .inspect_err(|e| log_failure("get", name, e))?
            .ok_or_else(|| TeamError::NotFound(name.to_string()))
    }

    async fn deactivate_all(&self, name: &str) -> Result<Team, TeamError> {
        if name.trim().is_empty() {
            return Err(TeamError::InvalidInput("team_name must not be empty".to_string()));
        }

        let team = self
            .repository
            .set_activity_for_all(name, MemberActivity::Inactive)
            .await
            .inspect_err(|e| log_failure("deactivate", name, e))?;

        info!(team = %team.name, members = team.members.len(), "Team members deactivated");
        Ok(team)
    }
}
