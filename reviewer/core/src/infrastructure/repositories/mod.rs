// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the transactional executors defined in
//! the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve teams, members and pull requests
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresPullRequestRepository** - create / merge / reassign units of work
//! - **PostgresTeamRepository** - team reconciliation and bulk deactivation
//! - **PostgresMemberRepository** - member activity
//! - **PostgresStatisticsRepository** - assignment counts
//!
//! ## In-Memory Repositories
//!
//! All four in-memory repositories share one [`InMemoryStore`], because a
//! team reconciliation cascades into pull request reviewer rows. A unit of
//! work runs against a cloned working copy of the tables which replaces the
//! committed state only when the closure succeeds, so units are serializable
//! and a failed unit leaves no trace.

pub mod postgres_pull_request;
pub mod postgres_team;
pub mod postgres_member;
pub mod postgres_statistics;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use crate::domain::errors::{MemberError, PullRequestError, RepositoryError, TeamError};
use crate::domain::member::{Member, MemberActivity, MemberId};
use crate::domain::pull_request::{PullRequest, PullRequestId, PullRequestStatus};
use crate::domain::repository::{
    AssignReviewers, MemberRepository, MergeTransition, PullRequestRepository, ReassignReviewer,
    StatisticsRepository, TeamMatcher, TeamRepository,
};
use crate::domain::statistics::{AssignmentsPerMember, Page};
use crate::domain::team::{Team, TeamId};

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub id: TeamId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub id: MemberId,
    pub username: String,
    pub activity: MemberActivity,
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRow {
    pub id: PullRequestId,
    pub name: String,
    pub author_id: MemberId,
    pub team_id: TeamId,
    pub status: PullRequestStatus,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedReviewerRow {
    pub pr_id: PullRequestId,
    pub member_id: MemberId,
    pub slot: i16,
}

/// Reviewer position as stored in `assigned_reviewer.slot` (SMALLINT)
pub(crate) fn slot_index(position: usize) -> Result<i16, RepositoryError> {
    i16::try_from(position).map_err(|_| {
        RepositoryError::Serialization(format!("reviewer slot {} exceeds SMALLINT range", position))
    })
}

/// The tables of the in-memory backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub teams: BTreeMap<TeamId, TeamRow>,
    pub members: BTreeMap<MemberId, MemberRow>,
    pub pull_requests: BTreeMap<PullRequestId, PullRequestRow>,
    pub assigned_reviewers: Vec<AssignedReviewerRow>,
}

impl StoreState {
    fn team_by_name(&self, name: &str) -> Option<&TeamRow> {
        self.teams.values().find(|t| t.name == name)
    }

    fn to_member(&self, row: &MemberRow) -> Member {
        Member {
            id: row.id.clone(),
            username: row.username.clone(),
            activity: row.activity,
            team_id: row.team_id,
            team_name: row
                .team_id
                .and_then(|id| self.teams.get(&id))
                .map(|t| t.name.clone()),
        }
    }

    fn roster(&self, team_id: TeamId) -> Vec<Member> {
        self.members
            .values()
            .filter(|m| m.team_id == Some(team_id))
            .map(|m| self.to_member(m))
            .collect()
    }

    fn team(&self, row: &TeamRow) -> Team {
        Team {
            id: row.id,
            name: row.name.clone(),
            members: self.roster(row.id),
        }
    }

    fn reviewers_of(&self, pr_id: &PullRequestId) -> Vec<MemberId> {
        let mut rows: Vec<&AssignedReviewerRow> = self
            .assigned_reviewers
            .iter()
            .filter(|r| &r.pr_id == pr_id)
            .collect();
        rows.sort_by_key(|r| r.slot);
        rows.into_iter().map(|r| r.member_id.clone()).collect()
    }

    fn pull_request(&self, id: &PullRequestId) -> Option<PullRequest> {
        self.pull_requests.get(id).map(|row| PullRequest {
            id: row.id.clone(),
            name: row.name.clone(),
            author_id: row.author_id.clone(),
            status: row.status,
            created_at: row.created_at,
            merged_at: row.merged_at,
            reviewers: self.reviewers_of(id),
        })
    }

    /// Detach members from their team and drop them from every open pull
    /// request they review. Merged pull requests are left untouched.
    fn detach_members(&mut self, ids: &HashSet<MemberId>) {
        let open: HashSet<&PullRequestId> = self
            .pull_requests
            .values()
            .filter(|pr| pr.status == PullRequestStatus::Open)
            .map(|pr| &pr.id)
            .collect();

        self.assigned_reviewers
            .retain(|r| !(ids.contains(&r.member_id) && open.contains(&r.pr_id)));

        for id in ids {
            if let Some(member) = self.members.get_mut(id) {
                member.team_id = None;
            }
        }
    }
}

struct Committed {
    state: StoreState,
    revision: u64,
}

/// Shared table storage for the in-memory repositories
pub struct InMemoryStore {
    committed: Mutex<Committed>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            committed: Mutex::new(Committed {
                state: StoreState::default(),
                revision: 0,
            }),
        }
    }

    /// Number of committed units of work that changed at least one row
    pub fn revision(&self) -> u64 {
        self.committed.lock().revision
    }

    /// Copy of the committed tables
    pub fn snapshot(&self) -> StoreState {
        self.committed.lock().state.clone()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let committed = self.committed.lock();
        f(&committed.state)
    }

    /// Run one unit of work. The working copy replaces the committed state
    /// only when `f` succeeds and actually changed something.
    fn transact<T, E>(&self, f: impl FnOnce(&mut StoreState) -> Result<T, E>) -> Result<T, E> {
        let mut committed = self.committed.lock();
        let mut working = committed.state.clone();
        let out = f(&mut working)?;
        if working != committed.state {
            committed.state = working;
            committed.revision += 1;
        }
        Ok(out)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Pull Requests
// ============================================================================

#[derive(Clone)]
pub struct InMemoryPullRequestRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPullRequestRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PullRequestRepository for InMemoryPullRequestRepository {
    async fn find_by_reviewer(
        &self,
        reviewer_id: &MemberId,
        limit: usize,
    ) -> Result<Vec<PullRequest>, PullRequestError> {
        Ok(self.store.read(|state| {
            let mut prs: Vec<PullRequest> = state
                .assigned_reviewers
                .iter()
                .filter(|r| &r.member_id == reviewer_id)
                .filter_map(|r| state.pull_request(&r.pr_id))
                .collect();
            prs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            prs.truncate(limit);
            prs
        }))
    }

    async fn find_by_id(&self, id: &PullRequestId) -> Result<Option<PullRequest>, PullRequestError> {
        Ok(self.store.read(|state| state.pull_request(id)))
    }

    async fn create(
        &self,
        mut pr: PullRequest,
        assign: AssignReviewers,
    ) -> Result<PullRequest, PullRequestError> {
        self.store.transact(|state| {
            if state.pull_requests.contains_key(&pr.id) {
                return Err(PullRequestError::AlreadyExists(pr.id.clone()));
            }

            let team_id = state
                .members
                .get(&pr.author_id)
                .and_then(|author| author.team_id)
                .ok_or_else(|| PullRequestError::TeamOrUserNotFound(pr.author_id.clone()))?;

            let roster = state.roster(team_id);
            let reviewers = assign(&pr.author_id, &roster);

            state.pull_requests.insert(
                pr.id.clone(),
                PullRequestRow {
                    id: pr.id.clone(),
                    name: pr.name.clone(),
                    author_id: pr.author_id.clone(),
                    team_id,
                    status: pr.status,
                    created_at: pr.created_at,
                    merged_at: pr.merged_at,
                },
            );

            for (slot, reviewer) in reviewers.iter().enumerate() {
                state.assigned_reviewers.push(AssignedReviewerRow {
                    pr_id: pr.id.clone(),
                    member_id: reviewer.clone(),
                    slot: slot_index(slot)?,
                });
            }

            pr.reviewers = reviewers;
            Ok(pr)
        })
    }

    async fn update_status(
        &self,
        id: &PullRequestId,
        transition: MergeTransition,
    ) -> Result<PullRequest, PullRequestError> {
        self.store.transact(|state| {
            let current = state
                .pull_request(id)
                .ok_or_else(|| PullRequestError::NotFound(id.clone()))?;

            let (updated, changed) = transition(current);

            if changed {
                let row = state
                    .pull_requests
                    .get_mut(id)
                    .ok_or_else(|| PullRequestError::NotFound(id.clone()))?;
                row.status = updated.status;
                row.merged_at = updated.merged_at;
            }

            Ok(updated)
        })
    }

    async fn reassign(
        &self,
        id: &PullRequestId,
        old_reviewer_id: &MemberId,
        reassign: ReassignReviewer,
    ) -> Result<(PullRequest, MemberId), PullRequestError> {
        self.store.transact(|state| {
            let current = state
                .pull_request(id)
                .ok_or_else(|| PullRequestError::NotFound(id.clone()))?;
            let team_id = state
                .pull_requests
                .get(id)
                .map(|row| row.team_id)
                .ok_or_else(|| PullRequestError::NotFound(id.clone()))?;

            let roster = state.roster(team_id);
            let new_reviewer = reassign(&current, &roster)?;

            let position = state
                .assigned_reviewers
                .iter()
                .position(|r| &r.pr_id == id && &r.member_id == old_reviewer_id)
                .ok_or_else(|| PullRequestError::ReviewerNotAssigned {
                    pull_request: id.clone(),
                    reviewer: old_reviewer_id.clone(),
                })?;
            let old = state.assigned_reviewers.remove(position);
            state.assigned_reviewers.push(AssignedReviewerRow {
                pr_id: id.clone(),
                member_id: new_reviewer.clone(),
                slot: old.slot,
            });

            let updated = state
                .pull_request(id)
                .ok_or_else(|| PullRequestError::NotFound(id.clone()))?;
            Ok((updated, new_reviewer))
        })
    }
}

// ============================================================================
// Teams
// ============================================================================

#[derive(Clone)]
pub struct InMemoryTeamRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryTeamRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn upsert(&self, team: Team, matcher: TeamMatcher) -> Result<Team, TeamError> {
        self.store.transact(|state| {
            let current = state.team_by_name(&team.name).map(|row| state.team(row));

            if let Some(current) = &current {
                if matcher(current) {
                    return Err(TeamError::TeamExists(team.name.clone()));
                }
            }

            for member in &team.members {
                let other_team = state
                    .members
                    .get(&member.id)
                    .and_then(|row| row.team_id)
                    .and_then(|team_id| state.teams.get(&team_id))
                    .filter(|row| row.name != team.name);

                if let Some(other) = other_team {
                    return Err(TeamError::MemberOfOtherTeam {
                        member: member.id.clone(),
                        team: other.name.clone(),
                    });
                }
            }

            let team_id = current.as_ref().map(|t| t.id).unwrap_or(team.id);
            state.teams.entry(team_id).or_insert_with(|| TeamRow {
                id: team_id,
                name: team.name.clone(),
            });

            for member in &team.members {
                state.members.insert(
                    member.id.clone(),
                    MemberRow {
                        id: member.id.clone(),
                        username: member.username.clone(),
                        activity: member.activity,
                        team_id: Some(team_id),
                    },
                );
            }

            if let Some(current) = &current {
                let target = team.member_ids();
                let removed: HashSet<MemberId> = current
                    .members
                    .iter()
                    .filter(|m| !target.contains(&m.id))
                    .map(|m| m.id.clone())
                    .collect();
                state.detach_members(&removed);
            }

            Ok(Team {
                id: team_id,
                name: team.name.clone(),
                members: state.roster(team_id),
            })
        })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, TeamError> {
        Ok(self.store.read(|state| state.team_by_name(name).map(|row| state.team(row))))
    }

    async fn set_activity_for_all(
        &self,
        name: &str,
        activity: MemberActivity,
    ) -> Result<Team, TeamError> {
        self.store.transact(|state| {
            let row = state
                .team_by_name(name)
                .cloned()
                .ok_or_else(|| TeamError::NotFound(name.to_string()))?;

            for member in state.members.values_mut() {
                if member.team_id == Some(row.id) {
                    member.activity = activity;
                }
            }

            Ok(state.team(&row))
        })
    }
}

// ============================================================================
// Members
// ============================================================================

#[derive(Clone)]
pub struct InMemoryMemberRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryMemberRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn set_activity(
        &self,
        id: &MemberId,
        activity: MemberActivity,
    ) -> Result<Member, MemberError> {
        self.store.transact(|state| {
            let row = state
                .members
                .get_mut(id)
                .ok_or_else(|| MemberError::NotFound(id.clone()))?;
            row.activity = activity;
            let row = row.clone();
            Ok(state.to_member(&row))
        })
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, MemberError> {
        Ok(self
            .store
            .read(|state| state.members.get(id).map(|row| state.to_member(row))))
    }
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Clone)]
pub struct InMemoryStatisticsRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryStatisticsRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryStatisticsRepository {
    async fn assignments_per_member(
        &self,
        page: Page,
    ) -> Result<Vec<AssignmentsPerMember>, RepositoryError> {
        Ok(self.store.read(|state| {
            let mut counts: HashMap<&MemberId, i64> = HashMap::new();
            for row in &state.assigned_reviewers {
                *counts.entry(&row.member_id).or_default() += 1;
            }

            let mut stats: Vec<AssignmentsPerMember> = counts
                .into_iter()
                .map(|(member_id, assignments_count)| AssignmentsPerMember {
                    member_id: member_id.clone(),
                    assignments_count,
                })
                .collect();
            stats.sort_by(|a, b| {
                b.assignments_count
                    .cmp(&a.assignments_count)
                    .then_with(|| a.member_id.cmp(&b.member_id))
            });

            stats
                .into_iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .collect()
        }))
    }
}
