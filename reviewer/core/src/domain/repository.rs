// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Transactional executors, one per aggregate. Each mutating method owns a
//! single unit of work: begin, read the snapshot it needs, invoke the
//! decision callback supplied by the application layer, apply the resulting
//! writes, commit. Any error, including one returned by the callback, rolls
//! the whole unit back.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `PullRequestRepository` | `PullRequest` | `InMemoryPullRequestRepository`, `PostgresPullRequestRepository` |
//! | `TeamRepository` | `Team` | `InMemoryTeamRepository`, `PostgresTeamRepository` |
//! | `MemberRepository` | `Member` | `InMemoryMemberRepository`, `PostgresMemberRepository` |
//! | `StatisticsRepository` | read model | `InMemoryStatisticsRepository`, `PostgresStatisticsRepository` |

use async_trait::async_trait;
use crate::domain::errors::{MemberError, PullRequestError, RepositoryError, TeamError};
use crate::domain::member::{Member, MemberActivity, MemberId};
use crate::domain::pull_request::{PullRequest, PullRequestId};
use crate::domain::statistics::{AssignmentsPerMember, Page};
use crate::domain::team::Team;

/// Storage backend selected at startup
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
}

// ============================================================================
// Decision Callbacks
// ============================================================================

/// Reviewer assignment on creation: (author id, author's team roster) → reviewer ids
pub type AssignReviewers = Box<dyn FnOnce(&MemberId, &[Member]) -> Vec<MemberId> + Send>;

/// Reassignment: (current PR, PR team roster) → replacement reviewer id or a domain error
pub type ReassignReviewer =
    Box<dyn FnOnce(&PullRequest, &[Member]) -> Result<MemberId, PullRequestError> + Send>;

/// Reconciliation matcher: true when the stored team already has the target roster
pub type TeamMatcher = Box<dyn FnOnce(&Team) -> bool + Send>;

/// Merge transition: current PR → (possibly updated PR, changed)
pub type MergeTransition = Box<dyn FnOnce(PullRequest) -> (PullRequest, bool) + Send>;

// ============================================================================
// Executors
// ============================================================================

#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Pull requests reviewed by `reviewer_id`, oldest first, at most `limit`
    async fn find_by_reviewer(
        &self,
        reviewer_id: &MemberId,
        limit: usize,
    ) -> Result<Vec<PullRequest>, PullRequestError>;

    async fn find_by_id(&self, id: &PullRequestId) -> Result<Option<PullRequest>, PullRequestError>;

    /// Resolve the author's team, read its roster, persist `pr` together with
    /// the reviewers chosen by `assign`.
    async fn create(
        &self,
        pr: PullRequest,
        assign: AssignReviewers,
    ) -> Result<PullRequest, PullRequestError>;

    /// Apply `transition` to the stored PR; writes only when it reports a change.
    async fn update_status(
        &self,
        id: &PullRequestId,
        transition: MergeTransition,
    ) -> Result<PullRequest, PullRequestError>;

    /// Swap `old_reviewer_id` for the reviewer chosen by `reassign`.
    async fn reassign(
        &self,
        id: &PullRequestId,
        old_reviewer_id: &MemberId,
        reassign: ReassignReviewer,
    ) -> Result<(PullRequest, MemberId), PullRequestError>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Reconcile the stored team named `team.name` with `team.members`.
    async fn upsert(&self, team: Team, matcher: TeamMatcher) -> Result<Team, TeamError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, TeamError>;

    /// Set `activity` on every current member of the team
    async fn set_activity_for_all(
        &self,
        name: &str,
        activity: MemberActivity,
    ) -> Result<Team, TeamError>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Update activity and return the member projected with its team name
    async fn set_activity(
        &self,
        id: &MemberId,
        activity: MemberActivity,
    ) -> Result<Member, MemberError>;

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, MemberError>;
}

#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Assignment counts per member, highest first
    async fn assignments_per_member(
        &self,
        page: Page,
    ) -> Result<Vec<AssignmentsPerMember>, RepositoryError>;
}
