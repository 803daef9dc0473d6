// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pull Request Application Service
//!
//! Orchestrates the pull request flows:
//! - Domain layer: assignment policy and merge transition
//! - Infrastructure layer: `PullRequestRepository` executors
//!
//! The service validates input that no decision callback can express, picks
//! the callback for each flow and hands it to the executor. Randomness comes
//! from the injected [`ReviewerPicker`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use crate::domain::assignment::{merge_transition, select_replacement, select_reviewers, ReviewerPicker};
use crate::domain::config::PullRequestSettings;
use crate::domain::errors::{ErrorKind, PullRequestError};
use crate::domain::member::MemberId;
use crate::domain::pull_request::{now_micros, PullRequest, PullRequestId};
use crate::domain::repository::{AssignReviewers, MergeTransition, PullRequestRepository, ReassignReviewer};

// ============================================================================
// Service Trait
// ============================================================================

#[async_trait]
pub trait PullRequestService: Send + Sync {
    /// Create an open pull request and assign reviewers from the author's team
    async fn create_pull_request(
        &self,
        id: PullRequestId,
        name: String,
        author_id: MemberId,
    ) -> Result<PullRequest, PullRequestError>;

    /// Merge a pull request. Merging an already merged one returns it unchanged.
    async fn merge_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, PullRequestError>;

    /// Replace one reviewer; returns the updated pull request and the new reviewer
    async fn reassign_reviewer(
        &self,
        id: &PullRequestId,
        old_reviewer_id: &MemberId,
    ) -> Result<(PullRequest, MemberId), PullRequestError>;

    async fn get_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, PullRequestError>;

    /// Pull requests the member reviews, oldest first, capped at the configured limit
    async fn list_by_reviewer(&self, reviewer_id: &MemberId) -> Result<Vec<PullRequest>, PullRequestError>;
}

// ============================================================================
// Standard Implementation
// ============================================================================

pub struct StandardPullRequestService {
    repository: Arc<dyn PullRequestRepository>,
    settings: PullRequestSettings,
    picker: Arc<ReviewerPicker>,
}

impl StandardPullRequestService {
    pub fn new(
        repository: Arc<dyn PullRequestRepository>,
        settings: PullRequestSettings,
        picker: Arc<ReviewerPicker>,
    ) -> Self {
        Self {
            repository,
            settings,
            picker,
        }
    }
}

fn require(value: &str, field: &str) -> Result<(), PullRequestError> {
    if value.trim().is_empty() {
        return Err(PullRequestError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn log_failure(operation: &str, err: &PullRequestError) {
    match err.kind() {
        ErrorKind::Internal => error!(operation, error = %err, "Pull request operation failed"),
        _ => warn!(operation, code = err.code(), error = %err, "Pull request operation rejected"),
    }
}

#[async_trait]
impl PullRequestService for StandardPullRequestService {
    async fn create_pull_request(
        &self,
        id: PullRequestId,
        name: String,
        author_id: MemberId,
    ) -> Result<PullRequest, PullRequestError> {
        require(id.as_str(), "pull_request_id")?;
        require(&name, "pull_request_name")?;
        require(author_id.as_str(), "author_id")?;

        let picker = self.picker.clone();
        let target = self.settings.target_reviewers_count;
        let assign: AssignReviewers = Box::new(move |author, roster| {
            picker.with_rng(|rng| select_reviewers(author, roster, target, rng))
        });

        let pr = self
            .repository
            .create(PullRequest::new(id.0, name, author_id.0), assign)
            .await
            .inspect_err(|e| log_failure("create", e))?;

        info!(
            pull_request = %pr.id,
            author = %pr.author_id,
            reviewers = pr.reviewers.len(),
            "Pull request created"
        );
        Ok(pr)
    }

    async fn merge_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, PullRequestError> {
        require(id.as_str(), "pull_request_id")?;

        let was_merged = Arc::new(AtomicBool::new(false));
        let observed = was_merged.clone();
        let transition: MergeTransition = Box::new(move |pr| {
            observed.store(pr.is_merged(), Ordering::Relaxed);
            merge_transition(pr, now_micros())
        });

        let pr = self
            .repository
            .update_status(id, transition)
            .await
            .inspect_err(|e| log_failure("merge", e))?;

        if was_merged.load(Ordering::Relaxed) {
            debug!(pull_request = %pr.id, "Pull request already merged");
        } else {
            info!(pull_request = %pr.id, "Pull request merged");
        }
        Ok(pr)
    }

    async fn reassign_reviewer(
        &self,
        id: &PullRequestId,
        old_reviewer_id: &MemberId,
    ) -> Result<(PullRequest, MemberId), PullRequestError> {
        require(id.as_str(), "pull_request_id")?;
        require(old_reviewer_id.as_str(), "old_reviewer_id")?;

        let picker = self.picker.clone();
        let old = old_reviewer_id.clone();
        let reassign: ReassignReviewer = Box::new(move |pr, roster| {
            picker.with_rng(|rng| select_replacement(pr, &old, roster, rng))
        });

        let (pr, new_reviewer) = self
            .repository
            .reassign(id, old_reviewer_id, reassign)
            .await
            .inspect_err(|e| log_failure("reassign", e))?;

        info!(
            pull_request = %pr.id,
            old_reviewer = %old_reviewer_id,
            new_reviewer = %new_reviewer,
            "Reviewer reassigned"
        );
        Ok((pr, new_reviewer))
    }

    async fn get_pull_request(&self, id: &PullRequestId) -> Result<PullRequest, PullRequestError> {
        debug!(pull_request = %id, "Getting pull request");
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| PullRequestError::NotFound(id.clone()))
    }

    async fn list_by_reviewer(&self, reviewer_id: &MemberId) -> Result<Vec<PullRequest>, PullRequestError> {
        require(reviewer_id.as_str(), "user_id")?;

        let prs = self
            .repository
            .find_by_reviewer(reviewer_id, self.settings.out_limit)
            .await
            .inspect_err(|e| log_failure("list_by_reviewer", e))?;

        debug!(reviewer = %reviewer_id, count = prs.len(), "Listed pull requests for reviewer");
        Ok(prs)
    }
}
