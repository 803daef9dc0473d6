// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Decision Policy
//!
//! Pure decision functions handed to the transactional executors as
//! callbacks. They receive a snapshot read inside the transaction and return
//! a decision; none of them perform I/O.
//!
//! - [`select_reviewers`]: reviewer assignment on PR creation
//! - [`select_replacement`]: single-reviewer reassignment
//! - [`roster_matches`]: team reconciliation matcher
//! - [`merge_transition`]: `Open` → `Merged` state transition
//!
//! Randomness always comes from the caller; [`ReviewerPicker`] is the
//! injectable source the application services hold.

use std::collections::HashSet;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use crate::domain::errors::PullRequestError;
use crate::domain::member::{Member, MemberId};
use crate::domain::pull_request::{PullRequest, PullRequestStatus};
use crate::domain::team::Team;

/// Active members of the roster other than the author
pub fn eligible_reviewers(author_id: &MemberId, roster: &[Member]) -> Vec<MemberId> {
    roster
        .iter()
        .filter(|m| m.is_active() && &m.id != author_id)
        .map(|m| m.id.clone())
        .collect()
}

/// Draw `min(target, |eligible|)` distinct reviewers uniformly at random.
/// An empty eligible pool yields an empty selection.
pub fn select_reviewers<R: Rng + ?Sized>(
    author_id: &MemberId,
    roster: &[Member],
    target: usize,
    rng: &mut R,
) -> Vec<MemberId> {
    let eligible = eligible_reviewers(author_id, roster);
    let amount = target.min(eligible.len());
    eligible.choose_multiple(rng, amount).cloned().collect()
}

/// Pick a replacement for `old_reviewer` on `pr`.
///
/// The pool excludes the author and every current reviewer, not only the
/// one being replaced, so a replacement never duplicates a reviewer.
pub fn select_replacement<R: Rng + ?Sized>(
    pr: &PullRequest,
    old_reviewer: &MemberId,
    roster: &[Member],
    rng: &mut R,
) -> Result<MemberId, PullRequestError> {
    if pr.status == PullRequestStatus::Merged {
        return Err(PullRequestError::AlreadyMerged(pr.id.clone()));
    }

    if !pr.has_reviewer(old_reviewer) {
        return Err(PullRequestError::ReviewerNotAssigned {
            pull_request: pr.id.clone(),
            reviewer: old_reviewer.clone(),
        });
    }

    let current: HashSet<&MemberId> = pr.reviewers.iter().collect();
    let pool: Vec<&MemberId> = roster
        .iter()
        .filter(|m| m.is_active() && m.id != pr.author_id && !current.contains(&m.id))
        .map(|m| &m.id)
        .collect();

    pool.choose(rng)
        .map(|id| (*id).clone())
        .ok_or_else(|| PullRequestError::CannotReassign(old_reviewer.clone()))
}

/// Reconciliation matcher: true iff the stored roster equals the target
/// member id set, regardless of order.
pub fn roster_matches(target: &HashSet<MemberId>, current: &Team) -> bool {
    current.has_roster(target)
}

/// Merge transition. Returns the (possibly updated) pull request and whether
/// anything changed. An already merged pull request is returned untouched,
/// including its original merge timestamp.
pub fn merge_transition(mut pr: PullRequest, now: DateTime<Utc>) -> (PullRequest, bool) {
    if pr.status == PullRequestStatus::Merged {
        return (pr, false);
    }

    // merged_at must be strictly after created_at even on a coarse clock
    let merged_at = if now > pr.created_at {
        now
    } else {
        pr.created_at + Duration::microseconds(1)
    };

    pr.status = PullRequestStatus::Merged;
    pr.merged_at = Some(merged_at);
    (pr, true)
}

/// Injectable randomness source shared by the application services
pub struct ReviewerPicker {
    rng: Mutex<StdRng>,
}

impl ReviewerPicker {
    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sequence, for tests and reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock();
        f(&mut rng)
    }
}

impl Default for ReviewerPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for ReviewerPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerPicker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::MemberActivity;

    fn member(id: &str, activity: MemberActivity) -> Member {
        Member::new(id, format!("user-{}", id), activity)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn open_pr(author: &str, reviewers: &[&str]) -> PullRequest {
        let mut pr = PullRequest::new("pr-1", "Feature", author);
        pr.reviewers = reviewers.iter().map(|r| MemberId::from(*r)).collect();
        pr
    }

    #[test]
    fn test_select_reviewers_excludes_author_and_inactive() {
        let roster = vec![
            member("a", MemberActivity::Active),
            member("b", MemberActivity::Active),
            member("c", MemberActivity::Inactive),
            member("d", MemberActivity::Active),
        ];
        let author = MemberId::from("a");

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_reviewers(&author, &roster, 2, &mut rng);
            assert_eq!(picked.len(), 2);
            assert!(!picked.contains(&author));
            assert!(!picked.contains(&MemberId::from("c")));
            assert_ne!(picked[0], picked[1]);
        }
    }

    #[test]
    fn test_select_reviewers_caps_at_eligible_count() {
        let roster = vec![member("a", MemberActivity::Active), member("b", MemberActivity::Active)];
        let picked = select_reviewers(&MemberId::from("a"), &roster, 2, &mut rng());
        assert_eq!(picked, vec![MemberId::from("b")]);
    }

    #[test]
    fn test_select_reviewers_with_no_eligible_members_is_empty() {
        let roster = vec![member("a", MemberActivity::Active), member("b", MemberActivity::Inactive)];
        let picked = select_reviewers(&MemberId::from("a"), &roster, 2, &mut rng());
        assert!(picked.is_empty());
    }

    #[test]
    fn test_select_reviewers_reaches_every_eligible_member() {
        let roster: Vec<Member> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|id| member(id, MemberActivity::Active))
            .collect();
        let mut seen = HashSet::new();
        let mut rng = rng();
        for _ in 0..200 {
            seen.extend(select_reviewers(&MemberId::from("a"), &roster, 1, &mut rng));
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_replacement_skips_current_reviewers() {
        let pr = open_pr("a", &["b", "c"]);
        let roster = vec![
            member("a", MemberActivity::Active),
            member("b", MemberActivity::Active),
            member("c", MemberActivity::Active),
            member("d", MemberActivity::Active),
        ];
        let new = select_replacement(&pr, &MemberId::from("b"), &roster, &mut rng()).unwrap();
        assert_eq!(new, MemberId::from("d"));
    }

    #[test]
    fn test_replacement_rejects_merged_pull_request() {
        let mut pr = open_pr("a", &["b"]);
        pr.status = PullRequestStatus::Merged;
        let roster = vec![member("c", MemberActivity::Active)];
        let err = select_replacement(&pr, &MemberId::from("b"), &roster, &mut rng()).unwrap_err();
        assert!(matches!(err, PullRequestError::AlreadyMerged(_)));
    }

    #[test]
    fn test_replacement_requires_assigned_reviewer() {
        let pr = open_pr("a", &["b"]);
        let roster = vec![member("c", MemberActivity::Active)];
        let err = select_replacement(&pr, &MemberId::from("x"), &roster, &mut rng()).unwrap_err();
        assert!(matches!(err, PullRequestError::ReviewerNotAssigned { .. }));
    }

    #[test]
    fn test_replacement_with_empty_pool_cannot_reassign() {
        let pr = open_pr("a", &["b", "c"]);
        let roster = vec![
            member("a", MemberActivity::Active),
            member("b", MemberActivity::Active),
            member("c", MemberActivity::Active),
            member("d", MemberActivity::Inactive),
        ];
        let err = select_replacement(&pr, &MemberId::from("b"), &roster, &mut rng()).unwrap_err();
        assert!(matches!(err, PullRequestError::CannotReassign(_)));
    }

    #[test]
    fn test_merge_transition_is_idempotent() {
        let pr = open_pr("a", &["b"]);
        let created_at = pr.created_at;

        let (merged, changed) = merge_transition(pr, created_at + Duration::seconds(5));
        assert!(changed);
        assert_eq!(merged.status, PullRequestStatus::Merged);
        let merged_at = merged.merged_at.unwrap();

        let (again, changed) = merge_transition(merged.clone(), created_at + Duration::seconds(60));
        assert!(!changed);
        assert_eq!(again, merged);
        assert_eq!(again.merged_at, Some(merged_at));
    }

    #[test]
    fn test_merge_timestamp_is_after_creation_on_coarse_clock() {
        let pr = open_pr("a", &[]);
        let created_at = pr.created_at;
        let (merged, _) = merge_transition(pr, created_at);
        assert!(merged.merged_at.unwrap() > created_at);
    }

    #[test]
    fn test_seeded_picker_is_deterministic() {
        let roster: Vec<Member> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|id| member(id, MemberActivity::Active))
            .collect();
        let author = MemberId::from("a");
        let first = ReviewerPicker::seeded(42).with_rng(|rng| select_reviewers(&author, &roster, 2, rng));
        let second = ReviewerPicker::seeded(42).with_rng(|rng| select_reviewers(&author, &roster, 2, rng));
        assert_eq!(first, second);
    }
}
