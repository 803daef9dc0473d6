// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

mod common;

use common::Harness;
use reviewer_core::application::{MemberService, PullRequestService, StatisticsService};
use reviewer_core::domain::config::{PullRequestSettings, StatisticsSettings};
use reviewer_core::domain::errors::{ErrorKind, MemberError, StatisticsError};
use reviewer_core::domain::member::{MemberActivity, MemberId};
use reviewer_core::domain::pull_request::PullRequestId;
use reviewer_core::domain::statistics::AssignmentsPerMember;

fn id(value: &str) -> MemberId {
    MemberId::from(value)
}

fn count(member: &str, assignments_count: i64) -> AssignmentsPerMember {
    AssignmentsPerMember {
        member_id: id(member),
        assignments_count,
    }
}

#[tokio::test]
async fn test_set_is_active_sets_rather_than_toggles() {
    let h = Harness::new(1);
    h.team("core", &[("A", true), ("B", true)]).await;

    let first = h.members.set_is_active(&id("B"), false).await.unwrap();
    assert_eq!(first.activity, MemberActivity::Inactive);
    assert_eq!(first.team_name.as_deref(), Some("core"));
    let revision = h.store.revision();

    let second = h.members.set_is_active(&id("B"), false).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(h.store.revision(), revision);

    let active = h.members.set_is_active(&id("B"), true).await.unwrap();
    assert!(active.is_active());
}

#[tokio::test]
async fn test_set_is_active_on_unknown_member_is_not_found() {
    let h = Harness::new(2);

    let err = h.members.set_is_active(&id("ghost"), true).await.unwrap_err();

    assert!(matches!(err, MemberError::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.store.revision(), 0);
}

#[tokio::test]
async fn test_inactive_member_is_never_assigned() {
    let h = Harness::new(3);
    h.team("core", &[("A", true), ("B", true), ("C", true)]).await;
    h.members.set_is_active(&id("C"), false).await.unwrap();

    for i in 0..10 {
        let pr = h
            .pull_requests
            .create_pull_request(PullRequestId::new(format!("pr-{}", i)), "Change".to_string(), id("A"))
            .await
            .unwrap();
        assert_eq!(pr.reviewers, vec![id("B")]);
    }
}

#[tokio::test]
async fn test_assignment_counts_are_ordered_and_paged() {
    let h = Harness::new(4);
    h.team("core", &[("A", true), ("B", true), ("C", true)]).await;
    h.team("ops", &[("X", true), ("Y", true)]).await;

    // core: every PR by A is reviewed by B and C; ops: every PR by X by Y
    for i in 0..3 {
        h.pull_requests
            .create_pull_request(PullRequestId::new(format!("core-{}", i)), "Core".to_string(), id("A"))
            .await
            .unwrap();
    }
    h.pull_requests
        .create_pull_request(PullRequestId::new("ops-0"), "Ops".to_string(), id("X"))
        .await
        .unwrap();

    let all = h.statistics.assignments_per_member(10, 0).await.unwrap();
    assert_eq!(all, vec![count("B", 3), count("C", 3), count("Y", 1)]);

    let second_page = h.statistics.assignments_per_member(1, 1).await.unwrap();
    assert_eq!(second_page, vec![count("C", 3)]);

    assert!(h.statistics.assignments_per_member(10, 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_statistics_limit_is_clamped_and_must_be_positive() {
    let h = Harness::with_settings(
        5,
        PullRequestSettings {
            target_reviewers_count: 3,
            out_limit: 10,
        },
        StatisticsSettings { max_page_size: 2 },
    );
    h.team("core", &[("A", true), ("B", true), ("C", true), ("D", true)]).await;
    h.pull_requests
        .create_pull_request(PullRequestId::new("pr1"), "Change".to_string(), id("A"))
        .await
        .unwrap();

    let clamped = h.statistics.assignments_per_member(50, 0).await.unwrap();
    assert_eq!(clamped, vec![count("B", 1), count("C", 1)]);

    let err = h.statistics.assignments_per_member(0, 0).await.unwrap_err();
    assert!(matches!(err, StatisticsError::InvalidInput(_)));
    assert_eq!(err.code(), "BAD_REQUEST");
}
