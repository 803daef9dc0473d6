// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! PostgreSQL executors against a live database.
//!
//! Skipped unless `REVIEWER_TEST_DATABASE_URL` points at a PostgreSQL
//! instance the tests may migrate. Every test namespaces its team names,
//! member ids and pull request ids with a random prefix, so the suite can
//! share one database and run in parallel.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use sqlx::Row;
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use uuid::Uuid;
use common::member;
use reviewer_core::application::repository_factory::{
    create_member_repository, create_pull_request_repository, create_team_repository,
};
use reviewer_core::application::{
    MemberService, PullRequestService, StandardMemberService, StandardPullRequestService,
    StandardTeamService, StorageHandle, TeamService,
};
use reviewer_core::domain::assignment::ReviewerPicker;
use reviewer_core::domain::config::{DatabaseConfig, IsolationLevel, PullRequestSettings};
use reviewer_core::domain::errors::{PullRequestError, TeamError};
use reviewer_core::domain::member::MemberId;
use reviewer_core::domain::pull_request::{PullRequestId, PullRequestStatus};
use reviewer_core::domain::team::Team;
use reviewer_core::infrastructure::db::Database;

const DATABASE_URL_VAR: &str = "REVIEWER_TEST_DATABASE_URL";

static MIGRATED: OnceCell<()> = OnceCell::const_new();

struct PgHarness {
    db: Database,
    prefix: String,
    pull_requests: Arc<StandardPullRequestService>,
    teams: StandardTeamService,
    members: StandardMemberService,
}

impl PgHarness {
    async fn connect(isolation: IsolationLevel, seed: u64) -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("{} not set, skipping PostgreSQL test", DATABASE_URL_VAR);
            return None;
        };

        let config = DatabaseConfig {
            url: Some(url.clone()),
            max_connections: 10,
            isolation,
        };
        let db = Database::new(&url, &config).await.expect("connect to test database");
        MIGRATED
            .get_or_try_init(|| async { db.migrate().await })
            .await
            .expect("apply migrations");

        let storage = StorageHandle::PostgreSQL(db.clone());
        let picker = Arc::new(ReviewerPicker::seeded(seed));

        Some(Self {
            db,
            prefix: Uuid::new_v4().simple().to_string()[..8].to_string(),
            pull_requests: Arc::new(StandardPullRequestService::new(
                create_pull_request_repository(&storage),
                PullRequestSettings {
                    target_reviewers_count: 2,
                    out_limit: 10,
                },
                picker,
            )),
            teams: StandardTeamService::new(create_team_repository(&storage)),
            members: StandardMemberService::new(create_member_repository(&storage)),
        })
    }

    fn key(&self, local: &str) -> String {
        format!("{}-{}", self.prefix, local)
    }

    fn id(&self, local: &str) -> MemberId {
        MemberId::new(self.key(local))
    }

    fn pr(&self, local: &str) -> PullRequestId {
        PullRequestId::new(self.key(local))
    }

    async fn upsert(&self, name: &str, roster: &[(&str, bool)]) -> Result<Team, TeamError> {
        let members = roster
            .iter()
            .map(|(local, active)| member(&self.key(local), *active))
            .collect();
        self.teams.upsert_team(self.key(name), members).await
    }

    async fn team(&self, name: &str, roster: &[(&str, bool)]) -> Team {
        self.upsert(name, roster).await.expect("team reconciliation")
    }
}

#[tokio::test]
async fn test_transactions_run_at_configured_isolation_level() {
    for isolation in [IsolationLevel::RepeatableRead, IsolationLevel::Serializable] {
        let Some(h) = PgHarness::connect(isolation, 1).await else {
            return;
        };

        let mut tx = h.db.begin("checking isolation").await.unwrap();
        let row = sqlx::query("SELECT current_setting('transaction_isolation') AS level")
            .fetch_one(&mut *tx)
            .await
            .unwrap();
        let level: String = row.get("level");

        assert_eq!(level, isolation.as_sql().to_lowercase());
    }
}

#[tokio::test]
async fn test_create_reassign_and_merge_on_postgres() {
    let Some(h) = PgHarness::connect(IsolationLevel::Serializable, 2).await else {
        return;
    };
    h.team("core", &[("A", true), ("B", true), ("C", true), ("D", false)]).await;

    let created = h
        .pull_requests
        .create_pull_request(h.pr("pr1"), "Feature".to_string(), h.id("A"))
        .await
        .unwrap();
    let reviewers: HashSet<MemberId> = created.reviewers.iter().cloned().collect();
    assert_eq!(reviewers, HashSet::from([h.id("B"), h.id("C")]));

    h.members.set_is_active(&h.id("D"), true).await.unwrap();
    let (reassigned, new_reviewer) = h
        .pull_requests
        .reassign_reviewer(&h.pr("pr1"), &h.id("B"))
        .await
        .unwrap();
    assert_eq!(new_reviewer, h.id("D"));
    let expected: Vec<MemberId> = created
        .reviewers
        .iter()
        .map(|r| if r == &h.id("B") { h.id("D") } else { r.clone() })
        .collect();
    assert_eq!(reassigned.reviewers, expected);

    let merged = h.pull_requests.merge_pull_request(&h.pr("pr1")).await.unwrap();
    assert_eq!(merged.status, PullRequestStatus::Merged);
    let merged_at = merged.merged_at.expect("merge timestamp");
    assert!(merged_at > created.created_at);

    let again = h.pull_requests.merge_pull_request(&h.pr("pr1")).await.unwrap();
    assert_eq!(again.merged_at, Some(merged_at));
    assert_eq!(again.reviewers, expected);

    let err = h
        .pull_requests
        .reassign_reviewer(&h.pr("pr1"), &h.id("C"))
        .await
        .unwrap_err();
    assert!(matches!(err, PullRequestError::AlreadyMerged(_)));
}

#[tokio::test]
async fn test_duplicate_id_and_unknown_author_on_postgres() {
    let Some(h) = PgHarness::connect(IsolationLevel::RepeatableRead, 3).await else {
        return;
    };
    h.team("core", &[("A", true), ("B", true)]).await;
    let created = h
        .pull_requests
        .create_pull_request(h.pr("pr1"), "Feature".to_string(), h.id("A"))
        .await
        .unwrap();

    let err = h
        .pull_requests
        .create_pull_request(h.pr("pr1"), "Other".to_string(), h.id("B"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PR_EXISTS");
    let stored = h.pull_requests.get_pull_request(&h.pr("pr1")).await.unwrap();
    assert_eq!(stored.name, "Feature");
    assert_eq!(stored.reviewers, created.reviewers);

    let err = h
        .pull_requests
        .create_pull_request(h.pr("pr2"), "Feature".to_string(), h.id("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, PullRequestError::TeamOrUserNotFound(_)));
    assert!(matches!(
        h.pull_requests.get_pull_request(&h.pr("pr2")).await,
        Err(PullRequestError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_reconciliation_on_postgres() {
    let Some(h) = PgHarness::connect(IsolationLevel::Serializable, 4).await else {
        return;
    };
    h.team("core", &[("A", true), ("C", true)]).await;

    h.pull_requests
        .create_pull_request(h.pr("pr3"), "Old".to_string(), h.id("A"))
        .await
        .unwrap();
    h.pull_requests.merge_pull_request(&h.pr("pr3")).await.unwrap();
    let open = h
        .pull_requests
        .create_pull_request(h.pr("pr2"), "New".to_string(), h.id("A"))
        .await
        .unwrap();
    assert_eq!(open.reviewers, vec![h.id("C")]);

    let err = h.upsert("core", &[("C", false), ("A", true)]).await.unwrap_err();
    assert!(matches!(err, TeamError::TeamExists(_)));

    let err = h.upsert("payments", &[("P", true), ("A", true)]).await.unwrap_err();
    assert!(matches!(err, TeamError::MemberOfOtherTeam { .. }));
    assert!(matches!(
        h.teams.get_team(&h.key("payments")).await,
        Err(TeamError::NotFound(_))
    ));

    let team = h.team("core", &[("A", true), ("B", true)]).await;
    assert!(!team.has_member(&h.id("C")));

    let pr2 = h.pull_requests.get_pull_request(&h.pr("pr2")).await.unwrap();
    assert!(pr2.reviewers.is_empty());
    let pr3 = h.pull_requests.get_pull_request(&h.pr("pr3")).await.unwrap();
    assert_eq!(pr3.reviewers, vec![h.id("C")]);

    let c = h.members.get_member(&h.id("C")).await.unwrap();
    assert!(c.team_name.is_none());
}

#[tokio::test]
async fn test_concurrent_creates_in_one_team_succeed_under_repeatable_read() {
    let Some(h) = PgHarness::connect(IsolationLevel::RepeatableRead, 5).await else {
        return;
    };
    let authors = ["A", "B", "C", "D", "E", "F", "G", "H"];
    let roster: Vec<(&str, bool)> = authors.iter().map(|a| (*a, true)).collect();
    h.team("core", &roster).await;

    for round in 0..5 {
        let mut creates = JoinSet::new();
        for author in authors {
            let service = h.pull_requests.clone();
            let pr_id = h.pr(&format!("r{}-{}", round, author));
            let author_id = h.id(author);
            creates.spawn(async move {
                let result = service
                    .create_pull_request(pr_id, "Concurrent".to_string(), author_id.clone())
                    .await;
                (author_id, result)
            });
        }

        while let Some(joined) = creates.join_next().await {
            let (author_id, result) = joined.unwrap();
            let pr = result.unwrap_or_else(|e| panic!("create by {} failed: {}", author_id, e));
            assert_eq!(pr.reviewers.len(), 2);
            assert!(!pr.reviewers.contains(&author_id));
        }
    }
}
