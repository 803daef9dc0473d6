// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Pull Request
//!
//! Pull request units of work over `pull_request` and `assigned_reviewer`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements `PullRequestRepository`
//!
//! Reviewer order is kept in `assigned_reviewer.slot`; a reassignment
//! rewrites the member of the replaced slot in place.

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;
use crate::domain::errors::{PullRequestError, RepositoryError};
use crate::domain::member::MemberId;
use crate::domain::pull_request::{PullRequest, PullRequestId, PullRequestStatus};
use crate::domain::repository::{AssignReviewers, MergeTransition, PullRequestRepository, ReassignReviewer};
use crate::domain::team::TeamId;
use crate::infrastructure::db::Database;
use super::postgres_member::load_roster;
use super::slot_index;

const PULL_REQUEST_COLUMNS: &str =
    "pr.id, pr.pr_name, pr.author_id, pr.team_id, pr.pr_status, pr.created_at, pr.merged_at";

pub struct PostgresPullRequestRepository {
    db: Database,
}

impl PostgresPullRequestRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Parse a pull request row; reviewers are loaded separately
fn parse_pull_request_row(row: &PgRow) -> Result<(PullRequest, TeamId), RepositoryError> {
    let status: String = row.try_get("pr_status")?;
    let status = PullRequestStatus::parse(&status).ok_or_else(|| {
        RepositoryError::Serialization(format!("unknown pull request status '{}'", status))
    })?;
    let team_id: Uuid = row.try_get("team_id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let merged_at: Option<DateTime<Utc>> = row.try_get("merged_at")?;

    let pr = PullRequest {
        id: PullRequestId(row.try_get("id")?),
        name: row.try_get("pr_name")?,
        author_id: MemberId(row.try_get("author_id")?),
        status,
        created_at,
        merged_at,
        reviewers: Vec::new(),
    };

    Ok((pr, TeamId(team_id)))
}

async fn load_reviewers(
    conn: &mut PgConnection,
    pr_id: &PullRequestId,
) -> Result<Vec<MemberId>, RepositoryError> {
    let rows = sqlx::query("SELECT member_id FROM assigned_reviewer WHERE pr_id = $1 ORDER BY slot")
        .bind(pr_id.as_str())
        .fetch_all(conn)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to load reviewers: {}", e)))?;

    rows.iter()
        .map(|row| -> Result<MemberId, RepositoryError> { Ok(MemberId(row.try_get("member_id")?)) })
        .collect()
}

/// Load a pull request with its reviewers, optionally locking the row
async fn load_pull_request(
    conn: &mut PgConnection,
    id: &PullRequestId,
    for_update: bool,
) -> Result<Option<(PullRequest, TeamId)>, RepositoryError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM pull_request pr WHERE pr.id = $1 {}",
        PULL_REQUEST_COLUMNS,
        if for_update { "FOR UPDATE" } else { "" }
    ))
    .bind(id.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepositoryError::Database(format!("Failed to load pull request: {}", e)))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let (mut pr, team_id) = parse_pull_request_row(&row)?;
    pr.reviewers = load_reviewers(conn, id).await?;
    Ok(Some((pr, team_id)))
}

#[async_trait]
impl PullRequestRepository for PostgresPullRequestRepository {
    async fn find_by_reviewer(
        &self,
        reviewer_id: &MemberId,
        limit: usize,
    ) -> Result<Vec<PullRequest>, PullRequestError> {
        let mut conn = self
            .db
            .get_pool()
            .acquire()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM pull_request pr
            JOIN assigned_reviewer ar ON ar.pr_id = pr.id
            WHERE ar.member_id = $1
            ORDER BY pr.created_at, pr.id
            LIMIT $2
            "#,
            PULL_REQUEST_COLUMNS
        ))
        .bind(reviewer_id.as_str())
        .bind(limit as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to list reviewer pull requests: {}", e)))?;

        let mut prs = Vec::with_capacity(rows.len());
        for row in &rows {
            prs.push(parse_pull_request_row(row)?.0);
        }

        let ids: Vec<String> = prs.iter().map(|pr| pr.id.0.clone()).collect();
        let reviewer_rows = sqlx::query(
            "SELECT pr_id, member_id FROM assigned_reviewer WHERE pr_id = ANY($1) ORDER BY pr_id, slot",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to load reviewers: {}", e)))?;

        let mut reviewers: HashMap<String, Vec<MemberId>> = HashMap::new();
        for row in &reviewer_rows {
            let pr_id: String = row.try_get("pr_id").map_err(RepositoryError::from)?;
            let member_id: String = row.try_get("member_id").map_err(RepositoryError::from)?;
            reviewers.entry(pr_id).or_default().push(MemberId(member_id));
        }

        for pr in &mut prs {
            pr.reviewers = reviewers.remove(&pr.id.0).unwrap_or_default();
        }

        Ok(prs)
    }

    async fn find_by_id(&self, id: &PullRequestId) -> Result<Option<PullRequest>, PullRequestError> {
        let mut conn = self
            .db
            .get_pool()
            .acquire()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(load_pull_request(&mut conn, id, false).await?.map(|(pr, _)| pr))
    }

    async fn create(
        &self,
        mut pr: PullRequest,
        assign: AssignReviewers,
    ) -> Result<PullRequest, PullRequestError> {
        let operation = "creating pull request";
        let mut tx = self.db.begin(operation).await?;

        let exists = sqlx::query("SELECT 1 FROM pull_request WHERE id = $1")
            .bind(pr.id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to check pull request: {}", e)))?;
        if exists.is_some() {
            return Err(PullRequestError::AlreadyExists(pr.id.clone()));
        }

        // plain read: the id-ordered roster lock below is the only row lock
        let author = sqlx::query("SELECT team_id FROM team_member WHERE id = $1")
            .bind(pr.author_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to load author: {}", e)))?;
        let team_id: Option<Uuid> = match author {
            Some(row) => row.try_get("team_id").map_err(RepositoryError::from)?,
            None => None,
        };
        let team_id = team_id
            .map(TeamId)
            .ok_or_else(|| PullRequestError::TeamOrUserNotFound(pr.author_id.clone()))?;

        let roster = load_roster(&mut tx, team_id, true).await?;
        let reviewers = assign(&pr.author_id, &roster);

        let inserted = sqlx::query(
            r#"
            INSERT INTO pull_request (id, pr_name, author_id, team_id, pr_status, created_at, merged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(pr.id.as_str())
        .bind(&pr.name)
        .bind(pr.author_id.as_str())
        .bind(team_id.0)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(PullRequestError::AlreadyExists(pr.id.clone()));
            }
            Err(e) => {
                return Err(RepositoryError::Database(format!("Failed to insert pull request: {}", e)).into());
            }
        }

        for (slot, reviewer) in reviewers.iter().enumerate() {
            sqlx::query("INSERT INTO assigned_reviewer (pr_id, member_id, slot) VALUES ($1, $2, $3)")
                .bind(pr.id.as_str())
                .bind(reviewer.as_str())
                .bind(slot_index(slot)?)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(format!("Failed to assign reviewer: {}", e)))?;
        }

        Database::commit(tx, operation).await?;

        pr.reviewers = reviewers;
        Ok(pr)
    }

    async fn update_status(
        &self,
        id: &PullRequestId,
        transition: MergeTransition,
    ) -> Result<PullRequest, PullRequestError> {
        let operation = "merging pull request";
        let mut tx = self.db.begin(operation).await?;

        let (current, _) = load_pull_request(&mut tx, id, true)
            .await?
            .ok_or_else(|| PullRequestError::NotFound(id.clone()))?;

        let (updated, changed) = transition(current);

        if changed {
            sqlx::query("UPDATE pull_request SET pr_status = $2, merged_at = $3 WHERE id = $1")
                .bind(id.as_str())
                .bind(updated.status.as_str())
                .bind(updated.merged_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(format!("Failed to update pull request status: {}", e)))?;
        }

        Database::commit(tx, operation).await?;
        Ok(updated)
    }

    async fn reassign(
        &self,
        id: &PullRequestId,
        old_reviewer_id: &MemberId,
        reassign: ReassignReviewer,
    ) -> Result<(PullRequest, MemberId), PullRequestError> {
        let operation = "reassigning reviewer";
        let mut tx = self.db.begin(operation).await?;

        let (current, team_id) = load_pull_request(&mut tx, id, true)
            .await?
            .ok_or_else(|| PullRequestError::NotFound(id.clone()))?;

        let roster = load_roster(&mut tx, team_id, true).await?;
        let new_reviewer = reassign(&current, &roster)?;

        let replaced = sqlx::query(
            "UPDATE assigned_reviewer SET member_id = $3 WHERE pr_id = $1 AND member_id = $2",
        )
        .bind(id.as_str())
        .bind(old_reviewer_id.as_str())
        .bind(new_reviewer.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to replace reviewer: {}", e)))?;

        if replaced.rows_affected() == 0 {
            return Err(PullRequestError::ReviewerNotAssigned {
                pull_request: id.clone(),
                reviewer: old_reviewer_id.clone(),
            });
        }

        let mut updated = current;
        updated.reviewers = load_reviewers(&mut tx, id).await?;

        Database::commit(tx, operation).await?;
        Ok((updated, new_reviewer))
    }
}
