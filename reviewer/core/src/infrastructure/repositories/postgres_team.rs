// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Team
//!
//! Team reconciliation and bulk activity updates over `team` and
//! `team_member`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements `TeamRepository`
//!
//! Reconciliation runs as one transaction: lock the team row, compare the
//! stored roster through the matcher, reject members owned by another team,
//! upsert the target members, then detach removed members and drop them
//! from every open pull request they review.

use async_trait::async_trait;
use sqlx::{PgConnection, Row};
use tracing::debug;
use uuid::Uuid;
use crate::domain::errors::{RepositoryError, TeamError};
use crate::domain::member::{MemberActivity, MemberId};
use crate::domain::repository::{TeamMatcher, TeamRepository};
use crate::domain::team::{Team, TeamId};
use crate::infrastructure::db::Database;
use super::postgres_member::load_roster;

pub struct PostgresTeamRepository {
    db: Database,
}

impl PostgresTeamRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

async fn find_team_row(
    conn: &mut PgConnection,
    name: &str,
    for_update: bool,
) -> Result<Option<TeamId>, RepositoryError> {
    let row = sqlx::query(&format!(
        "SELECT id FROM team WHERE team_name = $1 {}",
        if for_update { "FOR UPDATE" } else { "" }
    ))
    .bind(name)
    .fetch_optional(conn)
    .await
    .map_err(|e| RepositoryError::Database(format!("Failed to load team: {}", e)))?;

    match row {
        Some(row) => {
            let id: Uuid = row.try_get("id")?;
            Ok(Some(TeamId(id)))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn upsert(&self, team: Team, matcher: TeamMatcher) -> Result<Team, TeamError> {
        let operation = "reconciling team";
        let mut tx = self.db.begin(operation).await?;

        let current = match find_team_row(&mut tx, &team.name, true).await? {
            Some(id) => Some(Team {
                id,
                name: team.name.clone(),
                members: load_roster(&mut tx, id, true).await?,
            }),
            None => None,
        };

        if let Some(current) = &current {
            if matcher(current) {
                return Err(TeamError::TeamExists(team.name.clone()));
            }
        }

        let target_ids: Vec<String> = team.members.iter().map(|m| m.id.0.clone()).collect();

        let conflict = sqlx::query(
            r#"
            SELECT m.id, t.team_name
            FROM team_member m
            JOIN team t ON t.id = m.team_id
            WHERE m.id = ANY($1) AND t.team_name <> $2
            ORDER BY m.id
            LIMIT 1
            FOR UPDATE OF m
            "#,
        )
        .bind(&target_ids)
        .bind(&team.name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to check member ownership: {}", e)))?;

        if let Some(row) = conflict {
            let member: String = row.try_get("id").map_err(RepositoryError::from)?;
            let other: String = row.try_get("team_name").map_err(RepositoryError::from)?;
            return Err(TeamError::MemberOfOtherTeam {
                member: MemberId(member),
                team: other,
            });
        }

        let team_id = match &current {
            Some(current) => current.id,
            None => {
                sqlx::query("INSERT INTO team (id, team_name) VALUES ($1, $2)")
                    .bind(team.id.0)
                    .bind(&team.name)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| RepositoryError::Database(format!("Failed to insert team: {}", e)))?;
                team.id
            }
        };

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO team_member (id, username, activity, team_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    username = EXCLUDED.username,
                    activity = EXCLUDED.activity,
                    team_id = EXCLUDED.team_id
                "#,
            )
            .bind(member.id.as_str())
            .bind(&member.username)
            .bind(member.activity.as_str())
            .bind(team_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to upsert team member: {}", e)))?;
        }

        if let Some(current) = &current {
            let target = team.member_ids();
            let removed: Vec<String> = current
                .members
                .iter()
                .filter(|m| !target.contains(&m.id))
                .map(|m| m.id.0.clone())
                .collect();

            if !removed.is_empty() {
                let dropped = sqlx::query(
                    r#"
                    DELETE FROM assigned_reviewer ar
                    USING pull_request pr
                    WHERE ar.pr_id = pr.id
                      AND pr.pr_status = 'OPEN'
                      AND ar.member_id = ANY($1)
                    "#,
                )
                .bind(&removed)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(format!("Failed to drop reviewer assignments: {}", e)))?;

                sqlx::query("UPDATE team_member SET team_id = NULL WHERE id = ANY($1)")
                    .bind(&removed)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| RepositoryError::Database(format!("Failed to detach team members: {}", e)))?;

                debug!(
                    team = %team.name,
                    removed = removed.len(),
                    dropped_assignments = dropped.rows_affected(),
                    "Detached removed members"
                );
            }
        }

        let members = load_roster(&mut tx, team_id, false).await?;
        Database::commit(tx, operation).await?;

        Ok(Team {
            id: team_id,
            name: team.name,
            members,
        })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, TeamError> {
        let mut conn = self
            .db
            .get_pool()
            .acquire()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        match find_team_row(&mut conn, name, false).await? {
            Some(id) => Ok(Some(Team {
                id,
                name: name.to_string(),
                members: load_roster(&mut conn, id, false).await?,
            })),
            None => Ok(None),
        }
    }

    async fn set_activity_for_all(
        &self,
        name: &str,
        activity: MemberActivity,
    ) -> Result<Team, TeamError> {
        let operation = "setting team activity";
        let mut tx = self.db.begin(operation).await?;

        let team_id = find_team_row(&mut tx, name, true)
            .await?
            .ok_or_else(|| TeamError::NotFound(name.to_string()))?;

        sqlx::query("UPDATE team_member SET activity = $2 WHERE team_id = $1")
            .bind(team_id.0)
            .bind(activity.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to update team activity: {}", e)))?;

        let members = load_roster(&mut tx, team_id, false).await?;
        Database::commit(tx, operation).await?;

        Ok(Team {
            id: team_id,
            name: name.to_string(),
            members,
        })
    }
}
