// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Member
//!
//! Member activity updates and lookups, plus the member row parsing shared
//! by the team and pull request executors.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements `MemberRepository` over `team_member`

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;
use crate::domain::errors::{MemberError, RepositoryError};
use crate::domain::member::{Member, MemberActivity, MemberId};
use crate::domain::repository::MemberRepository;
use crate::domain::team::TeamId;
use crate::infrastructure::db::Database;

/// Columns expected by [`parse_member_row`]; `m` aliases `team_member`, `t` aliases `team`
pub(crate) const MEMBER_COLUMNS: &str = "m.id, m.username, m.activity, m.team_id, t.team_name";

pub(crate) fn parse_member_row(row: &PgRow) -> Result<Member, RepositoryError> {
    let activity: String = row.try_get("activity")?;
    let activity = MemberActivity::parse(&activity).ok_or_else(|| {
        RepositoryError::Serialization(format!("unknown member activity '{}'", activity))
    })?;
    let team_id: Option<Uuid> = row.try_get("team_id")?;

    Ok(Member {
        id: MemberId(row.try_get("id")?),
        username: row.try_get("username")?,
        activity,
        team_id: team_id.map(TeamId),
        team_name: row.try_get("team_name")?,
    })
}

/// Current members of a team. With `for_update` the rows stay locked
/// against concurrent updates until the enclosing transaction ends.
pub(crate) async fn load_roster(
    conn: &mut PgConnection,
    team_id: TeamId,
    for_update: bool,
) -> Result<Vec<Member>, RepositoryError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM team_member m
        JOIN team t ON t.id = m.team_id
        WHERE m.team_id = $1
        ORDER BY m.id
        {}
        "#,
        MEMBER_COLUMNS,
        if for_update { "FOR UPDATE OF m" } else { "" }
    ))
    .bind(team_id.0)
    .fetch_all(conn)
    .await
    .map_err(|e| RepositoryError::Database(format!("Failed to load team roster: {}", e)))?;

    rows.iter().map(parse_member_row).collect()
}

pub struct PostgresMemberRepository {
    db: Database,
}

impl PostgresMemberRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn set_activity(
        &self,
        id: &MemberId,
        activity: MemberActivity,
    ) -> Result<Member, MemberError> {
        let operation = "setting member activity";
        let mut tx = self.db.begin(operation).await?;

        let updated = sqlx::query("UPDATE team_member SET activity = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(activity.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to update member activity: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Err(MemberError::NotFound(id.clone()));
        }

        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM team_member m
            LEFT JOIN team t ON t.id = m.team_id
            WHERE m.id = $1
            "#,
            MEMBER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to load member: {}", e)))?;
        let member = parse_member_row(&row)?;

        Database::commit(tx, operation).await?;
        Ok(member)
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, MemberError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM team_member m
            LEFT JOIN team t ON t.id = m.team_id
            WHERE m.id = $1
            "#,
            MEMBER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(self.db.get_pool())
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(parse_member_row(&row)?)),
            None => Ok(None),
        }
    }
}
