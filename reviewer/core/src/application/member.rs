// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Member Application Service

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use crate::domain::errors::{ErrorKind, MemberError};
use crate::domain::member::{Member, MemberActivity, MemberId};
use crate::domain::repository::MemberRepository;

#[async_trait]
pub trait MemberService: Send + Sync {
    /// Set the activity flag and return the member with its team name
    async fn set_is_active(&self, id: &MemberId, is_active: bool) -> Result<Member, MemberError>;

    async fn get_member(&self, id: &MemberId) -> Result<Member, MemberError>;
}

pub struct StandardMemberService {
    repository: Arc<dyn MemberRepository>,
}

impl StandardMemberService {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }
}

fn log_failure(operation: &str, err: &MemberError) {
    match err.kind() {
        ErrorKind::Internal => error!(operation, error = %err, "Member operation failed"),
        _ => warn!(operation, code = err.code(), error = %err, "Member operation rejected"),
    }
}

#[async_trait]
impl MemberService for StandardMemberService {
    async fn set_is_active(&self, id: &MemberId, is_active: bool) -> Result<Member, MemberError> {
        if id.as_str().trim().is_empty() {
            return Err(MemberError::InvalidInput("user_id must not be empty".to_string()));
        }

        let member = self
            .repository
            .set_activity(id, MemberActivity::from_flag(is_active))
            .await
            .inspect_err(|e| log_failure("set_is_active", e))?;

        info!(member = %member.id, activity = %member.activity, "Member activity updated");
        Ok(member)
    }

    async fn get_member(&self, id: &MemberId) -> Result<Member, MemberError> {
        debug!(member = %id, "Getting member");
        self.repository
            .find_by_id(id)
            .await
            .inspect_err(|e| log_failure("get", e))?
            .ok_or_else(|| MemberError::NotFound(id.clone()))
    }
}
