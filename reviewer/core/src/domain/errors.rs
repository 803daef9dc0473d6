// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Error Taxonomy
//!
//! One error enum per aggregate. Domain variants are produced by decision
//! callbacks or by executor preconditions and abort the enclosing
//! transaction; `Internal` wraps an unexpected storage failure whose message
//! already names the operation that failed.
//!
//! | Kind | Variants |
//! |------|----------|
//! | `NotFound` | member, team or pull request absent; reviewer not assigned |
//! | `Conflict` | team exists, member of other team, PR exists, PR merged |
//! | `Unprocessable` | no eligible replacement reviewer |
//! | `InvalidInput` | rejected by service-level validation |
//! | `Internal` | storage failure |

use crate::domain::member::MemberId;
use crate::domain::pull_request::PullRequestId;

/// Transport-independent classification used by presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unprocessable,
    InvalidInput,
    Internal,
}

/// Storage failure surfaced by a repository executor
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PullRequestError {
    #[error("pull request {0} not found")]
    NotFound(PullRequestId),

    #[error("pull request {0} already exists")]
    AlreadyExists(PullRequestId),

    #[error("pull request {0} is already merged and can not be reassigned")]
    AlreadyMerged(PullRequestId),

    #[error("team or user not found: {0}")]
    TeamOrUserNotFound(MemberId),

    #[error("reviewer {reviewer} is not assigned to pull request {pull_request}")]
    ReviewerNotAssigned {
        pull_request: PullRequestId,
        reviewer: MemberId,
    },

    #[error("no active replacement candidate for reviewer {0}")]
    CannotReassign(MemberId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] RepositoryError),
}

impl PullRequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::TeamOrUserNotFound(_) | Self::ReviewerNotAssigned { .. } => {
                ErrorKind::NotFound
            }
            Self::AlreadyExists(_) | Self::AlreadyMerged(_) => ErrorKind::Conflict,
            Self::CannotReassign(_) => ErrorKind::Unprocessable,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::TeamOrUserNotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "PR_EXISTS",
            Self::AlreadyMerged(_) => "PR_MERGED",
            Self::ReviewerNotAssigned { .. } => "NOT_ASSIGNED",
            Self::CannotReassign(_) => "NO_CANDIDATE",
            Self::InvalidInput(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    #[error("team {0} not found")]
    NotFound(String),

    #[error("team {0} already exists with the same members")]
    TeamExists(String),

    #[error("user {member} is already a member of team {team}")]
    MemberOfOtherTeam { member: MemberId, team: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] RepositoryError),
}

impl TeamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::TeamExists(_) | Self::MemberOfOtherTeam { .. } => ErrorKind::Conflict,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::TeamExists(_) => "TEAM_EXISTS",
            Self::MemberOfOtherTeam { .. } => "MEMBER_OF_OTHER_TEAM",
            Self::InvalidInput(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("member {0} not found")]
    NotFound(MemberId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] RepositoryError),
}

impl MemberError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidInput(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] RepositoryError),
}

impl StatisticsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}
