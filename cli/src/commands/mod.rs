// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the reviewer CLI

pub mod config;
pub mod migrate;
pub mod team;
pub mod pr;
pub mod member;
pub mod stats;
pub mod output;

pub use self::config::ConfigCommand;
pub use self::migrate::MigrateCommand;
pub use self::team::TeamCommand;
pub use self::pr::PrCommand;
pub use self::member::MemberCommand;
pub use self::stats::StatsCommand;

use reviewer_core::domain::errors::{
    ErrorKind, MemberError, PullRequestError, StatisticsError, TeamError,
};

/// Classification of a failed command: (kind, machine-readable code, message)
pub fn classify(err: &anyhow::Error) -> Option<(ErrorKind, &'static str, String)> {
    if let Some(e) = err.downcast_ref::<PullRequestError>() {
        return Some((e.kind(), e.code(), e.to_string()));
    }
    if let Some(e) = err.downcast_ref::<TeamError>() {
        return Some((e.kind(), e.code(), e.to_string()));
    }
    if let Some(e) = err.downcast_ref::<MemberError>() {
        return Some((e.kind(), e.code(), e.to_string()));
    }
    if let Some(e) = err.downcast_ref::<StatisticsError>() {
        return Some((e.kind(), e.code(), e.to_string()));
    }
    None
}

/// Process exit status for a failed command
pub fn exit_status(kind: Option<ErrorKind>) -> i32 {
    match kind {
        Some(ErrorKind::InvalidInput) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Conflict) => 4,
        Some(ErrorKind::Unprocessable) => 5,
        Some(ErrorKind::Internal) | None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewer_core::domain::member::MemberId;
    use reviewer_core::domain::pull_request::PullRequestId;

    #[test]
    fn test_domain_errors_keep_their_code_through_anyhow() {
        let err = anyhow::Error::new(PullRequestError::CannotReassign(MemberId::from("u2")));
        let (kind, code, _) = classify(&err).unwrap();
        assert_eq!(kind, ErrorKind::Unprocessable);
        assert_eq!(code, "NO_CANDIDATE");
        assert_eq!(exit_status(Some(kind)), 5);

        let err = anyhow::Error::new(TeamError::TeamExists("core".to_string()));
        assert_eq!(classify(&err).unwrap().1, "TEAM_EXISTS");
    }

    #[test]
    fn test_unclassified_errors_exit_with_one() {
        let err = anyhow::anyhow!("connection refused");
        assert!(classify(&err).is_none());
        assert_eq!(exit_status(None), 1);

        let err = anyhow::Error::new(PullRequestError::NotFound(PullRequestId::new("pr-9")));
        assert_eq!(exit_status(classify(&err).map(|c| c.0)), 3);
    }
}
