// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod pull_request;
pub mod team;
pub mod member;
pub mod statistics;
pub mod repository_factory;

// Re-export services for convenience
pub use pull_request::{PullRequestService, StandardPullRequestService};
pub use team::{StandardTeamService, TeamService};
pub use member::{MemberService, StandardMemberService};
pub use statistics::{StandardStatisticsService, StatisticsService};
pub use repository_factory::StorageHandle;
