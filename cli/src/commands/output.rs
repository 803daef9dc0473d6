// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! JSON views printed on stdout. Field names follow the public REST models
//! of the reviewer service so scripts can consume either.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use reviewer_core::domain::member::{Member, MemberActivity, MemberId};
use reviewer_core::domain::pull_request::PullRequest;
use reviewer_core::domain::statistics::AssignmentsPerMember;
use reviewer_core::domain::team::Team;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberView {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// Team body, also the format of the `team upsert --file` roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamView {
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMemberView>,
}

impl TeamView {
    pub fn into_members(self) -> Vec<Member> {
        self.members
            .into_iter()
            .map(|m| Member::new(m.user_id, m.username, MemberActivity::from_flag(m.is_active)))
            .collect()
    }
}

impl From<&Team> for TeamView {
    fn from(team: &Team) -> Self {
        Self {
            team_name: team.name.clone(),
            members: team
                .members
                .iter()
                .map(|m| TeamMemberView {
                    user_id: m.id.to_string(),
                    username: m.username.clone(),
                    is_active: m.is_active(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestView {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<&PullRequest> for PullRequestView {
    fn from(pr: &PullRequest) -> Self {
        Self {
            pull_request_id: pr.id.to_string(),
            pull_request_name: pr.name.clone(),
            author_id: pr.author_id.to_string(),
            status: pr.status.to_string(),
            assigned_reviewers: pr.reviewers.iter().map(MemberId::to_string).collect(),
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestShortView {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewsView {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShortView>,
}

impl ReviewsView {
    pub fn new(user_id: &MemberId, prs: &[PullRequest]) -> Self {
        Self {
            user_id: user_id.to_string(),
            pull_requests: prs
                .iter()
                .map(|pr| PullRequestShortView {
                    pull_request_id: pr.id.to_string(),
                    pull_request_name: pr.name.clone(),
                    author_id: pr.author_id.to_string(),
                    status: pr.status.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberView {
    pub user_id: String,
    pub username: String,
    pub team_name: Option<String>,
    pub is_active: bool,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.id.to_string(),
            username: member.username.clone(),
            team_name: member.team_name.clone(),
            is_active: member.is_active(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignmentCountView {
    pub user_id: String,
    pub assignments_count: i64,
}

impl From<&AssignmentsPerMember> for AssignmentCountView {
    fn from(row: &AssignmentsPerMember) -> Self {
        Self {
            user_id: row.member_id.to_string(),
            assignments_count: row.assignments_count,
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewer_core::domain::pull_request::PullRequestStatus;

    #[test]
    fn test_roster_file_parses_into_members() {
        let yaml = r#"
team_name: backend
members:
  - user_id: u1
    username: Alice
    is_active: true
  - user_id: u2
    username: Bob
    is_active: false
"#;
        let view: TeamView = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(view.team_name, "backend");

        let members = view.into_members();
        assert_eq!(members.len(), 2);
        assert!(members[0].is_active());
        assert_eq!(members[1].activity, MemberActivity::Inactive);
        assert!(members.iter().all(|m| m.team_id.is_none()));
    }

    #[test]
    fn test_open_pull_request_omits_merge_timestamp() {
        let mut pr = PullRequest::new("pr-1", "Feature", "u1");
        pr.reviewers = vec![MemberId::from("u2")];

        let json = serde_json::to_value(PullRequestView::from(&pr)).unwrap();
        assert_eq!(json["status"], "OPEN");
        assert_eq!(json["assigned_reviewers"], serde_json::json!(["u2"]));
        assert!(json.get("mergedAt").is_none());

        pr.status = PullRequestStatus::Merged;
        pr.merged_at = Some(pr.created_at);
        let json = serde_json::to_value(PullRequestView::from(&pr)).unwrap();
        assert_eq!(json["status"], "MERGED");
        assert!(json.get("mergedAt").is_some());
    }
}
