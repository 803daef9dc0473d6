// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::member::{Member, MemberId};

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub Uuid);

impl TeamId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TeamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team aggregate.
///
/// Membership has set semantics: the order of `members` carries no meaning
/// and two rosters are equal iff their member id sets are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: Vec<Member>,
}

impl Team {
    /// Build a reconciliation target. The id is provisional: an existing team
    /// keeps its stored id.
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            members,
        }
    }

    pub fn member_ids(&self) -> HashSet<MemberId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    /// Order-independent roster comparison
    pub fn has_roster(&self, ids: &HashSet<MemberId>) -> bool {
        self.members.len() == ids.len() && self.members.iter().all(|m| ids.contains(&m.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::MemberActivity;

    fn roster(ids: &[&str]) -> Vec<Member> {
        ids.iter()
            .map(|id| Member::new(*id, format!("user-{}", id), MemberActivity::Active))
            .collect()
    }

    #[test]
    fn test_roster_comparison_ignores_order() {
        let team = Team::new("core", roster(&["a", "b", "c"]));
        let ids: HashSet<MemberId> = ["c", "a", "b"].iter().map(|s| MemberId::from(*s)).collect();
        assert!(team.has_roster(&ids));
    }

    #[test]
    fn test_roster_comparison_detects_difference() {
        let team = Team::new("core", roster(&["a", "b"]));
        let subset: HashSet<MemberId> = ["a"].iter().map(|s| MemberId::from(*s)).collect();
        let swapped: HashSet<MemberId> = ["a", "x"].iter().map(|s| MemberId::from(*s)).collect();
        assert!(!team.has_roster(&subset));
        assert!(!team.has_roster(&swapped));
    }
}
