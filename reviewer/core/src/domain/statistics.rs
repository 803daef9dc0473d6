// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use crate::domain::member::MemberId;

/// Number of reviewer assignments held by one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentsPerMember {
    pub member_id: MemberId,
    pub assignments_count: i64,
}

/// Limit/offset window over the assignment counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}
