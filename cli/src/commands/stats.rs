// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use clap::Args;
use crate::commands::output::{print_json, AssignmentCountView};
use crate::context::AppContext;

#[derive(Args)]
pub struct StatsCommand {
    /// Rows per page (capped by statistics.max_page_size)
    #[arg(long, default_value_t = 10)]
    limit: u32,

    #[arg(long, default_value_t = 0)]
    offset: u32,
}

pub async fn execute(cmd: StatsCommand, ctx: &AppContext) -> Result<()> {
    let rows = ctx
        .statistics
        .assignments_per_member(cmd.limit, cmd.offset)
        .await?;
    let view: Vec<AssignmentCountView> = rows.iter().map(AssignmentCountView::from).collect();
    print_json(&view)
}
