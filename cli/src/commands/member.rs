// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Member commands
//!
//! Commands: set-active, reviews, get

use anyhow::Result;
use clap::Subcommand;
use reviewer_core::domain::member::MemberId;
use crate::commands::output::{print_json, MemberView, ReviewsView};
use crate::context::AppContext;

#[derive(Subcommand)]
pub enum MemberCommand {
    /// Set whether a member can be assigned as reviewer
    SetActive {
        #[arg(value_name = "USER_ID")]
        id: String,

        #[arg(long, action = clap::ArgAction::Set, value_name = "BOOL")]
        active: bool,
    },

    /// Pull requests the member reviews, oldest first
    Reviews {
        #[arg(value_name = "USER_ID")]
        id: String,
    },

    /// Show a member with its team
    Get {
        #[arg(value_name = "USER_ID")]
        id: String,
    },
}

pub async fn handle_command(command: MemberCommand, ctx: &AppContext) -> Result<()> {
    match command {
        MemberCommand::SetActive { id, active } => {
            let member = ctx.members.set_is_active(&MemberId::new(id), active).await?;
            print_json(&MemberView::from(&member))
        }
        MemberCommand::Reviews { id } => {
            let id = MemberId::new(id);
            let prs = ctx.pull_requests.list_by_reviewer(&id).await?;
            print_json(&ReviewsView::new(&id, &prs))
        }
        MemberCommand::Get { id } => {
            let member = ctx.members.get_member(&MemberId::new(id)).await?;
            print_json(&MemberView::from(&member))
        }
    }
}
