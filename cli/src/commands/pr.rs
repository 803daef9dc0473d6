// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pull request commands
//!
//! Commands: create, merge, reassign, get

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;
use reviewer_core::domain::member::MemberId;
use reviewer_core::domain::pull_request::PullRequestId;
use crate::commands::output::{print_json, PullRequestView};
use crate::context::AppContext;

#[derive(Subcommand)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        #[arg(value_name = "PULL_REQUEST_ID")]
        id: String,

        #[arg(value_name = "NAME")]
        name: String,

        #[arg(value_name = "AUTHOR_ID")]
        author: String,
    },

    /// Merge a pull request (repeating is harmless)
    Merge {
        #[arg(value_name = "PULL_REQUEST_ID")]
        id: String,
    },

    /// Replace one reviewer with another active teammate
    Reassign {
        #[arg(value_name = "PULL_REQUEST_ID")]
        id: String,

        #[arg(value_name = "OLD_REVIEWER_ID")]
        old_reviewer: String,
    },

    /// Show a pull request with its reviewers
    Get {
        #[arg(value_name = "PULL_REQUEST_ID")]
        id: String,
    },
}

pub async fn handle_command(command: PrCommand, ctx: &AppContext) -> Result<()> {
    match command {
        PrCommand::Create { id, name, author } => {
            let pr = ctx
                .pull_requests
                .create_pull_request(PullRequestId::new(id), name, MemberId::new(author))
                .await?;
            print_json(&json!({ "pr": PullRequestView::from(&pr) }))
        }
        PrCommand::Merge { id } => {
            let pr = ctx.pull_requests.merge_pull_request(&PullRequestId::new(id)).await?;
            print_json(&json!({ "pr": PullRequestView::from(&pr) }))
        }
        PrCommand::Reassign { id, old_reviewer } => {
            let (pr, replaced_by) = ctx
                .pull_requests
                .reassign_reviewer(&PullRequestId::new(id), &MemberId::new(old_reviewer))
                .await?;
            print_json(&json!({
                "pr": PullRequestView::from(&pr),
                "replaced_by": replaced_by.to_string(),
            }))
        }
        PrCommand::Get { id } => {
            let pr = ctx.pull_requests.get_pull_request(&PullRequestId::new(id)).await?;
            print_json(&PullRequestView::from(&pr))
        }
    }
}
