// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Team commands
//!
//! Commands: upsert, get, deactivate

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;
use tracing::debug;
use crate::commands::output::{print_json, TeamView};
use crate::context::AppContext;

#[derive(Subcommand)]
pub enum TeamCommand {
    /// Create or reconcile a team from a roster file (YAML or JSON)
    Upsert {
        /// Roster file with `team_name` and `members`
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Show a team and its members
    Get {
        #[arg(value_name = "TEAM_NAME")]
        name: String,
    },

    /// Mark every member of a team inactive
    Deactivate {
        #[arg(value_name = "TEAM_NAME")]
        name: String,
    },
}

pub async fn handle_command(command: TeamCommand, ctx: &AppContext) -> Result<()> {
    match command {
        TeamCommand::Upsert { file } => upsert(ctx, &file).await,
        TeamCommand::Get { name } => {
            let team = ctx.teams.get_team(&name).await?;
            print_json(&TeamView::from(&team))
        }
        TeamCommand::Deactivate { name } => {
            let team = ctx.teams.deactivate_all(&name).await?;
            print_json(&json!({ "team": TeamView::from(&team) }))
        }
    }
}

pub fn read_roster(path: &Path) -> Result<TeamView> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Invalid roster file {:?}", path))
}

async fn upsert(ctx: &AppContext, file: &Path) -> Result<()> {
    let roster = read_roster(file)?;
    let name = roster.team_name.clone();
    debug!(team = %name, members = roster.members.len(), path = ?file, "Read roster file");

    let team = ctx.teams.upsert_team(name, roster.into_members()).await?;
    print_json(&json!({ "team": TeamView::from(&team) }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_roster_accepts_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"team_name":"payments","members":[{{"user_id":"u7","username":"Eve","is_active":true}}]}}"#
        )
        .unwrap();

        let roster = read_roster(file.path()).unwrap();
        assert_eq!(roster.team_name, "payments");
        assert_eq!(roster.members[0].user_id, "u7");
    }

    #[test]
    fn test_missing_roster_file_is_an_error() {
        assert!(read_roster(Path::new("/nonexistent/roster.yaml")).is_err());
    }
}
