use anyhow::anyhow;
use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{normalize_email, User, UserPatch};
use crate::database::Store;

use super::open_store;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Grant the admin flag to a user")]
    Promote {
        #[arg(help = "Email of the account")]
        email: String,
    },

    #[command(about = "Add a user to a group")]
    Join {
        #[arg(help = "Email of the account")]
        email: String,
        #[arg(help = "Group name")]
        group: String,
    },
}

pub async fn handle(cmd: UserCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let user = match cmd {
        UserCommands::Promote { email } => promote(&store, &email).await?,
        UserCommands::Join { email, group } => join_group(&store, &email, &group).await?,
    };
    let summary = format!(
        "User {} ({}) admin={} groups={}",
        user.email,
        user.id,
        user.is_admin,
        user.groups.len()
    );
    output_format.print(&user, &summary)
}

async fn find_user(store: &Store, email: &str) -> anyhow::Result<User> {
    let email = normalize_email(email);
    store
        .users
        .find_by_key(&email)
        .await?
        .ok_or_else(|| anyhow!("no user with email {}", email))
}

pub async fn promote(store: &Store, email: &str) -> anyhow::Result<User> {
    let user = find_user(store, email).await?;
    let patch = UserPatch {
        is_admin: Some(true),
        ..UserPatch::default()
    };
    Ok(store.users.update(user.id, patch).await?)
}

pub async fn join_group(store: &Store, email: &str, group: &str) -> anyhow::Result<User> {
    let user = find_user(store, email).await?;
    let group = store
        .groups
        .find_by_key(group.trim())
        .await?
        .ok_or_else(|| anyhow!("no group named {}", group))?;

    if user.groups.contains(&group.id) {
        return Ok(user);
    }
    let mut groups = user.groups.clone();
    groups.push(group.id);
    let patch = UserPatch {
        groups: Some(groups),
        ..UserPatch::default()
    };
    Ok(store.users.update(user.id, patch).await?)
}
