use clap::Subcommand;
use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{Group, GroupInput, GroupPatch, PermissionInput, Validate};
use crate::database::Store;

use super::open_store;

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "Create a group, or add permissions to an existing one")]
    Add {
        #[arg(help = "Group name")]
        name: String,
        #[arg(long = "permission", help = "Permission name (repeatable, created if missing)")]
        permissions: Vec<String>,
    },
}

pub async fn handle(cmd: GroupCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    match cmd {
        GroupCommands::Add { name, permissions } => {
            let group = add_group(&store, &name, &permissions).await?;
            let summary = format!(
                "Group {} ({}) with {} permission(s)",
                group.name,
                group.id,
                group.permissions.len()
            );
            output_format.print(&group, &summary)
        }
    }
}

/// Ensure the named permissions exist and the group holds all of them
pub async fn add_group(store: &Store, name: &str, permissions: &[String]) -> anyhow::Result<Group> {
    let mut permission_ids: Vec<Uuid> = Vec::with_capacity(permissions.len());
    for permission in permissions {
        let input = PermissionInput {
            name: permission.trim().to_string(),
        };
        input.validate()?;
        let id = match store.permissions.find_by_key(&input.name).await? {
            Some(existing) => existing.id,
            None => store.permissions.create(input).await?.id,
        };
        if !permission_ids.contains(&id) {
            permission_ids.push(id);
        }
    }

    let input = GroupInput {
        name: name.trim().to_string(),
        permissions: permission_ids,
    };
    input.validate()?;

    match store.groups.find_by_key(&input.name).await? {
        Some(existing) => {
            let mut merged = existing.permissions.clone();
            for id in input.permissions {
                if !merged.contains(&id) {
                    merged.push(id);
                }
            }
            let patch = GroupPatch {
                permissions: Some(merged),
            };
            Ok(store.groups.update(existing.id, patch).await?)
        }
        None => Ok(store.groups.create(input).await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_group_and_missing_permissions() {
        let store = Store::memory();
        let group = add_group(&store, "agronomists", &["farms.read".into(), "farms.read".into()])
            .await
            .unwrap();
        assert_eq!(group.permissions.len(), 1);
        assert_eq!(store.permissions.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn re_adding_merges_permissions() {
        let store = Store::memory();
        add_group(&store, "ops", &["iot.write".into()]).await.unwrap();
        let group = add_group(&store, "ops", &["iot.write".into(), "readings.delete".into()])
            .await
            .unwrap();
        assert_eq!(group.permissions.len(), 2);
        assert_eq!(store.groups.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_group_name_is_rejected() {
        let store = Store::memory();
        assert!(add_group(&store, "  ", &[]).await.is_err());
    }
}
