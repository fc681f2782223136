//! `workspaces` subcommands.

use crate::rich::{echo_in_panel, echo_table, Table};
use clap::Subcommand;
use extralit_client::{Client, Membership, Workspace};
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum WorkspacesCommand {
    /// List the workspaces you have access to
    List,
    /// Create a workspace
    Create {
        /// Name of the new workspace
        name: String,
    },
    /// Delete a workspace and its documents
    Delete {
        name: String,
    },
    /// Add a user to a workspace
    AddUser {
        /// Workspace name
        name: String,
        /// ID of the user to add
        user_id: Uuid,
    },
    /// Remove a user from a workspace
    DeleteUser {
        /// Workspace name
        name: String,
        /// ID of the user to remove
        user_id: Uuid,
    },
}

pub async fn run(client: &Client, command: WorkspacesCommand) -> anyhow::Result<()> {
    match command {
        WorkspacesCommand::List => {
            let mut table = Table::new("Workspaces", ["ID", "Name", "Creation Date", "Last Update"]);
            for workspace in Workspace::list(client).await? {
                table.add_row([
                    workspace.id().to_string(),
                    workspace.name().to_string(),
                    workspace.inserted_at().to_string(),
                    workspace.updated_at().to_string(),
                ]);
            }
            echo_table(&table);
        }
        WorkspacesCommand::Create { name } => {
            let workspace = Workspace::create(client, &name).await?;
            echo_in_panel(
                &format!("Workspace with the name={} successfully created.", workspace.name()),
                "Workspace created",
                true,
            );
        }
        WorkspacesCommand::Delete { name } => {
            Workspace::from_name(client, &name).await?.delete().await?;
            echo_in_panel(
                &format!("Workspace with the name={} successfully deleted.", name),
                "Workspace deleted",
                true,
            );
        }
        WorkspacesCommand::AddUser { name, user_id } => {
            let workspace = Workspace::from_name(client, &name).await?;
            let body = match workspace.add_user(user_id).await? {
                Membership::Changed => {
                    format!("User with id={} added to workspace {}.", user_id, name)
                }
                Membership::OwnerSkipped => owner_skipped(user_id),
            };
            echo_in_panel(&body, "User added", true);
        }
        WorkspacesCommand::DeleteUser { name, user_id } => {
            let workspace = Workspace::from_name(client, &name).await?;
            let body = match workspace.delete_user(user_id).await? {
                Membership::Changed => {
                    format!("User with id={} removed from workspace {}.", user_id, name)
                }
                Membership::OwnerSkipped => owner_skipped(user_id),
            };
            echo_in_panel(&body, "User removed", true);
        }
    }
    Ok(())
}

fn owner_skipped(user_id: Uuid) -> String {
    format!(
        "User with id={} has the owner role and can already access every workspace, \
         so nothing was changed.",
        user_id
    )
}
