//! `files` subcommands.

use super::resolve_workspace;
use crate::rich::{echo_in_panel, echo_table, Table};
use clap::Subcommand;
use extralit_client::Client;

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// List the files stored in a workspace
    List {
        /// Path prefix to list
        #[arg(default_value = "")]
        path: String,
        #[arg(short, long)]
        workspace: Option<String>,
        /// Descend into sub-directories
        #[arg(short, long)]
        recursive: bool,
        /// Show every stored version
        #[arg(long)]
        versions: bool,
    },
    /// Delete a file, or one of its versions
    Delete {
        path: String,
        #[arg(short, long)]
        workspace: Option<String>,
        #[arg(long)]
        version_id: Option<String>,
    },
}

pub async fn run(client: &Client, command: FilesCommand) -> anyhow::Result<()> {
    match command {
        FilesCommand::List {
            path,
            workspace,
            recursive,
            versions,
        } => {
            let workspace = resolve_workspace(client, workspace.as_deref()).await?;
            let listing = workspace.list_files(&path, recursive, versions).await?;

            let mut table = Table::new(
                format!("Files in {}", workspace.name()),
                ["Name", "Size", "Last Modified", "Version", "Latest"],
            );
            for object in &listing.objects {
                table.add_row([
                    object.object_name.clone(),
                    object.size.map(|s| s.to_string()).unwrap_or_default(),
                    object
                        .last_modified
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                    object.version_id.clone().unwrap_or_default(),
                    object
                        .is_latest
                        .map(|latest| (if latest { "yes" } else { "no" }).to_string())
                        .unwrap_or_default(),
                ]);
            }
            echo_table(&table);
        }
        FilesCommand::Delete {
            path,
            workspace,
            version_id,
        } => {
            let workspace = resolve_workspace(client, workspace.as_deref()).await?;
            workspace.delete_file(&path, version_id.clone()).await?;

            let target = match version_id {
                Some(version) => format!("{} (version {})", path, version),
                None => path,
            };
            echo_in_panel(
                &format!("Deleted {} from workspace {}.", target, workspace.name()),
                "File deleted",
                true,
            );
        }
    }
    Ok(())
}
