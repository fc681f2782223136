//! Command implementations.

pub mod auth;
pub mod files;
pub mod schemas;
pub mod users;
pub mod workspaces;

use anyhow::Context;
use extralit_client::{Client, Workspace};

/// Look up `name`, or the workspace saved at login when no name is given.
pub(crate) async fn resolve_workspace(
    client: &Client,
    name: Option<&str>,
) -> anyhow::Result<Workspace> {
    let name = name.or_else(|| client.workspace()).context(
        "No workspace given. Pass --workspace, or log in with --workspace to set a default one.",
    )?;
    Ok(Workspace::from_name(client, name).await?)
}
