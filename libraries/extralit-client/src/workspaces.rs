//! Workspace handles.

use crate::client::Client;
use crate::error::{ApiError, ClientError, Result};
use crate::files::WorkspaceFiles;
use crate::schemas::{self, Schema, SchemaStructure, SchemaSyncReport};
use crate::store::ObjectStore;
use crate::types::{
    FileObjectResponse, Items, ListObjectsResponse, UserModel, UserRole, WorkspaceCreate,
    WorkspaceModel,
};
use crate::users::User;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of adding a user to, or removing it from, a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// The server applied the change
    Changed,
    /// The user is an owner; owners see every workspace so nothing was sent
    OwnerSkipped,
}

/// A workspace on the Extralit server.
///
/// Workspaces cannot be built directly; they come from [`Workspace::create`],
/// [`Workspace::from_id`], [`Workspace::from_name`] or [`Workspace::list`].
#[derive(Debug, Clone)]
pub struct Workspace {
    client: Client,
    model: WorkspaceModel,
}

impl Workspace {
    fn new_instance(client: &Client, model: WorkspaceModel) -> Self {
        Self {
            client: client.clone(),
            model,
        }
    }

    pub fn id(&self) -> Uuid {
        self.model.id
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn inserted_at(&self) -> DateTime<Utc> {
        self.model.inserted_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.model.updated_at
    }

    pub fn model(&self) -> &WorkspaceModel {
        &self.model
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Create a new workspace. Requires the owner or admin role.
    pub async fn create(client: &Client, name: &str) -> Result<Self> {
        client
            .require_role("Workspace::create", &[UserRole::Owner, UserRole::Admin])
            .await?;

        match client
            .post_json(&["api", "workspaces"], Some(&WorkspaceCreate { name }))
            .await
        {
            Ok(model) => {
                let workspace = Self::new_instance(client, model);
                info!(workspace_id = %workspace.id(), name = %name, "Workspace created");
                Ok(workspace)
            }
            Err(e @ ApiError::AlreadyExists(_)) => Err(ClientError::value(
                format!(
                    "Workspace with name=`{}` already exists, so please use a different name.",
                    name
                ),
                e,
            )),
            Err(e) => Err(ClientError::runtime(
                format!("Error while creating workspace with name=`{}`.", name),
                e,
            )),
        }
    }

    /// Get an existing workspace by its ID.
    pub async fn from_id(client: &Client, id: Uuid) -> Result<Self> {
        let id_str = id.to_string();
        match client
            .get_json::<WorkspaceModel>(&["api", "v1", "workspaces", &id_str])
            .await
        {
            Ok(model) => Ok(Self::new_instance(client, model)),
            Err(e @ ApiError::NotFound(_)) => Err(ClientError::value(
                format!(
                    "Workspace with id=`{}` doesn't exist in Extralit, so please make sure \
                     that the ID you provided is a valid one. Otherwise, you can create a new \
                     one via the `Workspace::create` method.",
                    id
                ),
                e,
            )),
            Err(e @ ApiError::Validation(_)) => Err(ClientError::value(
                "The ID you provided is not a valid UUID, so please make sure that the ID \
                 you provided is a valid one.",
                e,
            )),
            Err(e) => Err(ClientError::runtime(
                format!("Error while retrieving workspace with id=`{}` from Extralit.", id),
                e,
            )),
        }
    }

    /// Get an existing workspace by its name, among those visible to the current user.
    pub async fn from_name(client: &Client, name: &str) -> Result<Self> {
        Self::fetch_mine(client)
            .await?
            .into_iter()
            .find(|ws| ws.name == name)
            .map(|model| Self::new_instance(client, model))
            .ok_or_else(|| ClientError::Value {
                message: format!(
                    "Workspace with name=`{}` doesn't exist in Extralit, so please create it \
                     via the `Workspace::create` method as follows: \
                     `Workspace::create(&client, \"{}\")`.",
                    name, name
                ),
                source: None,
            })
    }

    /// List the workspaces visible to the current user.
    pub async fn list(client: &Client) -> Result<Vec<Self>> {
        Ok(Self::fetch_mine(client)
            .await?
            .into_iter()
            .map(|model| Self::new_instance(client, model))
            .collect())
    }

    async fn fetch_mine(client: &Client) -> Result<Vec<WorkspaceModel>> {
        client
            .get_json::<Items<WorkspaceModel>>(&["api", "v1", "me", "workspaces"])
            .await
            .map(|page| page.items)
            .map_err(|e| {
                ClientError::runtime(
                    "Error while retrieving the list of workspaces from Extralit.",
                    e,
                )
            })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Users linked to the workspace. Requires the owner or admin role.
    pub async fn users(&self) -> Result<Vec<UserModel>> {
        self.client
            .require_role("Workspace::users", &[UserRole::Owner, UserRole::Admin])
            .await?;

        let id = self.model.id.to_string();
        self.client
            .get_json(&["api", "workspaces", &id, "users"])
            .await
            .map_err(|e| {
                ClientError::runtime(
                    format!("Error while listing users of workspace with id=`{}`.", id),
                    e,
                )
            })
    }

    /// Look up the user targeted by a membership change.
    async fn membership_target(&self, user_id: Uuid) -> Result<User> {
        match User::from_id(&self.client, user_id).await {
            Ok(user) => Ok(user),
            Err(ClientError::Value { source, .. }) => Err(ClientError::Value {
                message: format!(
                    "User with id=`{}` doesn't exist in Extralit, so please make sure that \
                     the ID you provided is a valid one. Otherwise, you can create a new one \
                     via the `User::create` method.",
                    user_id
                ),
                source,
            }),
            Err(ClientError::Runtime { source, .. }) => Err(ClientError::Runtime {
                message: format!(
                    "Error while retrieving user with id=`{}` from Extralit.",
                    user_id
                ),
                source,
            }),
            Err(e) => Err(e),
        }
    }

    /// Add an existing user to the workspace. Requires the owner role.
    ///
    /// Owners are superusers with access to every workspace, so adding one is
    /// skipped with a warning.
    pub async fn add_user(&self, user_id: Uuid) -> Result<Membership> {
        self.client
            .require_role("Workspace::add_user", &[UserRole::Owner])
            .await?;

        let user = self.membership_target(user_id).await?;
        if user.is_owner() {
            warn!(
                user_id = %user_id,
                workspace = %self.model.name,
                "The user you are trying to add to the workspace has the `owner` role, so it \
                 will be excluded from the workspace. Users with the `owner` role are \
                 superusers and can access all the workspaces and datasets."
            );
            return Ok(Membership::OwnerSkipped);
        }

        let id = self.model.id.to_string();
        let user_id_str = user_id.to_string();
        match self
            .client
            .post(&["api", "workspaces", &id, "users", &user_id_str])
            .await
        {
            Ok(()) => {
                info!(user_id = %user_id, workspace = %self.model.name, "User added to workspace");
                Ok(Membership::Changed)
            }
            Err(e @ ApiError::AlreadyExists(_)) => Err(ClientError::value(
                format!(
                    "User with id=`{}` already exists in workspace with id=`{}`.",
                    user_id, id
                ),
                e,
            )),
            Err(e) => Err(ClientError::runtime(
                format!(
                    "Error while adding user with id=`{}` to workspace with id=`{}`.",
                    user_id, id
                ),
                e,
            )),
        }
    }

    /// Remove a user from the workspace, without deleting the user. Requires the owner role.
    ///
    /// Owners are skipped with a warning, as in [`Workspace::add_user`].
    pub async fn delete_user(&self, user_id: Uuid) -> Result<Membership> {
        self.client
            .require_role("Workspace::delete_user", &[UserRole::Owner])
            .await?;

        let user = self.membership_target(user_id).await?;
        if user.is_owner() {
            warn!(
                user_id = %user_id,
                workspace = %self.model.name,
                "The user you are trying to delete from the workspace has the `owner` role, so \
                 it will be excluded from the workspace. Users with the `owner` role are \
                 superusers and can access all the workspaces and datasets."
            );
            return Ok(Membership::OwnerSkipped);
        }

        let id = self.model.id.to_string();
        let user_id_str = user_id.to_string();
        match self
            .client
            .delete(&["api", "workspaces", &id, "users", &user_id_str])
            .await
        {
            Ok(()) => {
                info!(user_id = %user_id, workspace = %self.model.name, "User removed from workspace");
                Ok(Membership::Changed)
            }
            Err(e @ ApiError::NotFound(_)) => Err(ClientError::value(
                format!(
                    "Either the user with id=`{}` doesn't exist in Extralit, or it doesn't \
                     belong to workspace with id=`{}`.",
                    user_id, id
                ),
                e,
            )),
            Err(e) => Err(ClientError::runtime(
                format!(
                    "Error while deleting user with id=`{}` from workspace with id=`{}`.",
                    user_id, id
                ),
                e,
            )),
        }
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete the workspace. Requires the owner role.
    ///
    /// The workspace's documents are deleted first; failures there are only
    /// logged. The workspace itself cannot be deleted while datasets are
    /// still linked to it.
    pub async fn delete(&self) -> Result<()> {
        self.client
            .require_role("Workspace::delete", &[UserRole::Owner])
            .await?;

        let id = self.model.id.to_string();

        match self
            .client
            .delete(&["api", "v1", "workspaces", &id, "documents"])
            .await
        {
            Ok(()) => {}
            Err(e @ ApiError::NotFound(_)) => {
                warn!(workspace_id = %id, error = %e, "Workspace doesn't exist while deleting its documents");
            }
            Err(e) => {
                warn!(workspace_id = %id, error = %e, "Error while deleting documents of workspace");
            }
        }

        match self.client.delete(&["api", "v1", "workspaces", &id]).await {
            Ok(()) => {
                info!(workspace_id = %id, name = %self.model.name, "Workspace deleted");
                Ok(())
            }
            Err(e @ ApiError::NotFound(_)) => Err(ClientError::value(
                format!("Workspace with id {} doesn't exist in Extralit.", id),
                e,
            )),
            Err(e @ ApiError::AlreadyExists(_)) => Err(ClientError::value(
                format!(
                    "Cannot delete workspace with id {}. Some datasets are still linked to \
                     this workspace.",
                    id
                ),
                e,
            )),
            Err(e) => Err(ClientError::runtime(
                format!("Error while deleting workspace with id {}.", id),
                e,
            )),
        }
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// The workspace's file storage.
    pub fn files(&self) -> WorkspaceFiles {
        WorkspaceFiles::new(&self.client, &self.model.name)
    }

    /// List files under `path`. Requires the owner or admin role.
    pub async fn list_files(
        &self,
        path: &str,
        recursive: bool,
        include_version: bool,
    ) -> Result<ListObjectsResponse> {
        self.client
            .require_role("Workspace::list_files", &[UserRole::Owner, UserRole::Admin])
            .await?;

        self.files()
            .list(path, recursive, include_version)
            .await
            .map_err(|e| {
                ClientError::runtime(
                    format!("Error listing files in workspace with name=`{}`.", self.model.name),
                    e,
                )
            })
    }

    /// Delete a file, or one version of it. Requires the owner or admin role.
    pub async fn delete_file(&self, path: &str, version_id: Option<String>) -> Result<()> {
        self.client
            .require_role("Workspace::delete_file", &[UserRole::Owner, UserRole::Admin])
            .await?;

        self.files().delete(path, version_id).await.map_err(|e| {
            ClientError::runtime(
                format!(
                    "Error deleting file `{}` from workspace with name=`{}`.",
                    path, self.model.name
                ),
                e,
            )
        })
    }

    // =========================================================================
    // Schemas
    // =========================================================================

    /// Schemas stored under `prefix`, skipping the names in `exclude`.
    pub async fn get_schemas(&self, prefix: &str, exclude: &[String]) -> Result<SchemaStructure> {
        schemas::fetch_schemas(&self.files(), prefix, exclude)
            .await
            .map_err(|e| {
                ClientError::runtime(
                    format!("Error getting schemas from workspace with name=`{}`.", self.model.name),
                    e,
                )
            })
    }

    /// Store a new schema. Requires the owner or admin role.
    ///
    /// Fails when a byte-identical copy is already stored under the same name.
    pub async fn add_schema(&self, schema: &Schema, prefix: &str) -> Result<FileObjectResponse> {
        self.client
            .require_role("Workspace::add_schema", &[UserRole::Owner, UserRole::Admin])
            .await?;

        schemas::add_schema(&self.files(), schema, prefix).await
    }

    /// Upload schemas, skipping unmodified ones when `check_existing`.
    /// Requires the owner or admin role.
    pub async fn update_schemas(
        &self,
        schemas: &SchemaStructure,
        check_existing: bool,
        prefix: &str,
    ) -> Result<SchemaSyncReport> {
        self.client
            .require_role("Workspace::update_schemas", &[UserRole::Owner, UserRole::Admin])
            .await?;

        let report = schemas::update_schemas(&self.files(), schemas, check_existing, prefix).await?;
        info!(
            workspace = %self.model.name,
            uploaded = report.uploaded.len(),
            skipped = report.skipped.len(),
            "Schemas updated"
        );
        Ok(report)
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Workspace(id={}, name={}, inserted_at={}, updated_at={})",
            self.model.id, self.model.name, self.model.inserted_at, self.model.updated_at
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn test_display() {
        let client = Client::new(ClientConfig::new("http://localhost:6900", "key")).unwrap();
        let model: WorkspaceModel = serde_json::from_value(serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "team",
            "inserted_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }))
        .unwrap();
        let workspace = Workspace::new_instance(&client, model);

        let shown = workspace.to_string();
        assert!(shown.starts_with("Workspace(id=00000000-0000-0000-0000-000000000001, name=team"));
        assert_eq!(workspace.files().workspace(), "team");
    }
}
