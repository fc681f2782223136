//! User handles.

use crate::client::Client;
use crate::error::{ApiError, ClientError, Result};
use crate::types::{NewUser, UserModel, UserRole};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// A user on the Extralit server.
///
/// Obtained through [`User::me`], [`User::from_id`], [`User::from_name`],
/// [`User::list`] or [`User::create`].
#[derive(Debug, Clone)]
pub struct User {
    client: Client,
    model: UserModel,
}

impl User {
    fn new_instance(client: &Client, model: UserModel) -> Self {
        Self {
            client: client.clone(),
            model,
        }
    }

    pub fn id(&self) -> Uuid {
        self.model.id
    }

    pub fn username(&self) -> &str {
        &self.model.username
    }

    pub fn role(&self) -> UserRole {
        self.model.role
    }

    /// Workspace names the user belongs to, as reported by the server.
    pub fn workspaces(&self) -> &[String] {
        self.model.workspaces.as_deref().unwrap_or_default()
    }

    pub fn model(&self) -> &UserModel {
        &self.model
    }

    pub fn is_owner(&self) -> bool {
        self.model.role == UserRole::Owner
    }

    pub fn is_admin(&self) -> bool {
        self.model.role == UserRole::Admin
    }

    pub fn is_annotator(&self) -> bool {
        self.model.role == UserRole::Annotator
    }

    /// The user owning the client's API key.
    pub async fn me(client: &Client) -> Result<Self> {
        let model = client.me().await?;
        Ok(Self::new_instance(client, model))
    }

    /// Get an existing user by its ID.
    pub async fn from_id(client: &Client, id: Uuid) -> Result<Self> {
        let id_str = id.to_string();
        match client.get_json::<UserModel>(&["api", "users", &id_str]).await {
            Ok(model) => Ok(Self::new_instance(client, model)),
            Err(e @ ApiError::NotFound(_)) => Err(ClientError::value(
                format!(
                    "User with id=`{}` doesn't exist in Extralit, so please make sure that \
                     the ID you provided is a valid one. Otherwise, you can create a new one \
                     via the `User::create` method.",
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
                format!("Error while retrieving user with id=`{}` from Extralit.", id),
                e,
            )),
        }
    }

    /// Get an existing user by its username.
    pub async fn from_name(client: &Client, username: &str) -> Result<Self> {
        let users = Self::fetch_all(client).await?;
        users
            .into_iter()
            .find(|u| u.username == username)
            .map(|model| Self::new_instance(client, model))
            .ok_or_else(|| ClientError::Value {
                message: format!(
                    "User with username=`{}` doesn't exist in Extralit, so please create it \
                     via the `User::create` method.",
                    username
                ),
                source: None,
            })
    }

    /// List all the users. Requires the owner or admin role.
    pub async fn list(client: &Client) -> Result<Vec<Self>> {
        client
            .require_role("User::list", &[UserRole::Owner, UserRole::Admin])
            .await?;
        let users = Self::fetch_all(client).await?;
        Ok(users
            .into_iter()
            .map(|model| Self::new_instance(client, model))
            .collect())
    }

    async fn fetch_all(client: &Client) -> Result<Vec<UserModel>> {
        client
            .get_json(&["api", "users"])
            .await
            .map_err(|e| ClientError::runtime("Error while listing the users from Extralit.", e))
    }

    /// Create a new user. Requires the owner role.
    pub async fn create(client: &Client, user: &NewUser) -> Result<Self> {
        client
            .require_role("User::create", &[UserRole::Owner])
            .await?;

        debug!(username = %user.username, role = %user.role, "Creating user");

        match client.post_json(&["api", "users"], Some(user)).await {
            Ok(model) => {
                let created = Self::new_instance(client, model);
                info!(user_id = %created.id(), username = %created.username(), "User created");
                Ok(created)
            }
            Err(e @ ApiError::AlreadyExists(_)) => Err(ClientError::value(
                format!(
                    "User with username=`{}` already exists in Extralit.",
                    user.username
                ),
                e,
            )),
            Err(e @ ApiError::Validation(_)) => Err(ClientError::value(
                format!(
                    "Could not create user with username=`{}`, the provided fields are not valid.",
                    user.username
                ),
                e,
            )),
            Err(e) => Err(ClientError::runtime(
                format!(
                    "Error while creating user with username=`{}` in Extralit.",
                    user.username
                ),
                e,
            )),
        }
    }

    /// Delete this user from the server. Requires the owner role.
    pub async fn delete(&self) -> Result<()> {
        self.client
            .require_role("User::delete", &[UserRole::Owner])
            .await?;

        let id = self.model.id.to_string();
        match self.client.delete(&["api", "users", &id]).await {
            Ok(()) => {
                info!(user_id = %id, username = %self.model.username, "User deleted");
                Ok(())
            }
            Err(e @ ApiError::NotFound(_)) => Err(ClientError::value(
                format!("User with id=`{}` doesn't exist in Extralit.", id),
                e,
            )),
            Err(e) => Err(ClientError::runtime(
                format!("Error while deleting user with id=`{}` from Extralit.", id),
                e,
            )),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id={}, username={}, role={}, workspaces={:?}, inserted_at={}, updated_at={})",
            self.model.id,
            self.model.username,
            self.model.role,
            self.workspaces(),
            self.model.inserted_at,
            self.model.updated_at
        )
    }
}
