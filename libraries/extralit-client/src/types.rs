//! Types for Extralit API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// =============================================================================
// User Types
// =============================================================================

/// Role of a user on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Superuser, sees every workspace
    Owner,
    Admin,
    Annotator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "owner",
            UserRole::Admin => "admin",
            UserRole::Annotator => "annotator",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as returned by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserModel {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub username: String,
    pub role: UserRole,
    /// Names of the workspaces the user is linked to
    #[serde(default)]
    pub workspaces: Option<Vec<String>>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for user creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            first_name: username.clone(),
            last_name: None,
            username,
            password: password.into(),
            role: UserRole::Annotator,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_names(mut self, first_name: impl Into<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name;
        self
    }
}

// =============================================================================
// Workspace Types
// =============================================================================

/// A workspace as returned by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceModel {
    pub id: Uuid,
    pub name: String,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for workspace creation.
#[derive(Debug, Serialize)]
pub(crate) struct WorkspaceCreate<'a> {
    pub name: &'a str,
}

/// Paginated list envelope used by the v1 endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Items<T> {
    pub items: Vec<T>,
}

// =============================================================================
// File Types
// =============================================================================

/// Metadata of one object in a workspace's file store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileObjectResponse {
    pub bucket_name: String,
    pub object_name: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    /// Whether this entry is the newest version of the object
    #[serde(default)]
    pub is_latest: Option<bool>,
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl FileObjectResponse {
    /// Last path component of the object name.
    pub fn file_name(&self) -> &str {
        self.object_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.object_name)
    }
}

/// A listing of file objects.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ListObjectsResponse {
    pub objects: Vec<FileObjectResponse>,
}

impl ListObjectsResponse {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

// =============================================================================
// Server Info Types
// =============================================================================

/// Information about the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerInfo {
    pub version: String,
    #[serde(default)]
    pub elasticsearch: Option<serde_json::Value>,
}

// =============================================================================
// Error Types
// =============================================================================

/// Error body returned by the server, `{"detail": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    /// Human readable form of the detail, which may be a string or an object.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("params")
                .and_then(|p| p.get("detail"))
                .and_then(|d| d.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| self.detail.to_string()),
            other => other.to_string(),
        }
    }
}
