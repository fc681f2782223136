//! Extralit Client
//!
//! HTTP client library for the Extralit annotation server API.
//!
//! # Features
//!
//! - **Workspaces**: create, look up, delete, manage members
//! - **Users**: look up, create, delete
//! - **Files**: list, fetch, upload and delete workspace files
//! - **Schemas**: read and synchronize table schemas stored in a workspace
//! - **Credentials**: the file written by `extralit login`
//!
//! # Example
//!
//! ```ignore
//! use extralit_client::{Client, Credentials, SchemaStructure, Workspace, DEFAULT_SCHEMA_PREFIX};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::from_credentials(&Credentials::load()?).await?;
//!
//!     let workspace = Workspace::from_name(&client, "my-workspace").await?;
//!     let schemas = workspace.get_schemas(DEFAULT_SCHEMA_PREFIX, &[]).await?;
//!     println!("Found schemas: {:?}", schemas.names());
//!
//!     let report = workspace.update_schemas(&schemas, true, DEFAULT_SCHEMA_PREFIX).await?;
//!     println!("Skipped {} unmodified schemas", report.skipped.len());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod credentials;
mod error;
mod files;
mod schemas;
mod store;
mod types;
mod users;
mod workspaces;

// Re-export main types
pub use client::Client;
pub use config::{ClientConfig, API_KEY_HEADER, DEFAULT_TIMEOUT_SECS};
pub use credentials::Credentials;
pub use error::{ApiError, ApiResult, ClientError, Result};
pub use types::{
    FileObjectResponse, ListObjectsResponse, NewUser, ServerInfo, UserModel, UserRole,
    WorkspaceModel,
};

// Handles
pub use users::User;
pub use workspaces::{Membership, Workspace};

// Storage and schema sync, usable with any `ObjectStore`
pub use files::WorkspaceFiles;
pub use schemas::{
    add_schema, fetch_schemas, update_schemas, Column, Schema, SchemaStructure, SchemaSyncReport,
    DEFAULT_SCHEMA_PREFIX,
};
pub use store::{has_extension, object_path, ObjectStore};
