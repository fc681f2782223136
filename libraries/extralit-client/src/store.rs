//! Remote object-store capability set used by the schema sync.

use crate::error::ApiResult;
use crate::types::{FileObjectResponse, ListObjectsResponse};
use async_trait::async_trait;

/// A versioned object store, such as a workspace's file storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects under `path`.
    async fn list(
        &self,
        path: &str,
        recursive: bool,
        include_version: bool,
    ) -> ApiResult<ListObjectsResponse>;

    /// Fetch an object's content, the latest version when `version_id` is `None`.
    async fn get(&self, path: &str, version_id: Option<String>) -> ApiResult<Vec<u8>>;

    /// Upload a new version of an object.
    async fn put(&self, path: &str, content: Vec<u8>) -> ApiResult<FileObjectResponse>;

    async fn delete(&self, path: &str, version_id: Option<String>) -> ApiResult<()>;

    /// Whether the latest object at `path` is byte-identical to `content`.
    ///
    /// A missing object is `Ok(false)`.
    async fn exists(&self, path: &str, content: &[u8]) -> ApiResult<bool>;
}

/// Join a prefix and an object name with a single `/`.
pub fn object_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Whether the last component of an object name carries a file extension.
///
/// Leading dots (hidden files) do not count as extensions.
pub fn has_extension(object_name: &str) -> bool {
    let file_name = object_name.rsplit('/').next().unwrap_or(object_name);
    let stem = file_name.trim_start_matches('.');
    stem.contains('.')
}
