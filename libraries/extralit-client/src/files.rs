//! Workspace file storage over HTTP.

use crate::client::Client;
use crate::error::{ApiError, ApiResult};
use crate::store::ObjectStore;
use crate::types::{FileObjectResponse, ListObjectsResponse};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, info};
use url::Url;

/// The file storage of one workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceFiles {
    client: Client,
    workspace: String,
}

impl WorkspaceFiles {
    pub fn new(client: &Client, workspace: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// `/api/v1/{kind}/{workspace}/{path...}`, one URL segment per path component.
    fn url(&self, kind: &str, path: &str) -> Url {
        let mut segments = vec!["api", "v1", kind, self.workspace.as_str()];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.client.endpoint(&segments)
    }
}

#[async_trait]
impl ObjectStore for WorkspaceFiles {
    async fn list(
        &self,
        path: &str,
        recursive: bool,
        include_version: bool,
    ) -> ApiResult<ListObjectsResponse> {
        let url = self.url("files", path);
        debug!(url = %url, recursive, include_version, "Listing workspace files");

        let request = self.client.request(Method::GET, url).query(&[
            ("recursive", recursive.to_string()),
            ("include_version", include_version.to_string()),
        ]);
        let response = self.client.send(request).await?;
        let listing: ListObjectsResponse = Client::decode(response).await?;

        debug!(objects = listing.len(), "Listed workspace files");
        Ok(listing)
    }

    async fn get(&self, path: &str, version_id: Option<String>) -> ApiResult<Vec<u8>> {
        let url = self.url("file", path);
        debug!(url = %url, version_id = ?version_id, "Fetching workspace file");

        let mut request = self.client.request(Method::GET, url);
        if let Some(version_id) = &version_id {
            request = request.query(&[("version_id", version_id)]);
        }
        let response = self.client.send(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn put(&self, path: &str, content: Vec<u8>) -> ApiResult<FileObjectResponse> {
        let url = self.url("file", path);
        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        let size = content.len();
        debug!(url = %url, size, "Uploading workspace file");

        let part = Part::bytes(content)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .send(self.client.request(Method::POST, url).multipart(form))
            .await?;
        let object: FileObjectResponse = Client::decode(response).await?;

        info!(
            workspace = %self.workspace,
            object = %object.object_name,
            version_id = ?object.version_id,
            size,
            "File uploaded"
        );
        Ok(object)
    }

    async fn delete(&self, path: &str, version_id: Option<String>) -> ApiResult<()> {
        let url = self.url("file", path);
        debug!(url = %url, version_id = ?version_id, "Deleting workspace file");

        let mut request = self.client.request(Method::DELETE, url);
        if let Some(version_id) = &version_id {
            request = request.query(&[("version_id", version_id)]);
        }
        self.client.send(request).await?;

        info!(workspace = %self.workspace, path = %path, "File deleted");
        Ok(())
    }

    async fn exists(&self, path: &str, content: &[u8]) -> ApiResult<bool> {
        match self.get(path, None).await {
            Ok(remote) => Ok(remote == content),
            Err(ApiError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn test_url_splits_path() {
        let client = Client::new(ClientConfig::new("http://localhost:6900", "key")).unwrap();
        let files = WorkspaceFiles::new(&client, "my ws");

        assert_eq!(
            files.url("file", "schemas/Publication").as_str(),
            "http://localhost:6900/api/v1/file/my%20ws/schemas/Publication"
        );
        assert_eq!(
            files.url("files", "schemas/").as_str(),
            "http://localhost:6900/api/v1/files/my%20ws/schemas"
        );
        assert_eq!(
            files.url("files", "").as_str(),
            "http://localhost:6900/api/v1/files/my%20ws"
        );
    }
}
