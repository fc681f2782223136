//! Main Extralit client.

use crate::config::{ClientConfig, API_KEY_HEADER};
use crate::credentials::Credentials;
use crate::error::{ApiError, ApiResult, ClientError, Result};
use crate::types::{ApiErrorBody, ServerInfo, UserModel, UserRole};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// Client for an Extralit server.
///
/// Cheap to clone; every handle (`Workspace`, `User`, `WorkspaceFiles`)
/// keeps its own clone.
///
/// # Example
///
/// ```ignore
/// use extralit_client::{Client, ClientConfig, Workspace};
///
/// let client = Client::connect(ClientConfig::new("http://localhost:6900", "owner.apikey")).await?;
/// let workspace = Workspace::from_name(&client, "my-workspace").await?;
/// println!("{}", workspace);
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    base_url: Url,
    me: RwLock<Option<UserModel>>,
}

impl Client {
    /// Create a new client with the given configuration.
    ///
    /// No request is sent; use [`Client::connect`] to also verify the server.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(config.normalized_url())
            .map_err(|e| ClientError::Config(format!("Invalid API URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("extralit-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::runtime("Failed to build HTTP client", e.into()))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                base_url,
                me: RwLock::new(None),
            }),
        })
    }

    /// Create a client and check that the server answers with the current user.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config)?;
        let me = client.me().await.map_err(|e| match e {
            ClientError::Runtime { source, .. } => ClientError::Runtime {
                message: format!(
                    "The Extralit server at {} is not available or not responding",
                    client.api_url()
                ),
                source,
            },
            other => other,
        })?;

        info!(
            url = %client.api_url(),
            username = %me.username,
            role = %me.role,
            "Connected to server"
        );
        Ok(client)
    }

    /// Connect using stored credentials.
    pub async fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Self::connect(credentials.to_config()).await
    }

    /// Base URL of the server, without trailing slash.
    pub fn api_url(&self) -> &str {
        self.inner.config.normalized_url()
    }

    /// Default workspace name, if configured.
    pub fn workspace(&self) -> Option<&str> {
        self.inner.config.workspace.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The user owning the API key. Fetched once, then cached.
    pub async fn me(&self) -> Result<UserModel> {
        if let Some(me) = self.inner.me.read().await.as_ref() {
            return Ok(me.clone());
        }

        let me: UserModel = self
            .get_json(&["api", "me"])
            .await
            .map_err(|e| ClientError::runtime("Error while retrieving the current user", e))?;

        *self.inner.me.write().await = Some(me.clone());
        Ok(me)
    }

    /// Server version information.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.get_json(&["api", "_info"])
            .await
            .map_err(|e| ClientError::runtime("Error while retrieving server info", e))
    }

    /// Fail with [`ClientError::Permission`] unless the current user has one of `allowed`.
    pub async fn require_role(&self, operation: &str, allowed: &[UserRole]) -> Result<()> {
        let me = self.me().await?;
        if allowed.contains(&me.role) {
            Ok(())
        } else {
            Err(ClientError::Permission {
                operation: operation.to_string(),
                role: me.role,
                allowed: allowed.to_vec(),
            })
        }
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    pub(crate) fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments.iter().map(AsRef::as_ref));
        }
        url
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let config = &self.inner.config;
        let mut builder = self
            .inner
            .http
            .request(method, url)
            .header(API_KEY_HEADER, &config.api_key);
        for (name, value) in &config.extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    /// Send a request and turn non-success statuses into [`ApiError`]s.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ApiError::Unreachable(e.to_string())
            } else {
                ApiError::Transport(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.message())
            .unwrap_or(text);

        debug!(status = %status, error = %message, "Request failed");
        Err(ApiError::from_status(status.as_u16(), message))
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Payload(format!("Failed to parse response: {}", e)))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.endpoint(segments);
        debug!(url = %url, "GET");
        let response = self.send(self.request(Method::GET, url)).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, segments: &[&str], body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        debug!(url = %url, "POST");
        let mut builder = self.request(Method::POST, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// POST without a body, ignoring the response content.
    pub(crate) async fn post(&self, segments: &[&str]) -> ApiResult<()> {
        let url = self.endpoint(segments);
        debug!(url = %url, "POST");
        self.send(self.request(Method::POST, url)).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> ApiResult<()> {
        let url = self.endpoint(segments);
        debug!(url = %url, "DELETE");
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url())
            .field("workspace", &self.workspace())
            .finish_non_exhaustive()
    }
}
