//! `login`, `logout`, `whoami` and `info`.

use crate::callback::{init_callback, CliExit};
use crate::rich::echo_in_panel;
use clap::Args;
use extralit_client::{Client, ClientConfig, Credentials, Workspace};
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// URL of the Extralit server
    #[arg(long)]
    pub api_url: Option<String>,

    /// API key of the user
    #[arg(long)]
    pub api_key: Option<String>,

    /// Default workspace for later commands
    #[arg(long)]
    pub workspace: Option<String>,

    /// Extra header sent with every request, as NAME=VALUE
    #[arg(long = "extra-headers", value_parser = parse_header)]
    pub extra_headers: Vec<(String, String)>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid header `{}`, expected NAME=VALUE", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid header `{}`, the name is empty", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Flags take precedence over `EXTRALIT_*` variables.
fn login_config(args: LoginArgs, env: Option<ClientConfig>) -> anyhow::Result<ClientConfig> {
    let mut config = match (args.api_url, args.api_key, env) {
        (Some(url), Some(key), env) => {
            let mut config = ClientConfig::new(url, key);
            config.workspace = env.and_then(|env| env.workspace);
            config
        }
        (url, key, Some(mut env)) => {
            if let Some(url) = url {
                env.api_url = url;
            }
            if let Some(key) = key {
                env.api_key = key;
            }
            env
        }
        _ => anyhow::bail!(
            "Both --api-url and --api-key are required, unless EXTRALIT_API_URL and \
             EXTRALIT_API_KEY are set."
        ),
    };

    if let Some(workspace) = args.workspace {
        config.workspace = Some(workspace);
    }
    for (name, value) in args.extra_headers {
        config = config.with_header(name, value);
    }
    config.validate()?;
    Ok(config)
}

pub async fn login(args: LoginArgs) -> anyhow::Result<()> {
    let config = login_config(args, ClientConfig::from_env().ok())?;

    let client = match Client::connect(config.clone()).await {
        Ok(client) => client,
        Err(e) => {
            debug!(error = %e, "Login failed");
            echo_in_panel(
                &format!("Could not login to the Extralit server at {}: {}", config.api_url, e),
                "Login failed",
                false,
            );
            return Err(CliExit::failure().into());
        }
    };

    if let Some(workspace) = client.workspace() {
        Workspace::from_name(&client, workspace).await?;
    }

    let credentials = Credentials {
        api_url: client.api_url().to_string(),
        api_key: config.api_key,
        workspace: config.workspace,
        extra_headers: config.extra_headers,
    };
    let path = credentials.save()?;
    info!(path = %path.display(), "Credentials saved");

    let me = client.me().await?;
    echo_in_panel(
        &format!(
            "Logged in successfully to {} server as {}!",
            client.api_url(),
            me.username
        ),
        "Logged in",
        true,
    );
    Ok(())
}

pub async fn logout() -> anyhow::Result<()> {
    init_callback().await?;
    Credentials::remove()?;
    echo_in_panel("Logged out successfully!", "Logout", true);
    Ok(())
}

pub async fn whoami(client: &Client) -> anyhow::Result<()> {
    let me = client.me().await?;
    let workspaces = me.workspaces.as_deref().unwrap_or_default().join(", ");

    echo_in_panel(
        &format!(
            "Username: {}\nRole: {}\nFirst name: {}\nLast name: {}\nAPI Key: {}\nWorkspaces: {}",
            me.username,
            me.role,
            me.first_name,
            me.last_name.as_deref().unwrap_or("-"),
            me.api_key.as_deref().unwrap_or("-"),
            workspaces
        ),
        "Current User",
        true,
    );
    Ok(())
}

pub async fn info(client: &Client) -> anyhow::Result<()> {
    let server = client.server_info().await?;
    echo_in_panel(
        &format!(
            "Connected to Extralit server: {}\nServer version: {}\nClient version: {}",
            client.api_url(),
            server.version,
            env!("CARGO_PKG_VERSION")
        ),
        "Extralit Info",
        true,
    );
    Ok(())
}
