//! Checks run before commands.

use crate::rich::echo_in_panel;
use extralit_client::{Client, ClientConfig, Credentials};
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const NOT_LOGGED_IN: &str =
    "You are not logged in. Please run 'extralit login' to login to the Extralit server.";

pub const SERVER_NOT_AVAILABLE: &str = "The Extralit Server you are logged in is not available \
     or not responding. Please make sure it's running and try again.";

/// Request to stop with an exit code. The reason has already been printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliExit {
    pub code: u8,
}

impl CliExit {
    pub fn failure() -> Self {
        Self { code: 1 }
    }
}

impl fmt::Display for CliExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.code)
    }
}

impl std::error::Error for CliExit {}

/// Connect with the stored credentials, or with `EXTRALIT_*` variables when
/// none are stored.
pub async fn init_callback() -> Result<Client, CliExit> {
    let path = Credentials::default_path();
    init_from(path.as_deref(), ClientConfig::from_env().ok()).await
}

pub(crate) async fn init_from(
    credentials_path: Option<&Path>,
    fallback: Option<ClientConfig>,
) -> Result<Client, CliExit> {
    let stored = credentials_path.filter(|path| Credentials::exists_at(path));

    let config = match (stored, fallback) {
        (Some(path), _) => match Credentials::load_from(path) {
            Ok(credentials) => credentials.to_config(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Unreadable credentials");
                return Err(not_logged_in());
            }
        },
        (None, Some(config)) => config,
        (None, None) => return Err(not_logged_in()),
    };

    Client::connect(config).await.map_err(|e| {
        debug!(error = %e, "Server check failed");
        echo_in_panel(SERVER_NOT_AVAILABLE, "Server not available", false);
        CliExit::failure()
    })
}

fn not_logged_in() -> CliExit {
    echo_in_panel(NOT_LOGGED_IN, "Not logged in", false);
    CliExit::failure()
}

/// Point users of the removed `database` commands to their new home.
pub fn deprecated_database_cmd_callback(invoked: Option<&str>) -> CliExit {
    let command = invoked.unwrap_or("<command>");
    echo_in_panel(
        &format!(
            "Instead you should run `extralit server database {}`",
            command
        ),
        "Deprecated command",
        false,
    );
    CliExit::failure()
}
