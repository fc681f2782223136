/// Extralit - command-line interface for the Extralit annotation server
mod callback;
mod commands;
mod rich;

use callback::{deprecated_database_cmd_callback, init_callback, CliExit};
use clap::{Parser, Subcommand};
use commands::{
    auth::LoginArgs, files::FilesCommand, schemas::SchemasCommand, users::UsersCommand,
    workspaces::WorkspacesCommand,
};
use extralit_client::Client;
use std::future::Future;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "extralit")]
#[command(about = "Extralit command-line interface", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to an Extralit server and store the credentials
    Login(LoginArgs),
    /// Remove the stored credentials
    Logout,
    /// Show the current user
    Whoami,
    /// Show server and client versions
    Info,
    /// Manage workspaces
    #[command(subcommand)]
    Workspaces(WorkspacesCommand),
    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),
    /// Read and upload table schemas
    #[command(subcommand)]
    Schemas(SchemasCommand),
    /// Browse workspace files
    #[command(subcommand)]
    Files(FilesCommand),
    /// Deprecated, use `extralit server database`
    #[command(hide = true)]
    Database {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "extralit_cli=info,extralit_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<CliExit>() {
            Some(exit) => ExitCode::from(exit.code),
            None => {
                tracing::debug!(error = ?e, "Command failed");
                rich::echo_in_panel(&format!("{:#}", e), "Error", false);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    dispatch(command, init_callback).await
}

/// Run `command`, calling `connect` for every command that needs a server.
async fn dispatch<F, Fut>(command: Commands, connect: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Client, CliExit>>,
{
    match command {
        Commands::Login(args) => commands::auth::login(args).await,
        Commands::Logout => commands::auth::logout().await,
        Commands::Database { args } => {
            Err(deprecated_database_cmd_callback(args.first().map(String::as_str)).into())
        }
        Commands::Whoami => commands::auth::whoami(&connect().await?).await,
        Commands::Info => commands::auth::info(&connect().await?).await,
        Commands::Workspaces(command) => commands::workspaces::run(&connect().await?, command).await,
        Commands::Users(command) => commands::users::run(&connect().await?, command).await,
        Commands::Schemas(command) => commands::schemas::run(&connect().await?, command).await,
        Commands::Files(command) => commands::files::run(&connect().await?, command).await,
    }
}
