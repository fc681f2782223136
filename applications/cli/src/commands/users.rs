//! `users` subcommands.

use crate::rich::{echo_in_panel, echo_table, Table};
use clap::{Subcommand, ValueEnum};
use extralit_client::{Client, NewUser, User, UserRole};

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List all users
    List,
    /// Create a user
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Annotator, ignore_case = true)]
        role: RoleArg,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Delete a user
    Delete {
        username: String,
    },
}

/// Role given on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleArg {
    Owner,
    Admin,
    Annotator,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Owner => UserRole::Owner,
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Annotator => UserRole::Annotator,
        }
    }
}

pub async fn run(client: &Client, command: UsersCommand) -> anyhow::Result<()> {
    match command {
        UsersCommand::List => {
            let mut table = Table::new("Users", ["ID", "Username", "Role", "First name", "Last name", "Workspaces"]);
            for user in User::list(client).await? {
                let model = user.model();
                table.add_row([
                    model.id.to_string(),
                    model.username.clone(),
                    model.role.to_string(),
                    model.first_name.clone(),
                    model.last_name.clone().unwrap_or_default(),
                    user.workspaces().join(", "),
                ]);
            }
            echo_table(&table);
        }
        UsersCommand::Create {
            username,
            password,
            role,
            first_name,
            last_name,
        } => {
            let mut new_user = NewUser::new(&username, password).with_role(role.into());
            if first_name.is_some() || last_name.is_some() {
                new_user = new_user.with_names(first_name.unwrap_or_else(|| username.clone()), last_name);
            }
            let user = User::create(client, &new_user).await?;
            echo_in_panel(
                &format!(
                    "User with the username={} and role={} successfully created.",
                    user.username(),
                    user.role()
                ),
                "User created",
                true,
            );
        }
        UsersCommand::Delete { username } => {
            User::from_name(client, &username).await?.delete().await?;
            echo_in_panel(
                &format!("User with the username={} successfully deleted.", username),
                "User deleted",
                true,
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct UsersCli {
        #[command(subcommand)]
        command: UsersCommand,
    }

    fn create_role(args: &[&str]) -> Result<RoleArg, clap::Error> {
        let base = ["extralit", "create", "--username", "jane", "--password", "secret123"];
        let cli = UsersCli::try_parse_from(base.iter().chain(args))?;
        match cli.command {
            UsersCommand::Create { role, .. } => Ok(role),
            other => panic!("Expected create, got {:?}", other),
        }
    }

    #[test]
    fn test_role_argument() {
        assert_eq!(create_role(&[]).unwrap(), RoleArg::Annotator);
        assert_eq!(create_role(&["--role", "owner"]).unwrap(), RoleArg::Owner);
        assert_eq!(create_role(&["--role", "Admin"]).unwrap(), RoleArg::Admin);
        assert!(create_role(&["--role", "superuser"]).is_err());
        assert_eq!(UserRole::from(RoleArg::Admin), UserRole::Admin);
    }
}
