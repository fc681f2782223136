//! `schemas` subcommands.

use super::resolve_workspace;
use crate::rich::{echo_in_panel, echo_table, Table};
use anyhow::Context;
use clap::Subcommand;
use extralit_client::{Client, Schema, SchemaStructure, DEFAULT_SCHEMA_PREFIX};
use std::path::PathBuf;
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum SchemasCommand {
    /// List the schemas stored in a workspace
    List {
        /// Workspace name, defaults to the one saved at login
        #[arg(short, long)]
        workspace: Option<String>,
        /// Storage prefix of the schemas
        #[arg(long, default_value = DEFAULT_SCHEMA_PREFIX)]
        prefix: String,
        /// Schema names to leave out
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Upload schema documents, skipping unmodified ones
    Push {
        /// JSON schema documents
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long)]
        workspace: Option<String>,
        #[arg(long, default_value = DEFAULT_SCHEMA_PREFIX)]
        prefix: String,
        /// Upload every schema, even when the stored copy is identical
        #[arg(long)]
        no_check_existing: bool,
    },
}

async fn read_schemas(files: &[PathBuf]) -> anyhow::Result<SchemaStructure> {
    let mut schemas = Vec::with_capacity(files.len());
    for file in files {
        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let schema = Schema::from_json(&bytes)
            .with_context(|| format!("{} is not a schema document", file.display()))?;
        debug!(file = %file.display(), schema = %schema.name(), "Read schema");
        schemas.push(schema);
    }
    Ok(SchemaStructure::new(schemas))
}

pub async fn run(client: &Client, command: SchemasCommand) -> anyhow::Result<()> {
    match command {
        SchemasCommand::List {
            workspace,
            prefix,
            exclude,
        } => {
            let workspace = resolve_workspace(client, workspace.as_deref()).await?;
            let schemas = workspace.get_schemas(&prefix, &exclude).await?;

            let mut table = Table::new(
                format!("Schemas in {}", workspace.name()),
                ["Name", "Columns"],
            );
            for schema in &schemas {
                table.add_row([
                    schema.name().to_string(),
                    schema.column_names().collect::<Vec<_>>().join(", "),
                ]);
            }
            echo_table(&table);
        }
        SchemasCommand::Push {
            files,
            workspace,
            prefix,
            no_check_existing,
        } => {
            let schemas = read_schemas(&files).await?;
            let workspace = resolve_workspace(client, workspace.as_deref()).await?;
            let report = workspace
                .update_schemas(&schemas, !no_check_existing, &prefix)
                .await?;

            let uploaded: Vec<&str> = report
                .uploaded
                .objects
                .iter()
                .map(|object| object.file_name())
                .collect();
            echo_in_panel(
                &format!(
                    "Uploaded: {}\nUnmodified: {}",
                    display_names(&uploaded),
                    display_names(&report.skipped)
                ),
                "Schemas updated",
                true,
            );
        }
    }
    Ok(())
}

fn display_names<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extralit_client::Column;

    #[tokio::test]
    async fn test_read_schemas() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("publication.json");
        let duplicate = dir.path().join("publication-copy.json");

        let schema = Schema::new("Publication").with_column("title", &Column::new("str"));
        std::fs::write(&first, schema.to_json()).unwrap();
        std::fs::write(&duplicate, Schema::new("Publication").to_json()).unwrap();

        let schemas = read_schemas(&[first, duplicate]).await.unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas.get("Publication"), Some(&schema));
    }

    #[tokio::test]
    async fn test_read_invalid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, b"{\"columns\": {}}").unwrap();

        let err = read_schemas(&[file]).await.unwrap_err();
        assert!(err.to_string().contains("is not a schema document"));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_names::<&str>(&[]), "-");
        assert_eq!(display_names(&["a", "b"]), "a, b");
        assert_eq!(display_names(&["c".to_string()]), "c");
    }
}
