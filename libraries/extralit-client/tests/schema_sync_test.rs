//! Schema synchronization against a mock workspace file store.

use extralit_client::{
    Client, ClientConfig, Column, Schema, SchemaStructure, Workspace, DEFAULT_SCHEMA_PREFIX,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WORKSPACE_ID: &str = "1f4c1b7e-2f0d-4c8a-a1b3-7d1e2c3b4a50";

fn publication() -> Schema {
    Schema::new("Publication")
        .with_column("title", &Column::new("str"))
        .with_column("year", &Column::new("int64").nullable())
}

fn author() -> Schema {
    Schema::new("Author").with_column("name", &Column::new("str").unique())
}

fn object_json(name: &str, version: &str, latest: bool, etag: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "bucket_name": "team",
        "object_name": name,
        "is_latest": latest,
        "etag": etag,
        "size": 128,
        "version_id": version
    })
}

/// Server with an admin user and a single workspace named `team`.
async fn setup() -> (MockServer, Workspace) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "6a7a1f2e-8e3b-4a51-9d5a-0c0e9f2a1b01",
            "first_name": "admin",
            "username": "admin",
            "role": "admin",
            "inserted_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me/workspaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": WORKSPACE_ID,
                "name": "team",
                "inserted_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let client = Client::connect(ClientConfig::new(server.uri(), "admin.apikey"))
        .await
        .unwrap();
    let workspace = Workspace::from_name(&client, "team").await.unwrap();
    (server, workspace)
}

// =============================================================================
// Fetch Tests
// =============================================================================

mod fetch {
    use super::*;

    #[tokio::test]
    async fn test_get_schemas_reads_latest_versions() {
        let (server, workspace) = setup().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/files/team/schemas"))
            .and(query_param("recursive", "true"))
            .and(query_param("include_version", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "objects": [
                    object_json("schemas/Publication", "v1", false, Some("e1")),
                    object_json("schemas/Publication", "v2", true, Some("e2")),
                    object_json("schemas/readme.md", "r1", true, Some("e3")),
                    object_json("schemas/Draft", "d1", true, None),
                    object_json("schemas/Broken", "b1", true, Some("e4")),
                    object_json("schemas/Author", "a1", true, Some("e5")),
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .and(query_param("version_id", "v2"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(publication().to_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a schema"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Author"))
            .and(query_param("version_id", "a1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(author().to_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/readme.md"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Draft"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let schemas = workspace
            .get_schemas(DEFAULT_SCHEMA_PREFIX, &[])
            .await
            .unwrap();
        assert_eq!(schemas.names(), vec!["Publication", "Author"]);
        assert_eq!(schemas.get("Publication"), Some(&publication()));
    }

    #[tokio::test]
    async fn test_get_schemas_with_exclusion() {
        let (server, workspace) = setup().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/files/team/schemas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "objects": [
                    object_json("schemas/Publication", "v1", true, Some("e1")),
                    object_json("schemas/Author", "a1", true, Some("e2")),
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(publication().to_json()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Author"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(author().to_json()))
            .mount(&server)
            .await;

        let schemas = workspace
            .get_schemas(DEFAULT_SCHEMA_PREFIX, &["Publication".to_string()])
            .await
            .unwrap();
        assert_eq!(schemas.names(), vec!["Author"]);
    }

    #[tokio::test]
    async fn test_listing_failure() {
        let (server, workspace) = setup().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/files/team/schemas"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = workspace
            .get_schemas(DEFAULT_SCHEMA_PREFIX, &[])
            .await
            .unwrap_err();
        assert!(err.is_runtime());
        assert!(err.to_string().contains("Error getting schemas"));
    }
}

// =============================================================================
// Update Tests
// =============================================================================

mod update {
    use super::*;

    #[tokio::test]
    async fn test_unmodified_schema_is_skipped() {
        let (server, workspace) = setup().await;

        // Stored copy of Publication matches; Author has never been stored
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(publication().to_json()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Author"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Object not found"
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/file/team/schemas/Author"))
            .respond_with(ResponseTemplate::new(200).set_body_json(object_json(
                "schemas/Author",
                "a2",
                true,
                Some("e9"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let schemas = SchemaStructure::new([publication(), author()]);
        let report = workspace
            .update_schemas(&schemas, true, DEFAULT_SCHEMA_PREFIX)
            .await
            .unwrap();

        assert_eq!(report.skipped, vec!["Publication".to_string()]);
        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.uploaded.objects[0].object_name, "schemas/Author");
        assert_eq!(report.uploaded.objects[0].version_id.as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_forced_update_uploads_everything() {
        let (server, workspace) = setup().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .respond_with(ResponseTemplate::new(200).set_body_json(object_json(
                "schemas/Publication",
                "v3",
                true,
                Some("e3"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let report = workspace
            .update_schemas(&SchemaStructure::new([publication()]), false, DEFAULT_SCHEMA_PREFIX)
            .await
            .unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.uploaded.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_aborts() {
        let (server, workspace) = setup().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/file/team/schemas/Author"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let schemas = SchemaStructure::new([publication(), author()]);
        let err = workspace
            .update_schemas(&schemas, false, DEFAULT_SCHEMA_PREFIX)
            .await
            .unwrap_err();
        assert!(err.is_runtime());
        assert!(err.to_string().contains("Error adding schema 'Publication'"));
    }

    #[tokio::test]
    async fn test_add_schema_refuses_identical_copy() {
        let (server, workspace) = setup().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/file/team/schemas/Publication"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(publication().to_json()))
            .mount(&server)
            .await;

        let err = workspace
            .add_schema(&publication(), DEFAULT_SCHEMA_PREFIX)
            .await
            .unwrap_err();
        assert!(err.is_value());
        assert!(err.to_string().contains("already exists"));
    }
}
