//! Table schemas stored in a workspace, and their synchronization.
//!
//! A schema is kept as a JSON document at `<prefix>/<schema name>` in the
//! workspace's file storage. The storage is versioned, so the same name can
//! appear several times in a listing; only the latest version counts.

use crate::error::{ApiError, ApiResult, ClientError, Result};
use crate::store::{has_extension, object_path, ObjectStore};
use crate::types::{FileObjectResponse, ListObjectsResponse};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Prefix under which schemas are stored in a workspace.
pub const DEFAULT_SCHEMA_PREFIX: &str = "schemas";

/// A DataFrame schema document.
///
/// The whole document is kept as one ordered JSON object so that key order
/// and unknown keys written by other tools survive. A schema read with
/// [`Schema::from_json`] also keeps its original bytes, which are written
/// back unchanged until the schema is modified.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    document: Map<String, Value>,
    raw: Option<Vec<u8>>,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

/// Definition of one column, used to build schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub dtype: String,
    pub nullable: bool,
    pub unique: bool,
    pub required: bool,
    pub description: Option<String>,
}

impl Column {
    pub fn new(dtype: impl Into<String>) -> Self {
        Self {
            dtype: dtype.into(),
            nullable: false,
            unique: false,
            required: true,
            description: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_value(&self) -> Value {
        json!({
            "title": null,
            "description": self.description,
            "dtype": self.dtype,
            "nullable": self.nullable,
            "checks": null,
            "unique": self.unique,
            "coerce": false,
            "required": self.required,
            "regex": false,
        })
    }
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut document = Map::new();
        document.insert("schema_type".into(), json!("dataframe"));
        document.insert("name".into(), json!(name));
        document.insert("columns".into(), Value::Object(Map::new()));
        document.insert("checks".into(), Value::Null);
        document.insert("index".into(), Value::Null);
        document.insert("coerce".into(), json!(false));
        document.insert("strict".into(), json!(false));
        document.insert("ordered".into(), json!(false));
        Self {
            name,
            document,
            raw: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column specs, in document order.
    pub fn columns(&self) -> Option<&Map<String, Value>> {
        self.document.get("columns").and_then(Value::as_object)
    }

    /// Any top-level key of the document.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn with_column(mut self, name: impl Into<String>, column: &Column) -> Self {
        let columns = self
            .document
            .entry("columns")
            .or_insert_with(|| Value::Object(Map::new()));
        if !columns.is_object() {
            *columns = Value::Object(Map::new());
        }
        if let Value::Object(columns) = columns {
            columns.insert(name.into(), column.to_value());
        }
        self.raw = None;
        self
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns()
            .into_iter()
            .flat_map(|columns| columns.keys().map(String::as_str))
    }

    /// Encode the document.
    ///
    /// A parsed, unmodified schema gives back the bytes it was read from.
    /// Otherwise the document is written as pretty JSON in key order, so
    /// equal schemas give identical bytes.
    pub fn to_json(&self) -> Vec<u8> {
        match &self.raw {
            Some(raw) => raw.clone(),
            // A map of JSON values with string keys always serializes
            None => serde_json::to_vec_pretty(&self.document).unwrap_or_default(),
        }
    }

    /// Decode a schema document. Documents without a name are rejected.
    pub fn from_json(bytes: &[u8]) -> ApiResult<Self> {
        let document: Map<String, Value> = serde_json::from_slice(bytes)
            .map_err(|e| ApiError::Payload(format!("Invalid schema document: {}", e)))?;

        let name = match document.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            Some(Value::String(_)) => {
                return Err(ApiError::Payload("Schema document has an empty name".into()))
            }
            _ => return Err(ApiError::Payload("Schema document has no name".into())),
        };
        match document.get("columns") {
            None | Some(Value::Object(_)) | Some(Value::Null) => {}
            Some(_) => {
                return Err(ApiError::Payload(format!(
                    "Schema `{}` has malformed columns",
                    name
                )))
            }
        }

        Ok(Self {
            name,
            document,
            raw: Some(bytes.to_vec()),
        })
    }
}

/// An ordered set of schemas, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaStructure {
    schemas: Vec<Schema>,
}

impl SchemaStructure {
    /// Build from a list; later duplicates of a name are dropped.
    pub fn new(schemas: impl IntoIterator<Item = Schema>) -> Self {
        let mut seen = HashSet::new();
        let schemas = schemas
            .into_iter()
            .filter(|s| seen.insert(s.name.clone()))
            .collect();
        Self { schemas }
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name.as_str()).collect()
    }

    /// Add a schema, replacing any schema with the same name in place.
    pub fn push(&mut self, schema: Schema) {
        match self.schemas.iter_mut().find(|s| s.name == schema.name) {
            Some(existing) => *existing = schema,
            None => self.schemas.push(schema),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Schema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn into_vec(self) -> Vec<Schema> {
        self.schemas
    }
}

impl<'a> IntoIterator for &'a SchemaStructure {
    type Item = &'a Schema;
    type IntoIter = std::slice::Iter<'a, Schema>;

    fn into_iter(self) -> Self::IntoIter {
        self.schemas.iter()
    }
}

/// Outcome of [`update_schemas`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSyncReport {
    /// Objects written, in schema order
    pub uploaded: ListObjectsResponse,
    /// Names left untouched because the stored copy was identical
    pub skipped: Vec<String>,
}

/// Whether a listed object is the current version of a schema document.
fn is_schema_object(object: &FileObjectResponse) -> bool {
    !has_extension(&object.object_name)
        && object.etag.as_deref().is_some_and(|etag| !etag.is_empty())
        && object.is_latest.unwrap_or(false)
}

/// Read every schema stored under `prefix`.
///
/// The first object seen for a name wins. Objects that cannot be fetched or
/// parsed are logged and skipped; a failing listing is an error.
pub async fn fetch_schemas<S>(store: &S, prefix: &str, exclude: &[String]) -> ApiResult<SchemaStructure>
where
    S: ObjectStore + ?Sized,
{
    let listing = store.list(prefix, true, true).await?;
    let mut schemas = SchemaStructure::default();

    for object in listing.objects.iter().filter(|o| is_schema_object(o)) {
        let fetched = store
            .get(&object.object_name, object.version_id.clone())
            .await
            .and_then(|bytes| Schema::from_json(&bytes));

        let schema = match fetched {
            Ok(schema) => schema,
            Err(e) => {
                warn!(object = %object.object_name, error = %e, "Unable to fetch schema");
                continue;
            }
        };

        if schemas.get(&schema.name).is_some() || exclude.contains(&schema.name) {
            continue;
        }
        schemas.push(schema);
    }

    debug!(prefix = %prefix, count = schemas.len(), "Fetched schemas");
    Ok(schemas)
}

/// Upload a single schema, refusing when an identical copy is already stored.
pub async fn add_schema<S>(store: &S, schema: &Schema, prefix: &str) -> Result<FileObjectResponse>
where
    S: ObjectStore + ?Sized,
{
    let path = object_path(prefix, &schema.name);
    let content = schema.to_json();

    let exists = store.exists(&path, &content).await.map_err(|e| {
        ClientError::runtime(format!("Error adding schema with name=`{}`.", schema.name), e)
    })?;
    if exists {
        return Err(ClientError::Value {
            message: format!("Schema with name=`{}` already exists.", schema.name),
            source: None,
        });
    }

    store.put(&path, content).await.map_err(|e| {
        ClientError::runtime(format!("Error adding schema with name=`{}`.", schema.name), e)
    })
}

async fn upload_if_changed<S>(
    store: &S,
    path: &str,
    content: Vec<u8>,
    check_existing: bool,
) -> ApiResult<Option<FileObjectResponse>>
where
    S: ObjectStore + ?Sized,
{
    if check_existing && store.exists(path, &content).await? {
        return Ok(None);
    }
    store.put(path, content).await.map(Some)
}

/// Upload every schema of `schemas`, overwriting older versions.
///
/// With `check_existing`, schemas whose stored copy is byte-identical are
/// skipped. The first failure aborts the pass.
pub async fn update_schemas<S>(
    store: &S,
    schemas: &SchemaStructure,
    check_existing: bool,
    prefix: &str,
) -> Result<SchemaSyncReport>
where
    S: ObjectStore + ?Sized,
{
    let mut report = SchemaSyncReport::default();

    for schema in schemas {
        let path = object_path(prefix, &schema.name);
        let content = schema.to_json();

        match upload_if_changed(store, &path, content, check_existing).await {
            Ok(Some(object)) => report.uploaded.objects.push(object),
            Ok(None) => {
                info!(schema = %schema.name, "Skipping schema update since it's unmodified");
                report.skipped.push(schema.name.clone());
            }
            Err(e) => {
                return Err(ClientError::runtime(
                    format!("Error adding schema '{}'.", schema.name),
                    e,
                ))
            }
        }
    }

    Ok(report)
}
