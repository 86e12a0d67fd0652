//! Read-only HTTP accessor for the Grist API.
//!
//! Single-attempt requests with bearer auth; a failed call surfaces
//! immediately, callers decide what that means. Listing responses are
//! normalized before use because Grist deployments differ on shape (bare
//! array vs wrapping object).

use serde_json::{Map, Value};

use crate::config::Config;

use super::GristError;

/// Descriptor of one table in a Grist document.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub id: String,
}

/// One row of a Grist table: the record id plus its raw field map.
///
/// Field values stay untyped (`serde_json::Value`); the resolver applies
/// per-field fallback and coercion rules on top. Rows are never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRecord {
    pub id: i64,
    pub fields: Map<String, Value>,
}

/// Read-only Grist API client, holding base URL, API key and document id.
pub struct GristClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    doc_id: Option<String>,
}

impl GristClient {
    /// Build a client from configuration. The base URL's trailing slash is
    /// trimmed so path joining stays predictable.
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.grist_base_url.trim_end_matches('/').to_string(),
            api_key: config.grist_api_key.clone().unwrap_or_default(),
            doc_id: config.grist_doc_id.clone(),
        }
    }

    fn doc_id(&self) -> Result<&str, GristError> {
        self.doc_id.as_deref().ok_or(GristError::DocIdMissing)
    }

    async fn get_json(&self, url: &str) -> Result<Value, GristError> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GristError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// List the documents the API key can access (`GET /docs`).
    pub async fn list_documents(&self) -> Result<Vec<Value>, GristError> {
        let body = self.get_json(&format!("{}/docs", self.base_url)).await?;
        normalize_listing(body, "docs")
    }

    /// Fetch metadata for the configured document.
    pub async fn document_info(&self) -> Result<Value, GristError> {
        let doc = self.doc_id()?;
        self.get_json(&format!("{}/docs/{}", self.base_url, doc))
            .await
    }

    /// List the tables of the configured document.
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>, GristError> {
        let doc = self.doc_id()?;
        let body = self
            .get_json(&format!("{}/docs/{}/tables", self.base_url, doc))
            .await?;
        let tables = normalize_listing(body, "tables")?;
        Ok(tables
            .into_iter()
            .map(|t| serde_json::from_value(t).unwrap_or(TableInfo { id: String::new() }))
            .collect())
    }

    /// Fetch every row of a table, in server order.
    pub async fn table_records(&self, table_id: &str) -> Result<Vec<TableRecord>, GristError> {
        let doc = self.doc_id()?;
        let body = self
            .get_json(&format!(
                "{}/docs/{}/tables/{}/records",
                self.base_url, doc, table_id
            ))
            .await?;
        parse_records(body)
    }

    /// Fetch column metadata for a table.
    pub async fn table_columns(&self, table_id: &str) -> Result<Vec<Value>, GristError> {
        let doc = self.doc_id()?;
        let body = self
            .get_json(&format!(
                "{}/docs/{}/tables/{}/columns",
                self.base_url, doc, table_id
            ))
            .await?;
        match body.get("columns").and_then(Value::as_array) {
            Some(columns) => Ok(columns.clone()),
            None => Err(GristError::UnexpectedShape(body.to_string())),
        }
    }

    /// Connection self-test: list tables and report their ids.
    pub async fn check_connection(&self) -> Result<String, GristError> {
        let tables = self.list_tables().await?;
        let names: Vec<String> = tables.into_iter().map(|t| t.id).collect();
        Ok(format!(
            "Connexion réussie à Grist. Tables disponibles: {}",
            names.join(", ")
        ))
    }
}

/// Normalize a listing response: either a bare array, or an object wrapping
/// the array under `key`. Any other object is treated as a single-element
/// listing rather than rejected.
fn normalize_listing(body: Value, key: &str) -> Result<Vec<Value>, GristError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(GristError::UnexpectedShape(other.to_string())),
            None => Ok(vec![Value::Object(map)]),
        },
        other => Err(GristError::UnexpectedShape(other.to_string())),
    }
}

/// Extract [`TableRecord`]s from a `/records` response body.
///
/// Records lacking a `fields` member are skipped; the record id is kept
/// verbatim alongside a copy of the field map. Server order is preserved.
fn parse_records(body: Value) -> Result<Vec<TableRecord>, GristError> {
    let Some(records) = body.get("records").and_then(Value::as_array) else {
        return Err(GristError::UnexpectedShape(body.to_string()));
    };

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let Some(fields) = record.get("fields").and_then(Value::as_object) else {
            continue;
        };
        let id = record.get("id").and_then(Value::as_i64).unwrap_or_default();
        rows.push(TableRecord {
            id,
            fields: fields.clone(),
        });
    }
    Ok(rows)
}
