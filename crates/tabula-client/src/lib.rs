// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tabula_app::{
    ColumnName, GatewayError, Row, RowId, TableGateway, TableName, TableSnapshot,
};
use time::OffsetDateTime;
use url::Url;

/// HTTP gateway to the table backend. One request per operation, no retries;
/// every failure resolves to a `GatewayError` the caller can match on.
#[derive(Debug, Clone)]
pub struct Client {
    base: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }

        let base = Url::parse(trimmed)
            .with_context(|| format!("invalid server.base_url {trimmed:?}"))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            bail!(
                "server.base_url {trimmed:?} must use http or https, got {:?}",
                base.scheme()
            );
        }
        if base.cannot_be_a_base() {
            bail!("server.base_url {trimmed:?} cannot carry request paths");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Startup probe: the backend is reachable and answers the table listing.
    pub fn ping(&mut self) -> Result<()> {
        self.list_tables()
            .map(|_| ())
            .with_context(|| format!("backend check against {} failed", self.base))
    }

    // Table names come from user-visible lists, so they go through proper
    // path-segment encoding rather than string pasting.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn transport(&self, error: reqwest::Error) -> GatewayError {
        GatewayError::Transport(format!("{} ({error})", self.base))
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        what: &str,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| self.transport(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(fetch_failure(status, &body));
        }

        response
            .json()
            .map_err(|error| GatewayError::Decode(format!("{what}: {error}")))
    }

    fn post_action(
        &self,
        table: &TableName,
        action: &str,
        body: &Value,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(&["table", table.as_str(), action]);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(|error| self.transport(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(mutation_failure(status, &body));
        }
        Ok(())
    }
}

impl TableGateway for Client {
    fn list_tables(&mut self) -> Result<Vec<TableName>, GatewayError> {
        let parsed: TablesPayload = self.get_json(self.endpoint(&["tables"]), "table list")?;
        Ok(parsed.tables.into_iter().map(TableName::new).collect())
    }

    fn fetch_table(&mut self, table: &TableName) -> Result<TableSnapshot, GatewayError> {
        let parsed: TablePayload = self.get_json(
            self.endpoint(&["table", table.as_str()]),
            &format!("table {table}"),
        )?;

        let schema: Vec<ColumnName> = parsed.schema.into_iter().map(ColumnName::new).collect();
        let mut rows = Vec::with_capacity(parsed.rows.len());
        for (index, record) in parsed.rows.into_iter().enumerate() {
            let rowid = record
                .get("rowid")
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    GatewayError::Decode(format!(
                        "table {table}: row {index} is missing a numeric rowid"
                    ))
                })?;
            let cells = schema
                .iter()
                .map(|column| {
                    record
                        .get(column.as_str())
                        .map(render_scalar)
                        .unwrap_or_default()
                })
                .collect();
            rows.push(Row {
                rowid: RowId::new(rowid),
                cells,
            });
        }

        Ok(TableSnapshot::new(schema, rows, OffsetDateTime::now_utc()))
    }

    fn add_row(
        &mut self,
        table: &TableName,
        values: &[(ColumnName, String)],
    ) -> Result<(), GatewayError> {
        self.post_action(table, "add_row", &values_map(values))
    }

    fn update_row(
        &mut self,
        table: &TableName,
        rowid: RowId,
        values: &[(ColumnName, String)],
    ) -> Result<(), GatewayError> {
        self.post_action(
            table,
            "update_row",
            &serde_json::json!({
                "row_id": rowid.get(),
                "updated_values": values_map(values),
            }),
        )
    }

    fn delete_row(&mut self, table: &TableName, rowid: RowId) -> Result<(), GatewayError> {
        self.post_action(table, "delete_row", &serde_json::json!({ "row_id": rowid.get() }))
    }

    fn add_column(&mut self, table: &TableName, column: &ColumnName) -> Result<(), GatewayError> {
        self.post_action(
            table,
            "add_column",
            &serde_json::json!({ "column_name": column.as_str() }),
        )
    }

    fn rename_column(
        &mut self,
        table: &TableName,
        column: &ColumnName,
        replacement: &ColumnName,
    ) -> Result<(), GatewayError> {
        self.post_action(
            table,
            "update_column",
            &serde_json::json!({
                "old_column_name": column.as_str(),
                "new_column_name": replacement.as_str(),
            }),
        )
    }

    fn delete_column(
        &mut self,
        table: &TableName,
        column: &ColumnName,
    ) -> Result<(), GatewayError> {
        self.post_action(
            table,
            "delete_column",
            &serde_json::json!({ "column_name": column.as_str() }),
        )
    }
}

fn values_map(values: &[(ColumnName, String)]) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(column, value)| (column.as_str().to_owned(), Value::String(value.clone())))
            .collect(),
    )
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn fetch_failure(status: StatusCode, body: &str) -> GatewayError {
    let detail = extract_detail(status, body);
    match status.as_u16() {
        404 => GatewayError::NotFound(detail),
        _ => GatewayError::Status {
            status: status.as_u16(),
            detail,
        },
    }
}

// The backend reports refused mutations (schema-mismatched inserts, DDL that
// cannot apply) as 500 with a detail message.
fn mutation_failure(status: StatusCode, body: &str) -> GatewayError {
    let detail = extract_detail(status, body);
    match status.as_u16() {
        404 => GatewayError::NotFound(detail),
        409 => GatewayError::Conflict(detail),
        500 => GatewayError::Rejected(detail),
        _ => GatewayError::Status {
            status: status.as_u16(),
            detail,
        },
    }
}

fn extract_detail(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body)
        && let Some(detail) = parsed.detail
        && !detail.is_empty()
    {
        return detail;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 200 && !trimmed.contains('{') {
        return trimmed.to_owned();
    }

    format!("status {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct TablesPayload {
    tables: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TablePayload {
    schema: Vec<String>,
    rows: Vec<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Client, extract_detail, render_scalar};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn new_rejects_empty_base_url() {
        assert!(Client::new("", Duration::from_secs(1)).is_err());
        assert!(Client::new("///", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn new_rejects_non_http_schemes() {
        let error = Client::new("ftp://example.com", Duration::from_secs(1))
            .expect_err("ftp should be rejected");
        assert!(error.to_string().contains("http or https"));
    }

    #[test]
    fn new_trims_trailing_slashes() {
        let client = Client::new("http://localhost:3636///", Duration::from_secs(1))
            .expect("valid base url");
        assert_eq!(client.base_url(), "http://localhost:3636/");
    }

    #[test]
    fn endpoint_percent_encodes_table_names() {
        let client =
            Client::new("http://localhost:3636", Duration::from_secs(1)).expect("valid base url");
        let url = client.endpoint(&["table", "order items", "add_row"]);
        assert_eq!(url.path(), "/table/order%20items/add_row");
    }

    #[test]
    fn endpoint_preserves_base_path_prefix() {
        let client = Client::new("http://localhost:3636/api/", Duration::from_secs(1))
            .expect("valid base url");
        let url = client.endpoint(&["tables"]);
        assert_eq!(url.path(), "/api/tables");
    }

    #[test]
    fn render_scalar_covers_json_scalars() {
        assert_eq!(render_scalar(&json!("Ann")), "Ann");
        assert_eq!(render_scalar(&json!(42)), "42");
        assert_eq!(render_scalar(&json!(2.5)), "2.5");
        assert_eq!(render_scalar(&json!(true)), "true");
        assert_eq!(render_scalar(&json!(null)), "");
    }

    #[test]
    fn extract_detail_prefers_backend_detail_field() {
        let detail = extract_detail(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Column 'email' not found"}"#,
        );
        assert_eq!(detail, "Column 'email' not found");
    }

    #[test]
    fn extract_detail_falls_back_to_short_plain_bodies() {
        assert_eq!(
            extract_detail(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        let long_body = "x".repeat(500);
        assert_eq!(
            extract_detail(StatusCode::BAD_GATEWAY, &long_body),
            "status 502"
        );
        assert_eq!(
            extract_detail(StatusCode::INTERNAL_SERVER_ERROR, r#"{"whatever":1}"#),
            "status 500"
        );
    }
}
