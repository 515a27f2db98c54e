// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{ColumnName, RowId, TableName, TableSnapshot};

/// Failure classes a gateway call can resolve to. Calls never panic across
/// this boundary and are never retried internally; callers decide what a
/// failure means for on-screen state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No response received: connection refused, DNS, timeout.
    #[error("cannot reach the backend: {0}")]
    Transport(String),
    /// A non-2xx response with no more specific meaning.
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },
    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response from the backend: {0}")]
    Decode(String),
    /// The table, row, or column no longer exists (404).
    #[error("not found: {0}")]
    NotFound(String),
    /// The change collides with existing state, e.g. a duplicate column (409).
    #[error("conflict: {0}")]
    Conflict(String),
    /// The backend refused the mutation outright, e.g. a schema-mismatched
    /// insert.
    #[error("backend rejected the change: {0}")]
    Rejected(String),
}

/// Typed operations against the table backend. Implemented over HTTP by
/// `tabula-client` and in-process by `tabula-testkit`.
pub trait TableGateway {
    fn list_tables(&mut self) -> Result<Vec<TableName>, GatewayError>;

    fn fetch_table(&mut self, table: &TableName) -> Result<TableSnapshot, GatewayError>;

    fn add_row(
        &mut self,
        table: &TableName,
        values: &[(ColumnName, String)],
    ) -> Result<(), GatewayError>;

    fn update_row(
        &mut self,
        table: &TableName,
        rowid: RowId,
        values: &[(ColumnName, String)],
    ) -> Result<(), GatewayError>;

    fn delete_row(&mut self, table: &TableName, rowid: RowId) -> Result<(), GatewayError>;

    fn add_column(&mut self, table: &TableName, column: &ColumnName) -> Result<(), GatewayError>;

    fn rename_column(
        &mut self,
        table: &TableName,
        column: &ColumnName,
        replacement: &ColumnName,
    ) -> Result<(), GatewayError>;

    fn delete_column(&mut self, table: &TableName, column: &ColumnName)
    -> Result<(), GatewayError>;
}
