// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{ColumnName, Row, RowId, TableSnapshot};

/// Uncommitted new row being composed. Fields are seeded from the current
/// schema, in schema order, and keep that order through submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDraft {
    pub fields: Vec<DraftField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftField {
    pub column: ColumnName,
    pub value: String,
}

impl RowDraft {
    pub fn seeded(schema: &[ColumnName]) -> Self {
        Self {
            fields: schema
                .iter()
                .map(|column| DraftField {
                    column: column.clone(),
                    value: String::new(),
                })
                .collect(),
        }
    }

    pub fn set(&mut self, index: usize, value: String) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value;
        }
    }

    pub fn values(&self) -> Vec<(ColumnName, String)> {
        self.fields
            .iter()
            .map(|field| (field.column.clone(), field.value.clone()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            bail!("table has no columns -- add a column before inserting rows");
        }
        Ok(())
    }
}

/// Uncommitted modification to one existing row, keyed by the backend rowid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub rowid: RowId,
    pub fields: Vec<DraftField>,
}

impl EditBuffer {
    /// Seeds the buffer from the row's currently displayed values.
    pub fn seeded(snapshot: &TableSnapshot, row: &Row) -> Self {
        Self {
            rowid: row.rowid,
            fields: snapshot
                .schema
                .iter()
                .enumerate()
                .map(|(index, column)| DraftField {
                    column: column.clone(),
                    value: row.cell(index).to_owned(),
                })
                .collect(),
        }
    }

    pub fn set(&mut self, index: usize, value: String) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value;
        }
    }

    pub fn values(&self) -> Vec<(ColumnName, String)> {
        self.fields
            .iter()
            .map(|field| (field.column.clone(), field.value.clone()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            bail!("nothing to update -- the table has no columns");
        }
        Ok(())
    }
}

/// A single uncommitted name for a column being composed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnDraft {
    pub name: String,
}

impl ColumnDraft {
    pub fn validate(&self) -> Result<ColumnName> {
        validate_column_name(&self.name)
    }
}

/// Uncommitted rename of one existing column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDraft {
    pub column: ColumnName,
    pub replacement: String,
}

impl RenameDraft {
    pub fn seeded(column: ColumnName) -> Self {
        let replacement = column.as_str().to_owned();
        Self {
            column,
            replacement,
        }
    }

    pub fn validate(&self) -> Result<ColumnName> {
        let replacement = validate_column_name(&self.replacement)?;
        if replacement == self.column {
            bail!("new column name matches the current one -- change it and retry");
        }
        Ok(replacement)
    }
}

// The backend splices column names into DDL, so only identifier-safe names are
// let through.
fn validate_column_name(raw: &str) -> Result<ColumnName> {
    let name = raw.trim();
    if name.is_empty() {
        bail!("column name is required -- enter a name and retry");
    }
    if name.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        bail!("column name {name:?} must not start with a digit");
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        bail!("column name {name:?} may only use letters, digits, and underscores");
    }
    Ok(ColumnName::new(name))
}
