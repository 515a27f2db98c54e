// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ColumnName, ModeKind, RowId, TableGateway, TableName, TableView, ViewEvent, ViewMode,
};

/// Drives one table screen against a gateway: stages intents on the view,
/// performs the remote call, and reconciles the outcome. After any successful
/// mutation the selected table is reloaded exactly once, so the screen only
/// ever shows server-confirmed rows and columns.
pub struct TableSession<G> {
    gateway: G,
    view: TableView,
    tables: Vec<TableName>,
}

impl<G: TableGateway> TableSession<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            view: TableView::new(),
            tables: Vec::new(),
        }
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TableView {
        &mut self.view
    }

    pub fn tables(&self) -> &[TableName] {
        &self.tables
    }

    pub fn refresh_tables(&mut self) -> Vec<ViewEvent> {
        match self.gateway.list_tables() {
            Ok(tables) => {
                let count = tables.len();
                self.tables = tables;
                vec![ViewEvent::TablesRefreshed(count)]
            }
            Err(error) => vec![ViewEvent::StatusUpdated(format!(
                "could not list tables: {error}"
            ))],
        }
    }

    pub fn select_table(&mut self, table: &TableName) -> Vec<ViewEvent> {
        let (ticket, mut events) = self.view.begin_select(table.clone());
        let outcome = self.gateway.fetch_table(ticket.table());
        events.extend(self.view.complete_select(ticket, outcome));
        events
    }

    pub fn open_add_row(&mut self) -> Vec<ViewEvent> {
        self.view.open_add_row()
    }

    pub fn open_add_column(&mut self) -> Vec<ViewEvent> {
        self.view.open_add_column()
    }

    pub fn open_rename_column(&mut self, column: &ColumnName) -> Vec<ViewEvent> {
        self.view.open_rename_column(column)
    }

    pub fn open_edit_row(&mut self, rowid: RowId) -> Vec<ViewEvent> {
        self.view.open_edit_row(rowid)
    }

    pub fn cancel(&mut self) -> Vec<ViewEvent> {
        self.view.cancel()
    }

    /// Persists the open draft. On success the form closes and the table
    /// reloads; on failure the form stays open with the draft intact so the
    /// input can be corrected and retried.
    pub fn save(&mut self) -> Vec<ViewEvent> {
        let Some(table) = self.view.snapshot_table().cloned() else {
            return vec![ViewEvent::StatusUpdated("select a table first".to_owned())];
        };

        match self.view.mode().clone() {
            ViewMode::Browsing => {
                vec![ViewEvent::StatusUpdated("no open form to save".to_owned())]
            }
            ViewMode::AddingRow(draft) => {
                if let Err(error) = draft.validate() {
                    return vec![ViewEvent::StatusUpdated(error.to_string())];
                }
                match self.gateway.add_row(&table, &draft.values()) {
                    Ok(()) => self.reload_after_mutation(table, "row added"),
                    Err(error) => vec![ViewEvent::MutationFailed(error.to_string())],
                }
            }
            ViewMode::AddingColumn(draft) => {
                let column = match draft.validate() {
                    Ok(column) => column,
                    Err(error) => return vec![ViewEvent::StatusUpdated(error.to_string())],
                };
                match self.gateway.add_column(&table, &column) {
                    Ok(()) => {
                        self.reload_after_mutation(table, format!("column {column} added"))
                    }
                    Err(error) => vec![ViewEvent::MutationFailed(error.to_string())],
                }
            }
            ViewMode::RenamingColumn(draft) => {
                let replacement = match draft.validate() {
                    Ok(replacement) => replacement,
                    Err(error) => return vec![ViewEvent::StatusUpdated(error.to_string())],
                };
                match self
                    .gateway
                    .rename_column(&table, &draft.column, &replacement)
                {
                    Ok(()) => self.reload_after_mutation(
                        table,
                        format!("column {} renamed to {replacement}", draft.column),
                    ),
                    Err(error) => vec![ViewEvent::MutationFailed(error.to_string())],
                }
            }
            ViewMode::EditingRow(buffer) => {
                if let Err(error) = buffer.validate() {
                    return vec![ViewEvent::StatusUpdated(error.to_string())];
                }
                match self
                    .gateway
                    .update_row(&table, buffer.rowid, &buffer.values())
                {
                    Ok(()) => {
                        self.reload_after_mutation(table, format!("row {} updated", buffer.rowid))
                    }
                    Err(error) => vec![ViewEvent::MutationFailed(error.to_string())],
                }
            }
        }
    }

    /// Deletes a row. Only available while browsing; on failure the row stays
    /// visible since nothing was confirmed.
    pub fn delete_row(&mut self, rowid: RowId) -> Vec<ViewEvent> {
        let Some(table) = self.browsing_table() else {
            return vec![ViewEvent::StatusUpdated(
                "finish the open form before deleting".to_owned(),
            )];
        };
        match self.gateway.delete_row(&table, rowid) {
            Ok(()) => self.reload_after_mutation(table, format!("row {rowid} deleted")),
            Err(error) => vec![ViewEvent::MutationFailed(error.to_string())],
        }
    }

    pub fn delete_column(&mut self, column: &ColumnName) -> Vec<ViewEvent> {
        let Some(table) = self.browsing_table() else {
            return vec![ViewEvent::StatusUpdated(
                "finish the open form before deleting".to_owned(),
            )];
        };
        match self.gateway.delete_column(&table, column) {
            Ok(()) => self.reload_after_mutation(table, format!("column {column} deleted")),
            Err(error) => vec![ViewEvent::MutationFailed(error.to_string())],
        }
    }

    fn browsing_table(&self) -> Option<TableName> {
        if self.view.mode_kind() != ModeKind::Browsing {
            return None;
        }
        self.view.snapshot_table().cloned()
    }

    // The mutation committed server-side, so the form closes regardless of
    // how the reload goes; a failed reload keeps the prior snapshot on screen
    // and is surfaced as its own, more serious, failure class.
    fn reload_after_mutation(
        &mut self,
        table: TableName,
        applied: impl Into<String>,
    ) -> Vec<ViewEvent> {
        let mut events = vec![ViewEvent::MutationApplied(applied.into())];
        let (ticket, begin_events) = self.view.begin_select(table);
        events.extend(begin_events);

        let outcome = self.gateway.fetch_table(ticket.table());
        for event in self.view.complete_select(ticket, outcome) {
            match event {
                ViewEvent::SelectionFailed { message, .. } => {
                    events.push(ViewEvent::ReloadFailed(format!(
                        "change saved, but reloading failed: {message}"
                    )));
                }
                other => events.push(other),
            }
        }
        events
    }
}
