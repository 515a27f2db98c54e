// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ColumnDraft, ColumnName, EditBuffer, GatewayError, RenameDraft, RowDraft, RowId, TableName,
    TableSnapshot,
};

/// What the user is doing with the selected table. A mode owns its draft, so
/// at most one draft exists at a time and opening a new one closes the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    Browsing,
    AddingRow(RowDraft),
    AddingColumn(ColumnDraft),
    RenamingColumn(RenameDraft),
    EditingRow(EditBuffer),
}

impl ViewMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Browsing => ModeKind::Browsing,
            Self::AddingRow(_) => ModeKind::AddingRow,
            Self::AddingColumn(_) => ModeKind::AddingColumn,
            Self::RenamingColumn(_) => ModeKind::RenamingColumn,
            Self::EditingRow(_) => ModeKind::EditingRow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Browsing,
    AddingRow,
    AddingColumn,
    RenamingColumn,
    EditingRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    TablesRefreshed(usize),
    SelectionStarted(TableName),
    SnapshotReplaced(TableName),
    SelectionFailed { table: TableName, message: String },
    StaleResultDiscarded(TableName),
    ModeChanged(ModeKind),
    /// A mutation was confirmed by the backend.
    MutationApplied(String),
    /// The backend refused a mutation; nothing changed on either side.
    MutationFailed(String),
    /// The mutation committed but the follow-up reload failed; the screen
    /// shows the last confirmed snapshot until the next refresh.
    ReloadFailed(String),
    StatusUpdated(String),
}

/// Tag for one in-flight table fetch. A completion is applied only while its
/// ticket still names the current selection and no newer fetch was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    table: TableName,
    seq: u64,
}

impl FetchTicket {
    pub fn table(&self) -> &TableName {
        &self.table
    }
}

/// Client-visible state of one table screen: the selection, the last
/// server-confirmed snapshot, and the open draft, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    selected: Option<TableName>,
    current: Option<(TableName, TableSnapshot)>,
    mode: ViewMode,
    fetch_seq: u64,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

impl TableView {
    pub fn new() -> Self {
        Self {
            selected: None,
            current: None,
            mode: ViewMode::Browsing,
            fetch_seq: 0,
        }
    }

    /// The table the user most recently chose. May be ahead of `snapshot()`
    /// while a fetch is in flight.
    pub fn selected(&self) -> Option<&TableName> {
        self.selected.as_ref()
    }

    /// The table the displayed snapshot belongs to.
    pub fn snapshot_table(&self) -> Option<&TableName> {
        self.current.as_ref().map(|(table, _)| table)
    }

    pub fn snapshot(&self) -> Option<&TableSnapshot> {
        self.current.as_ref().map(|(_, snapshot)| snapshot)
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn is_idle(&self) -> bool {
        self.selected.is_none() && self.current.is_none()
    }

    /// Stages a selection. Any open draft from the previous table is
    /// discarded immediately; the snapshot stays visible until the fetch
    /// resolves.
    pub fn begin_select(&mut self, table: TableName) -> (FetchTicket, Vec<ViewEvent>) {
        let mut events = Vec::new();
        if self.mode.kind() != ModeKind::Browsing {
            self.mode = ViewMode::Browsing;
            events.push(ViewEvent::ModeChanged(ModeKind::Browsing));
        }

        self.selected = Some(table.clone());
        self.fetch_seq += 1;
        events.push(ViewEvent::SelectionStarted(table.clone()));

        (
            FetchTicket {
                table,
                seq: self.fetch_seq,
            },
            events,
        )
    }

    /// Applies a fetch outcome. Late results for a superseded selection are
    /// discarded without touching state.
    pub fn complete_select(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<TableSnapshot, GatewayError>,
    ) -> Vec<ViewEvent> {
        let current_target = self.selected.as_ref();
        if ticket.seq != self.fetch_seq || Some(&ticket.table) != current_target {
            return vec![ViewEvent::StaleResultDiscarded(ticket.table)];
        }

        match outcome {
            Ok(snapshot) => {
                self.current = Some((ticket.table.clone(), snapshot));
                self.mode = ViewMode::Browsing;
                vec![ViewEvent::SnapshotReplaced(ticket.table)]
            }
            Err(error) => {
                // Keep the previous table on screen rather than a blank one.
                self.selected = self.snapshot_table().cloned();
                vec![ViewEvent::SelectionFailed {
                    table: ticket.table,
                    message: error.to_string(),
                }]
            }
        }
    }

    pub fn open_add_row(&mut self) -> Vec<ViewEvent> {
        let Some(snapshot) = self.snapshot() else {
            return vec![status("select a table before adding rows")];
        };
        let draft = RowDraft::seeded(&snapshot.schema);
        self.mode = ViewMode::AddingRow(draft);
        vec![ViewEvent::ModeChanged(ModeKind::AddingRow)]
    }

    pub fn open_add_column(&mut self) -> Vec<ViewEvent> {
        if self.snapshot().is_none() {
            return vec![status("select a table before adding columns")];
        }
        self.mode = ViewMode::AddingColumn(ColumnDraft::default());
        vec![ViewEvent::ModeChanged(ModeKind::AddingColumn)]
    }

    pub fn open_rename_column(&mut self, column: &ColumnName) -> Vec<ViewEvent> {
        let Some(snapshot) = self.snapshot() else {
            return vec![status("select a table before renaming columns")];
        };
        if snapshot.column_index(column).is_none() {
            return vec![status(format!("no column named {column} to rename"))];
        }
        self.mode = ViewMode::RenamingColumn(RenameDraft::seeded(column.clone()));
        vec![ViewEvent::ModeChanged(ModeKind::RenamingColumn)]
    }

    pub fn open_edit_row(&mut self, rowid: RowId) -> Vec<ViewEvent> {
        let Some(snapshot) = self.snapshot() else {
            return vec![status("select a table before editing rows")];
        };
        let Some(row) = snapshot.row(rowid) else {
            return vec![status(format!("row {rowid} is gone -- reload the table"))];
        };
        let buffer = EditBuffer::seeded(snapshot, row);
        self.mode = ViewMode::EditingRow(buffer);
        vec![ViewEvent::ModeChanged(ModeKind::EditingRow)]
    }

    /// Discards the open draft without calling the gateway.
    pub fn cancel(&mut self) -> Vec<ViewEvent> {
        if self.mode.kind() == ModeKind::Browsing {
            return Vec::new();
        }
        self.mode = ViewMode::Browsing;
        vec![ViewEvent::ModeChanged(ModeKind::Browsing)]
    }

    pub fn row_draft_mut(&mut self) -> Option<&mut RowDraft> {
        match &mut self.mode {
            ViewMode::AddingRow(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn column_draft_mut(&mut self) -> Option<&mut ColumnDraft> {
        match &mut self.mode {
            ViewMode::AddingColumn(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn rename_draft_mut(&mut self) -> Option<&mut RenameDraft> {
        match &mut self.mode {
            ViewMode::RenamingColumn(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        match &mut self.mode {
            ViewMode::EditingRow(buffer) => Some(buffer),
            _ => None,
        }
    }
}

fn status(message: impl Into<String>) -> ViewEvent {
    ViewEvent::StatusUpdated(message.into())
}
