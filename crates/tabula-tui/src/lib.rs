// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use crossterm::execute;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Cell, Clear, List, ListItem, ListState, Paragraph, Row as UiRow, Table as UiTable,
    TableState,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tabula_app::{ModeKind, TableGateway, TableSession, ViewEvent, ViewMode};

const STATUS_LINGER: Duration = Duration::from_secs(4);
const MIN_COLUMN_WIDTH: u16 = 6;
const MAX_COLUMN_WIDTH: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tables,
    Rows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UiState {
    focus: Focus,
    table_cursor: usize,
    row_cursor: usize,
    column_cursor: usize,
    field_cursor: usize,
    status: Option<String>,
    status_token: u64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Tables,
            table_cursor: 0,
            row_cursor: 0,
            column_cursor: 0,
            field_cursor: 0,
            status: None,
            status_token: 0,
        }
    }
}

enum FieldAction {
    Push(char),
    Pop,
}

pub fn run_app<G: TableGateway>(session: &mut TableSession<G>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut ui = UiState::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let events = session.refresh_tables();
    apply_events(&mut ui, &internal_tx, &events);
    // The caller may have loaded a start table already; otherwise open the
    // first listed one.
    if session.view().snapshot().is_none()
        && let Some(first) = session.tables().first().cloned()
    {
        let events = session.select_table(&first);
        apply_events(&mut ui, &internal_tx, &events);
    }
    if let Some(table) = session.view().snapshot_table() {
        ui.table_cursor = session
            .tables()
            .iter()
            .position(|candidate| candidate == table)
            .unwrap_or(0);
        ui.focus = Focus::Rows;
    }

    let mut result = Ok(());
    loop {
        process_internal_events(&mut ui, &internal_rx);
        clamp_cursors(session, &mut ui);

        if let Err(error) = terminal.draw(|frame| render(frame, session, &ui)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(session, &mut ui, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(ui: &mut UiState, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == ui.status_token => {
                ui.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn apply_events(ui: &mut UiState, tx: &Sender<InternalEvent>, events: &[ViewEvent]) {
    if let Some(message) = status_for_events(events) {
        set_status(ui, tx, message);
    }
    if events
        .iter()
        .any(|event| matches!(event, ViewEvent::SnapshotReplaced(_)))
    {
        ui.field_cursor = 0;
    }
}

fn set_status(ui: &mut UiState, tx: &Sender<InternalEvent>, message: String) {
    ui.status = Some(message);
    ui.status_token += 1;
    let token = ui.status_token;
    let tx = tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_LINGER);
        let _ = tx.send(InternalEvent::ClearStatus { token });
    });
}

/// The one line of feedback a batch of events boils down to. Failures win
/// over confirmations, confirmations over bookkeeping.
fn status_for_events(events: &[ViewEvent]) -> Option<String> {
    let mut best: Option<(u8, String)> = None;
    for event in events {
        let candidate = match event {
            ViewEvent::ReloadFailed(message) => Some((6, message.clone())),
            ViewEvent::MutationFailed(message) => Some((5, message.clone())),
            ViewEvent::SelectionFailed { message, .. } => Some((4, message.clone())),
            ViewEvent::StatusUpdated(message) => Some((3, message.clone())),
            ViewEvent::MutationApplied(message) => Some((2, message.clone())),
            ViewEvent::SnapshotReplaced(table) => Some((1, format!("loaded {table}"))),
            ViewEvent::TablesRefreshed(count) => Some((0, format!("{count} tables"))),
            ViewEvent::SelectionStarted(_)
            | ViewEvent::StaleResultDiscarded(_)
            | ViewEvent::ModeChanged(_) => None,
        };
        if let Some((rank, message)) = candidate
            && best.as_ref().is_none_or(|(top, _)| rank > *top)
        {
            best = Some((rank, message));
        }
    }
    best.map(|(_, message)| message)
}

fn clamp_cursors<G: TableGateway>(session: &TableSession<G>, ui: &mut UiState) {
    ui.table_cursor = clamp_cursor(session.tables().len(), ui.table_cursor);
    if let Some(snapshot) = session.view().snapshot() {
        ui.row_cursor = clamp_cursor(snapshot.rows.len(), ui.row_cursor);
        ui.column_cursor = clamp_cursor(snapshot.schema.len(), ui.column_cursor);
    } else {
        ui.row_cursor = 0;
        ui.column_cursor = 0;
    }
    ui.field_cursor = clamp_cursor(field_count(session), ui.field_cursor);
}

fn clamp_cursor(len: usize, cursor: usize) -> usize {
    if len == 0 { 0 } else { cursor.min(len - 1) }
}

fn field_count<G: TableGateway>(session: &TableSession<G>) -> usize {
    match session.view().mode() {
        ViewMode::Browsing => 0,
        ViewMode::AddingRow(draft) => draft.fields.len(),
        ViewMode::EditingRow(buffer) => buffer.fields.len(),
        ViewMode::AddingColumn(_) | ViewMode::RenamingColumn(_) => 1,
    }
}

fn handle_key_event<G: TableGateway>(
    session: &mut TableSession<G>,
    ui: &mut UiState,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if session.view().mode_kind() == ModeKind::Browsing {
        handle_nav_key(session, ui, tx, key)
    } else {
        handle_form_key(session, ui, tx, key);
        false
    }
}

fn handle_nav_key<G: TableGateway>(
    session: &mut TableSession<G>,
    ui: &mut UiState,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            ui.focus = match ui.focus {
                Focus::Tables => Focus::Rows,
                Focus::Rows => Focus::Tables,
            };
        }
        KeyCode::Char('j') | KeyCode::Down => match ui.focus {
            Focus::Tables => {
                ui.table_cursor =
                    clamp_cursor(session.tables().len(), ui.table_cursor.saturating_add(1));
            }
            Focus::Rows => {
                let rows = session.view().snapshot().map_or(0, |s| s.rows.len());
                ui.row_cursor = clamp_cursor(rows, ui.row_cursor.saturating_add(1));
            }
        },
        KeyCode::Char('k') | KeyCode::Up => match ui.focus {
            Focus::Tables => ui.table_cursor = ui.table_cursor.saturating_sub(1),
            Focus::Rows => ui.row_cursor = ui.row_cursor.saturating_sub(1),
        },
        KeyCode::Char('h') | KeyCode::Left => {
            ui.column_cursor = ui.column_cursor.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let columns = session.view().snapshot().map_or(0, |s| s.schema.len());
            ui.column_cursor = clamp_cursor(columns, ui.column_cursor.saturating_add(1));
        }
        KeyCode::Enter => {
            if ui.focus == Focus::Tables
                && let Some(table) = session.tables().get(ui.table_cursor).cloned()
            {
                let events = session.select_table(&table);
                ui.row_cursor = 0;
                ui.column_cursor = 0;
                ui.focus = Focus::Rows;
                apply_events(ui, tx, &events);
            }
        }
        KeyCode::Char('R') => {
            let mut events = session.refresh_tables();
            if let Some(current) = session.view().snapshot_table().cloned() {
                events.extend(session.select_table(&current));
            }
            apply_events(ui, tx, &events);
        }
        KeyCode::Char('a') => {
            let events = session.open_add_row();
            ui.field_cursor = 0;
            apply_events(ui, tx, &events);
        }
        KeyCode::Char('c') => {
            let events = session.open_add_column();
            ui.field_cursor = 0;
            apply_events(ui, tx, &events);
        }
        KeyCode::Char('r') => {
            let Some(column) = selected_column(session, ui) else {
                set_status(ui, tx, "no column selected".to_owned());
                return false;
            };
            let events = session.open_rename_column(&column);
            ui.field_cursor = 0;
            apply_events(ui, tx, &events);
        }
        KeyCode::Char('e') => {
            let Some(rowid) = selected_rowid(session, ui) else {
                set_status(ui, tx, "no row selected".to_owned());
                return false;
            };
            let events = session.open_edit_row(rowid);
            ui.field_cursor = 0;
            apply_events(ui, tx, &events);
        }
        KeyCode::Char('d') => {
            let Some(rowid) = selected_rowid(session, ui) else {
                set_status(ui, tx, "no row selected".to_owned());
                return false;
            };
            let events = session.delete_row(rowid);
            apply_events(ui, tx, &events);
        }
        KeyCode::Char('D') => {
            let Some(column) = selected_column(session, ui) else {
                set_status(ui, tx, "no column selected".to_owned());
                return false;
            };
            let events = session.delete_column(&column);
            apply_events(ui, tx, &events);
        }
        _ => {}
    }
    false
}

fn handle_form_key<G: TableGateway>(
    session: &mut TableSession<G>,
    ui: &mut UiState,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            let events = session.cancel();
            apply_events(ui, tx, &events);
        }
        KeyCode::Enter => {
            let events = session.save();
            apply_events(ui, tx, &events);
        }
        KeyCode::Tab | KeyCode::Down => {
            let count = field_count(session);
            if count > 0 {
                ui.field_cursor = (ui.field_cursor + 1) % count;
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            let count = field_count(session);
            if count > 0 {
                ui.field_cursor = (ui.field_cursor + count - 1) % count;
            }
        }
        KeyCode::Backspace => edit_active_field(session, ui, FieldAction::Pop),
        KeyCode::Char(ch) => edit_active_field(session, ui, FieldAction::Push(ch)),
        _ => {}
    }
}

fn edit_active_field<G: TableGateway>(
    session: &mut TableSession<G>,
    ui: &UiState,
    action: FieldAction,
) {
    let index = ui.field_cursor;
    let view = session.view_mut();
    let value = match view.mode_kind() {
        ModeKind::AddingRow => view
            .row_draft_mut()
            .and_then(|draft| draft.fields.get_mut(index))
            .map(|field| &mut field.value),
        ModeKind::EditingRow => view
            .edit_buffer_mut()
            .and_then(|buffer| buffer.fields.get_mut(index))
            .map(|field| &mut field.value),
        ModeKind::AddingColumn => view.column_draft_mut().map(|draft| &mut draft.name),
        ModeKind::RenamingColumn => view.rename_draft_mut().map(|draft| &mut draft.replacement),
        ModeKind::Browsing => None,
    };

    if let Some(value) = value {
        match action {
            FieldAction::Push(ch) => value.push(ch),
            FieldAction::Pop => {
                value.pop();
            }
        }
    }
}

fn selected_rowid<G: TableGateway>(
    session: &TableSession<G>,
    ui: &UiState,
) -> Option<tabula_app::RowId> {
    session
        .view()
        .snapshot()
        .and_then(|snapshot| snapshot.rows.get(ui.row_cursor))
        .map(|row| row.rowid)
}

fn selected_column<G: TableGateway>(
    session: &TableSession<G>,
    ui: &UiState,
) -> Option<tabula_app::ColumnName> {
    session
        .view()
        .snapshot()
        .and_then(|snapshot| snapshot.schema.get(ui.column_cursor))
        .cloned()
}

fn render<G: TableGateway>(frame: &mut Frame, session: &TableSession<G>, ui: &UiState) {
    let outer = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(frame.area());
    let main = Layout::horizontal([Constraint::Length(26), Constraint::Min(1)]).split(outer[0]);

    render_table_list(frame, session, ui, main[0]);
    render_grid(frame, session, ui, main[1]);
    render_status(frame, session, ui, outer[1]);
    render_help(frame, session, outer[2]);

    if session.view().mode_kind() != ModeKind::Browsing {
        render_form(frame, session, ui, frame.area());
    }
}

fn render_table_list<G: TableGateway>(
    frame: &mut Frame,
    session: &TableSession<G>,
    ui: &UiState,
    area: Rect,
) {
    let items: Vec<ListItem> = session
        .tables()
        .iter()
        .map(|table| ListItem::new(table.as_str().to_owned()))
        .collect();

    let border_style = if ui.focus == Focus::Tables {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(Block::bordered().title("tables").border_style(border_style))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !session.tables().is_empty() {
        state.select(Some(ui.table_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_grid<G: TableGateway>(
    frame: &mut Frame,
    session: &TableSession<G>,
    ui: &UiState,
    area: Rect,
) {
    let title = session
        .view()
        .snapshot_table()
        .map(|table| table.as_str().to_owned())
        .unwrap_or_else(|| "no table selected".to_owned());
    let border_style = if ui.focus == Focus::Rows {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::bordered().title(title).border_style(border_style);

    let Some(snapshot) = session.view().snapshot() else {
        frame.render_widget(
            Paragraph::new("press Enter on a table to load it").block(block),
            area,
        );
        return;
    };

    let mut header_cells = vec![Cell::from("rowid")];
    for (index, column) in snapshot.schema.iter().enumerate() {
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if index == ui.column_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        header_cells.push(Cell::from(column.as_str().to_owned()).style(style));
    }

    let rows: Vec<UiRow> = snapshot
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![Cell::from(row.rowid.to_string())];
            cells.extend(row.cells.iter().map(|cell| Cell::from(cell.clone())));
            UiRow::new(cells)
        })
        .collect();

    let widths = column_widths(snapshot);
    let table = UiTable::new(rows, widths)
        .header(UiRow::new(header_cells))
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !snapshot.rows.is_empty() {
        state.select(Some(ui.row_cursor));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn column_widths(snapshot: &tabula_app::TableSnapshot) -> Vec<Constraint> {
    let mut widths = vec![Constraint::Length(5)];
    for (index, column) in snapshot.schema.iter().enumerate() {
        let mut longest = column.as_str().len();
        for row in &snapshot.rows {
            longest = longest.max(row.cell(index).len());
        }
        let width = (longest as u16).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        widths.push(Constraint::Length(width));
    }
    widths
}

fn render_status<G: TableGateway>(
    frame: &mut Frame,
    session: &TableSession<G>,
    ui: &UiState,
    area: Rect,
) {
    let text = match &ui.status {
        Some(status) => status.clone(),
        None => match session.view().snapshot() {
            Some(snapshot) => {
                let fetched = snapshot
                    .fetched_at
                    .format(&time::macros::format_description!(
                        "[hour]:[minute]:[second]"
                    ))
                    .unwrap_or_else(|_| "-".to_owned());
                format!(
                    "{} rows, {} columns, fetched {fetched}",
                    snapshot.rows.len(),
                    snapshot.schema.len()
                )
            }
            None => String::new(),
        },
    };
    frame.render_widget(Paragraph::new(text), area);
}

fn render_help<G: TableGateway>(frame: &mut Frame, session: &TableSession<G>, area: Rect) {
    let text = if session.view().mode_kind() == ModeKind::Browsing {
        "q quit  Tab focus  Enter load  a +row  c +col  e edit  r rename col  d del row  D del col  R refresh"
    } else {
        "Esc cancel  Enter save  Tab next field"
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().add_modifier(Modifier::DIM)),
        area,
    );
}

fn render_form<G: TableGateway>(
    frame: &mut Frame,
    session: &TableSession<G>,
    ui: &UiState,
    area: Rect,
) {
    let (title, fields): (String, Vec<(String, String)>) = match session.view().mode() {
        ViewMode::Browsing => return,
        ViewMode::AddingRow(draft) => (
            "add row".to_owned(),
            draft
                .fields
                .iter()
                .map(|field| (field.column.as_str().to_owned(), field.value.clone()))
                .collect(),
        ),
        ViewMode::EditingRow(buffer) => (
            format!("edit row {}", buffer.rowid),
            buffer
                .fields
                .iter()
                .map(|field| (field.column.as_str().to_owned(), field.value.clone()))
                .collect(),
        ),
        ViewMode::AddingColumn(draft) => (
            "add column".to_owned(),
            vec![("column name".to_owned(), draft.name.clone())],
        ),
        ViewMode::RenamingColumn(draft) => (
            format!("rename column {}", draft.column),
            vec![("new name".to_owned(), draft.replacement.clone())],
        ),
    };

    let label_width = fields
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(index, (label, value))| {
            let mut value_style = Style::default();
            if index == ui.field_cursor {
                value_style = value_style.add_modifier(Modifier::REVERSED);
            }
            Line::from(vec![
                Span::raw(format!("{label:>label_width$} ")),
                Span::styled(format!("{value} "), value_style),
            ])
        })
        .collect();

    let height = (fields.len() as u16).saturating_add(2).min(area.height);
    let popup = centered_rect(area, 60, height);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(title)),
        popup,
    );
}

fn centered_rect(area: Rect, width_percent: u16, height: u16) -> Rect {
    let width = area.width * width_percent / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Focus, UiState, clamp_cursor, column_widths, field_count, handle_key_event,
        status_for_events,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc;
    use tabula_app::{
        ColumnName, ModeKind, Row, RowId, TableName, TableSession, TableSnapshot, ViewEvent,
    };
    use tabula_testkit::MemoryGateway;
    use time::OffsetDateTime;

    fn users_session() -> TableSession<MemoryGateway> {
        let mut gateway = MemoryGateway::new();
        gateway.create_table("users", &["id", "name"]);
        gateway.insert_row("users", &["1", "Ann"]);

        let mut session = TableSession::new(gateway);
        session.refresh_tables();
        session.select_table(&TableName::new("users"));
        session
    }

    fn press(
        session: &mut TableSession<MemoryGateway>,
        ui: &mut UiState,
        code: KeyCode,
    ) -> bool {
        let (tx, _rx) = mpsc::channel();
        handle_key_event(session, ui, &tx, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(session: &mut TableSession<MemoryGateway>, ui: &mut UiState, text: &str) {
        for ch in text.chars() {
            press(session, ui, KeyCode::Char(ch));
        }
    }

    #[test]
    fn q_quits_from_browsing() {
        let mut session = users_session();
        let mut ui = UiState::default();
        assert!(press(&mut session, &mut ui, KeyCode::Char('q')));
    }

    #[test]
    fn add_row_through_key_events_round_trips() {
        let mut session = users_session();
        let mut ui = UiState {
            focus: Focus::Rows,
            ..UiState::default()
        };

        press(&mut session, &mut ui, KeyCode::Char('a'));
        assert_eq!(session.view().mode_kind(), ModeKind::AddingRow);

        type_text(&mut session, &mut ui, "2");
        press(&mut session, &mut ui, KeyCode::Tab);
        type_text(&mut session, &mut ui, "Bea");
        press(&mut session, &mut ui, KeyCode::Enter);

        assert_eq!(session.view().mode_kind(), ModeKind::Browsing);
        let snapshot = session.view().snapshot().expect("snapshot");
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.rows[1].cells, vec!["2".to_owned(), "Bea".to_owned()]);
    }

    #[test]
    fn escape_cancels_a_form_without_saving() {
        let mut session = users_session();
        let mut ui = UiState::default();

        press(&mut session, &mut ui, KeyCode::Char('a'));
        type_text(&mut session, &mut ui, "junk");
        press(&mut session, &mut ui, KeyCode::Esc);

        assert_eq!(session.view().mode_kind(), ModeKind::Browsing);
        assert_eq!(session.view().snapshot().expect("snapshot").rows.len(), 1);
    }

    #[test]
    fn d_deletes_the_selected_row() {
        let mut session = users_session();
        let mut ui = UiState {
            focus: Focus::Rows,
            ..UiState::default()
        };

        press(&mut session, &mut ui, KeyCode::Char('d'));
        assert!(session.view().snapshot().expect("snapshot").rows.is_empty());
    }

    #[test]
    fn backspace_edits_the_focused_field() {
        let mut session = users_session();
        let mut ui = UiState::default();

        press(&mut session, &mut ui, KeyCode::Char('c'));
        type_text(&mut session, &mut ui, "emaill");
        press(&mut session, &mut ui, KeyCode::Backspace);
        press(&mut session, &mut ui, KeyCode::Enter);

        let schema = session.view().snapshot().expect("snapshot").schema.clone();
        assert!(schema.contains(&ColumnName::new("email")));
    }

    #[test]
    fn enter_on_table_list_loads_the_table() {
        let mut gateway = MemoryGateway::new();
        gateway.create_table("users", &["id"]);
        gateway.create_table("orders", &["sku"]);
        let mut session = TableSession::new(gateway);
        session.refresh_tables();

        let mut ui = UiState::default();
        ui.table_cursor = 1;
        press(&mut session, &mut ui, KeyCode::Enter);

        assert_eq!(
            session.view().snapshot_table(),
            Some(&TableName::new("orders"))
        );
        assert_eq!(ui.focus, Focus::Rows);
    }

    #[test]
    fn status_prefers_failures_over_confirmations() {
        let events = vec![
            ViewEvent::MutationApplied("row added".to_owned()),
            ViewEvent::ReloadFailed("change saved, but reloading failed".to_owned()),
            ViewEvent::SnapshotReplaced(TableName::new("users")),
        ];
        let status = status_for_events(&events).expect("status");
        assert!(status.contains("reloading failed"));
    }

    #[test]
    fn status_falls_back_to_lowest_rank_alone() {
        let events = vec![ViewEvent::TablesRefreshed(3)];
        assert_eq!(status_for_events(&events), Some("3 tables".to_owned()));
        assert_eq!(status_for_events(&[]), None);
    }

    #[test]
    fn clamp_cursor_handles_empty_and_overflow() {
        assert_eq!(clamp_cursor(0, 5), 0);
        assert_eq!(clamp_cursor(3, 5), 2);
        assert_eq!(clamp_cursor(3, 1), 1);
    }

    #[test]
    fn column_widths_track_longest_cell_within_bounds() {
        let snapshot = TableSnapshot::new(
            vec![ColumnName::new("id"), ColumnName::new("notes")],
            vec![Row {
                rowid: RowId::new(1),
                cells: vec!["1".to_owned(), "x".repeat(100)],
            }],
            OffsetDateTime::UNIX_EPOCH,
        );
        let widths = column_widths(&snapshot);
        // rowid column plus one width per schema column.
        assert_eq!(widths.len(), 3);
    }

    #[test]
    fn field_count_matches_open_form() {
        let mut session = users_session();
        assert_eq!(field_count(&session), 0);

        session.open_add_row();
        assert_eq!(field_count(&session), 2);

        session.cancel();
        session.open_add_column();
        assert_eq!(field_count(&session), 1);
    }
}
