// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction as LayoutDirection, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tally_app::{
    AppCommand, AppEvent, AppMode, AppState, Category, CellId, Direction, DocumentCommand,
    DocumentEvent, Field, Item, Session, Snapshot, Touch,
};

const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(120);
const FOOTER_LABELS: [&str; 3] = ["total", "balance", "remainder"];

pub trait AppRuntime {
    fn load_budget(&mut self) -> Result<Snapshot>;
    fn save_budget(&mut self, snapshot: &Snapshot) -> Result<()>;
    fn budget_label(&self) -> String;
    fn can_save(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub status_timeout: Duration,
    pub confirm_quit: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            confirm_quit: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

/// Where the selection sits: an item row of the grid, or a balance cell.
/// Spacer rows can hold the cursor even though they have no cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Grid { row: usize, field: Field },
    Balance(Category),
}

impl Default for Cursor {
    fn default() -> Self {
        Self::Grid {
            row: 0,
            field: Field::Name,
        }
    }
}

#[derive(Debug, Clone)]
struct ViewData {
    session: Session,
    label: String,
    cursor: Cursor,
    last_grid: Cursor,
    help_visible: bool,
    flash: Option<Touch>,
    reset_armed: bool,
    status_token: u64,
    status_timeout: Duration,
}

impl ViewData {
    fn new(session: Session, label: String, options: UiOptions) -> Self {
        Self {
            session,
            label,
            cursor: Cursor::default(),
            last_grid: Cursor::default(),
            help_visible: false,
            flash: None,
            reset_armed: false,
            status_token: 0,
            status_timeout: options.status_timeout,
        }
    }

    fn focus_cell(&self) -> Option<CellId> {
        let document = self.session.document();
        match self.cursor {
            Cursor::Grid { row, field } => document
                .item_at(row)
                .and_then(|(_, item)| item.as_line())
                .map(|line| line.cell(field)),
            Cursor::Balance(category) => Some(document.balance_cell(category)),
        }
    }

    fn cursor_row(&self) -> Option<usize> {
        match self.cursor {
            Cursor::Grid { row, .. } if row < self.session.document().len() => Some(row),
            _ => None,
        }
    }

    /// Cursor position for a cell the document just touched.
    fn cursor_for_cell(&self, cell: CellId) -> Option<Cursor> {
        let document = self.session.document();
        if let Some(category) = Category::ALL
            .into_iter()
            .find(|category| document.balance_cell(*category) == cell)
        {
            return Some(Cursor::Balance(category));
        }
        let (item, field) = document.rows().owner_of(cell)?;
        let row = document.position_of(item)?;
        Some(Cursor::Grid { row, field })
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    let snapshot = runtime
        .load_budget()
        .with_context(|| format!("load budget {}", runtime.budget_label()))?;
    state.confirm_quit = options.confirm_quit;

    let mut view_data = ViewData::new(Session::default(), runtime.budget_label(), options);
    let (internal_tx, internal_rx) = mpsc::channel();
    let events = view_data
        .session
        .dispatch(DocumentCommand::LoadSnapshot(snapshot));
    apply_document_events(state, &mut view_data, &internal_tx, events);
    if !runtime.can_save() {
        emit_status(state, &mut view_data, &internal_tx, "demo budget; saving is disabled");
    }

    enable_raw_mode().context("enable raw mode")?;
    let result = run_in_alternate_screen(state, runtime, &mut view_data, &internal_tx, &internal_rx);
    let restored = restore_terminal();
    result.and(restored)
}

fn run_in_alternate_screen<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")?;
    event_loop(
        &mut terminal,
        state,
        runtime,
        view_data,
        internal_tx,
        internal_rx,
        next_terminal_event,
    )
}

/// Draws and dispatches until a key asks to quit. Any draw or input error
/// ends the loop and is returned to the caller.
fn event_loop<B, R, F>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
    mut next_event: F,
) -> Result<()>
where
    B: Backend,
    R: AppRuntime,
    F: FnMut(Duration) -> Result<Option<Event>>,
{
    loop {
        process_internal_events(state, view_data, internal_rx);
        terminal
            .draw(|frame| render(frame, state, view_data))
            .context("draw frame")?;

        let Some(event) = next_event(EVENT_POLL_INTERVAL)? else {
            continue;
        };
        if let Event::Key(key) = event
            && handle_key_event(state, runtime, view_data, internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn next_terminal_event(timeout: Duration) -> Result<Option<Event>> {
    if !event::poll(timeout).context("poll event")? {
        return Ok(None);
    }
    event::read().context("read event").map(Some)
}

fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    raw.and(screen)
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, timeout: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(timeout);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch_app(
        state,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

/// Dispatches to `AppState` and arms the clear timer for any new status.
fn dispatch_app(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token, view_data.status_timeout);
    }
    events
}

fn dispatch_document(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: DocumentCommand,
) -> bool {
    let events = view_data.session.dispatch(command);
    let changed = !events.is_empty();
    apply_document_events(state, view_data, internal_tx, events);
    changed
}

fn apply_document_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<DocumentEvent>,
) {
    for event in events {
        match event {
            DocumentEvent::Replaced => {
                view_data.cursor = Cursor::default();
                view_data.last_grid = Cursor::default();
                view_data.flash = None;
            }
            DocumentEvent::DirtyStateChanged { clean } => {
                state.dispatch(AppCommand::CleanChanged(clean));
            }
            DocumentEvent::SnapshotChanged(snapshot) => {
                log::trace!("snapshot now has {} item(s)", snapshot.items.len());
            }
            DocumentEvent::EditRejected {
                display, reason, ..
            } => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("{reason}; kept {display}"),
                );
            }
            DocumentEvent::Touched(touch) => {
                view_data.flash = Some(touch);
                follow_touch(view_data, touch);
            }
        }
    }
    sync_focus(state, view_data);
}

fn follow_touch(view_data: &mut ViewData, touch: Touch) {
    let target = match touch {
        Touch::Cell(cell) => view_data.cursor_for_cell(cell),
        Touch::Item(item) => view_data
            .session
            .document()
            .position_of(item)
            .map(|row| Cursor::Grid {
                row,
                field: match view_data.cursor {
                    Cursor::Grid { field, .. } => field,
                    Cursor::Balance(_) => Field::Name,
                },
            }),
    };
    if let Some(cursor) = target {
        view_data.cursor = cursor;
    }
}

/// Clamps the cursor into the document and mirrors its cell into `AppState`.
fn sync_focus(state: &mut AppState, view_data: &mut ViewData) {
    if let Cursor::Grid { row, field } = view_data.cursor {
        let len = view_data.session.document().len();
        view_data.cursor = Cursor::Grid {
            row: row.min(len.saturating_sub(1)),
            field,
        };
        view_data.last_grid = view_data.cursor;
    }
    let focus = view_data.focus_cell();
    state.dispatch(AppCommand::Focus(focus));
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    view_data.flash = None;
    if !(ctrl && key.code == KeyCode::Char('n')) {
        view_data.reset_armed = false;
    }

    if ctrl && key.code == KeyCode::Char('q') {
        let events = dispatch_app(state, view_data, internal_tx, AppCommand::RequestQuit);
        return events.contains(&AppEvent::Quit);
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.is_editing() {
        handle_edit_key(state, view_data, internal_tx, key);
        return false;
    }

    match (key.code, ctrl) {
        (KeyCode::Char('s'), true) => save(state, runtime, view_data, internal_tx),
        (KeyCode::Char('n'), true) => new_budget(state, view_data, internal_tx),
        (KeyCode::Char('z'), true) | (KeyCode::Char('u'), false) => {
            if !dispatch_document(state, view_data, internal_tx, DocumentCommand::Undo) {
                emit_status(state, view_data, internal_tx, "nothing to undo");
            }
        }
        (KeyCode::Char('y'), true) | (KeyCode::Char('r'), false) => {
            if !dispatch_document(state, view_data, internal_tx, DocumentCommand::Redo) {
                emit_status(state, view_data, internal_tx, "nothing to redo");
            }
        }
        (KeyCode::Left | KeyCode::Char('h'), false) => move_cursor(state, view_data, Direction::Left),
        (KeyCode::Right | KeyCode::Char('l'), false) => {
            move_cursor(state, view_data, Direction::Right);
        }
        (KeyCode::Up | KeyCode::Char('k'), false) => move_cursor(state, view_data, Direction::Up),
        (KeyCode::Down | KeyCode::Char('j'), false) => move_cursor(state, view_data, Direction::Down),
        (KeyCode::Char('['), false) => step_row(state, view_data, -1),
        (KeyCode::Char(']'), false) => step_row(state, view_data, 1),
        (KeyCode::Tab, false) => toggle_region(state, view_data),
        (KeyCode::Enter, false) => begin_edit(state, view_data, internal_tx),
        (KeyCode::Char('a'), false) => {
            let at = insertion_index(view_data);
            dispatch_document(
                state,
                view_data,
                internal_tx,
                DocumentCommand::InsertLineItem { at },
            );
        }
        (KeyCode::Char('s'), false) => {
            let at = insertion_index(view_data);
            dispatch_document(
                state,
                view_data,
                internal_tx,
                DocumentCommand::InsertSpacer { at },
            );
        }
        (KeyCode::Char('d'), false) => match view_data.cursor_row() {
            Some(row) => {
                dispatch_document(
                    state,
                    view_data,
                    internal_tx,
                    DocumentCommand::DeleteItemAt(row),
                );
            }
            None => emit_status(state, view_data, internal_tx, "select a row to delete"),
        },
        (KeyCode::Char('K'), false) => shift_row(state, view_data, internal_tx, -1),
        (KeyCode::Char('J'), false) => shift_row(state, view_data, internal_tx, 1),
        (KeyCode::Char('?'), false) => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn handle_edit_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            dispatch_app(state, view_data, internal_tx, AppCommand::CancelEdit);
        }
        KeyCode::Enter => {
            let events = dispatch_app(state, view_data, internal_tx, AppCommand::CommitEdit);
            for event in events {
                if let AppEvent::EditCommitted { cell, text } = event {
                    dispatch_document(
                        state,
                        view_data,
                        internal_tx,
                        DocumentCommand::EditCell { cell, text },
                    );
                }
            }
        }
        KeyCode::Backspace => {
            state.dispatch(AppCommand::DraftPop);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::DraftPush(ch));
        }
        _ => {}
    }
}

fn begin_edit(state: &mut AppState, view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    let Some(cell) = view_data.focus_cell() else {
        emit_status(state, view_data, internal_tx, "nothing to edit here");
        return;
    };
    let committed = view_data
        .session
        .document()
        .cell(cell)
        .map(|cell| cell.display().to_owned())
        .unwrap_or_default();
    state.dispatch(AppCommand::BeginEdit(committed));
}

fn save<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if !runtime.can_save() {
        emit_status(state, view_data, internal_tx, "saving is disabled for the demo budget");
        return;
    }
    let snapshot = view_data.session.document().snapshot();
    match runtime.save_budget(&snapshot) {
        Ok(()) => {
            dispatch_document(state, view_data, internal_tx, DocumentCommand::NoteSaved);
            let message = format!("saved {}", runtime.budget_label());
            emit_status(state, view_data, internal_tx, message);
        }
        Err(error) => {
            log::warn!("save failed: {error:#}");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("save failed: {error:#}; check the budget path and permissions"),
            );
        }
    }
}

fn new_budget(state: &mut AppState, view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    if !state.clean && !view_data.reset_armed {
        view_data.reset_armed = true;
        emit_status(
            state,
            view_data,
            internal_tx,
            "unsaved changes; press ctrl+n again to start a new budget",
        );
        return;
    }
    view_data.reset_armed = false;
    dispatch_document(state, view_data, internal_tx, DocumentCommand::ResetToEmpty);
    emit_status(state, view_data, internal_tx, "new budget");
}

fn insertion_index(view_data: &ViewData) -> Option<usize> {
    view_data.cursor_row().map(|row| row + 1)
}

fn shift_row(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let Some(from) = view_data.cursor_row() else {
        return;
    };
    let Some(to) = from.checked_add_signed(delta) else {
        return;
    };
    dispatch_document(
        state,
        view_data,
        internal_tx,
        DocumentCommand::MoveItem { from, to },
    );
}

fn step_row(state: &mut AppState, view_data: &mut ViewData, delta: isize) {
    if let Cursor::Grid { row, field } = view_data.cursor {
        let len = view_data.session.document().len();
        if let Some(next) = row.checked_add_signed(delta).filter(|next| *next < len) {
            view_data.cursor = Cursor::Grid { row: next, field };
            sync_focus(state, view_data);
        }
    }
}

fn move_cursor(state: &mut AppState, view_data: &mut ViewData, direction: Direction) {
    let next = match view_data.cursor {
        Cursor::Balance(category) => balance_step(category, direction).map(Cursor::Balance),
        Cursor::Grid { row, field } => match view_data.focus_cell() {
            Some(cell) => view_data
                .session
                .document()
                .nav()
                .step(cell, direction)
                .and_then(|target| view_data.cursor_for_cell(target)),
            // Spacer rows have no cells; step over them by row.
            None => match direction {
                Direction::Up => row.checked_sub(1).map(|row| Cursor::Grid { row, field }),
                Direction::Down => Some(Cursor::Grid { row: row + 1, field })
                    .filter(|_| row + 1 < view_data.session.document().len()),
                Direction::Left | Direction::Right => None,
            },
        },
    };
    if let Some(cursor) = next {
        view_data.cursor = cursor;
        sync_focus(state, view_data);
    }
}

fn balance_step(category: Category, direction: Direction) -> Option<Category> {
    let index = category.index();
    let next = match direction {
        Direction::Left => index.checked_sub(1)?,
        Direction::Right => index + 1,
        Direction::Up | Direction::Down => return None,
    };
    Category::ALL.get(next).copied()
}

fn toggle_region(state: &mut AppState, view_data: &mut ViewData) {
    view_data.cursor = match view_data.cursor {
        Cursor::Grid { field, .. } => Cursor::Balance(field.category().unwrap_or(Category::Amount)),
        Cursor::Balance(_) => view_data.last_grid,
    };
    sync_focus(state, view_data);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(frame.area());

    render_grid(frame, layout[0], state, view_data);

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[1]);

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_grid(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let header = Row::new(Field::ALL.map(|field| {
        Cell::from(field.label()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let focus = state.focus;
    let document = view_data.session.document();
    let mut rows = Vec::with_capacity(document.len() + FOOTER_LABELS.len() + 1);
    for (index, texts) in body_texts(state, view_data).into_iter().enumerate() {
        let item = document.item_at(index);
        let selected_row = view_data.cursor_row() == Some(index);
        let flashed_row = matches!(
            (view_data.flash, item),
            (Some(Touch::Item(touched)), Some((id, _))) if touched == id
        );
        let line = item.and_then(|(_, item)| item.as_line().copied());
        let cells = texts.into_iter().enumerate().map(|(column, text)| {
            let cell = line.map(|line| line.cell(Field::ALL[column]));
            let mut style = Style::default();
            if selected_row {
                style = style.bg(Color::DarkGray);
            }
            if flashed_row || (cell.is_some() && view_data.flash == cell.map(Touch::Cell)) {
                style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
            }
            if cell.is_some() && cell == focus {
                style = focused_style();
            }
            Cell::from(text).style(style)
        });
        rows.push(Row::new(cells.collect::<Vec<_>>()));
    }

    rows.push(Row::new(vec![Cell::from(String::new())]));
    for (footer, texts) in footer_texts(state, view_data).into_iter().enumerate() {
        let cells = texts.into_iter().enumerate().map(|(column, text)| {
            let balance_cell = Field::ALL[column]
                .category()
                .filter(|_| footer == 1)
                .map(|category| document.balance_cell(category));
            let style = if balance_cell.is_some() && balance_cell == focus {
                focused_style()
            } else if footer == 0 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Cell::from(text).style(style)
        });
        rows.push(Row::new(cells.collect::<Vec<_>>()));
    }

    let widths = Field::ALL.map(|_| Constraint::Min(10));
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(grid_title(state, view_data))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn focused_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn grid_title(state: &AppState, view_data: &ViewData) -> String {
    let marker = if state.clean { "" } else { " [modified]" };
    format!("tally: {}{marker}", view_data.label)
}

fn cell_text(state: &AppState, view_data: &ViewData, cell: CellId) -> String {
    if state.is_editing() && state.focus == Some(cell) {
        return format!("{}_", state.draft);
    }
    view_data
        .session
        .document()
        .cell(cell)
        .map(|cell| cell.display().to_owned())
        .unwrap_or_default()
}

/// One text row per item, spacers blank.
fn body_texts(state: &AppState, view_data: &ViewData) -> Vec<Vec<String>> {
    view_data
        .session
        .document()
        .rows()
        .iter()
        .map(|(_, item)| match item {
            Item::Line(line) => Field::ALL
                .iter()
                .map(|field| cell_text(state, view_data, line.cell(*field)))
                .collect(),
            Item::Spacer => vec![String::new(); Field::ALL.len()],
        })
        .collect()
}

/// Totals, balances and remainders under their category columns.
fn footer_texts(state: &AppState, view_data: &ViewData) -> Vec<Vec<String>> {
    let document = view_data.session.document();
    FOOTER_LABELS
        .iter()
        .enumerate()
        .map(|(footer, label)| {
            Field::ALL
                .iter()
                .map(|field| match (field, field.category()) {
                    (Field::Name, _) => (*label).to_owned(),
                    (_, Some(category)) => {
                        let cell = match footer {
                            0 => document.total_cell(category),
                            1 => document.balance_cell(category),
                            _ => document.remainder_cell(category),
                        };
                        cell_text(state, view_data, cell)
                    }
                    (_, None) => String::new(),
                })
                .collect()
        })
        .collect()
}

fn status_text(state: &AppState) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    match state.mode {
        AppMode::Nav => "NAV | hjkl move | [/] row | tab balances | enter edit | a add | s spacer | d del | K/J move | u/r undo/redo | ctrl+s save | ? help | ctrl+q quit".to_owned(),
        AppMode::Edit => "EDIT | enter commit | esc cancel | backspace delete".to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit (twice when unsaved) | ctrl+s save | ctrl+n new budget\n\
nav: h/j/k/l or arrows move | [/] previous/next row (spacers too) | tab grid/balances\n\
nav: enter edit | a add line below | s add spacer below | d delete row | K/J move row up/down\n\
nav: u or ctrl+z undo | r or ctrl+y redo | ? help\n\
edit: type to change | backspace delete | enter commit | esc cancel\n\
money accepts $ and commas; percents accept 50 or 50%"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, Cursor, InternalEvent, UiOptions, ViewData, body_texts, event_loop,
        footer_texts, grid_title, handle_key_event, help_overlay_text, process_internal_events,
        status_text,
    };
    use anyhow::{Result, anyhow, bail};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::time::Duration;
    use tally_app::{
        AppMode, AppState, Category, DocumentCommand, Field, Session, Snapshot, UNSAVED_QUIT_HINT,
    };
    use tally_testkit::{five_lines, sample_snapshot};

    #[derive(Debug, Default)]
    struct TestRuntime {
        saved: Vec<Snapshot>,
        fail_save: bool,
        read_only: bool,
    }

    impl AppRuntime for TestRuntime {
        fn load_budget(&mut self) -> anyhow::Result<Snapshot> {
            Ok(sample_snapshot())
        }

        fn save_budget(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
            if self.fail_save {
                bail!("disk full");
            }
            self.saved.push(snapshot.clone());
            Ok(())
        }

        fn budget_label(&self) -> String {
            "test.json".to_owned()
        }

        fn can_save(&self) -> bool {
            !self.read_only
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(snapshot: &Snapshot) -> Self {
            let mut state = AppState::default();
            let mut view_data = ViewData::new(
                Session::default(),
                "test.json".to_owned(),
                UiOptions {
                    status_timeout: Duration::from_secs(60),
                    confirm_quit: true,
                },
            );
            let (tx, rx) = mpsc::channel();
            let events = view_data
                .session
                .dispatch(DocumentCommand::LoadSnapshot(snapshot.clone()));
            super::apply_document_events(&mut state, &mut view_data, &tx, events);
            Self {
                state,
                runtime: TestRuntime::default(),
                view_data,
                tx,
                rx,
            }
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.key(KeyEvent::new(code, KeyModifiers::NONE))
        }

        fn ctrl(&mut self, ch: char) -> bool {
            self.key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
        }

        fn key(&mut self, key: KeyEvent) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                key,
            );
            process_internal_events(&mut self.state, &mut self.view_data, &self.rx);
            quit
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn clear_draft(&mut self) {
            while !self.state.draft.is_empty() {
                self.press(KeyCode::Backspace);
            }
        }

        fn run_events(&mut self, mut events: VecDeque<Result<Option<Event>>>) -> Result<usize> {
            let mut terminal = Terminal::new(TestBackend::new(160, 40))?;
            let mut polled = 0;
            event_loop(
                &mut terminal,
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                &self.rx,
                |_| {
                    polled += 1;
                    events
                        .pop_front()
                        .unwrap_or_else(|| Err(anyhow!("event source drained")))
                },
            )?;
            Ok(polled)
        }

        fn names(&self) -> Vec<String> {
            body_texts(&self.state, &self.view_data)
                .into_iter()
                .map(|row| row[0].clone())
                .collect()
        }
    }

    #[test]
    fn load_focuses_first_cell() {
        let harness = Harness::new(&sample_snapshot());
        assert_eq!(harness.view_data.cursor, Cursor::default());
        assert!(harness.state.focus.is_some());
        assert!(harness.state.clean);
    }

    #[test]
    fn hjkl_follow_navigation_links_and_skip_spacers() {
        let mut harness = Harness::new(&sample_snapshot());
        harness.press(KeyCode::Char('l'));
        assert_eq!(
            harness.view_data.cursor,
            Cursor::Grid {
                row: 0,
                field: Field::Amount
            }
        );

        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Char('j'));
        assert_eq!(
            harness.view_data.cursor,
            Cursor::Grid {
                row: 3,
                field: Field::Amount
            }
        );

        harness.press(KeyCode::Char('['));
        assert_eq!(harness.view_data.focus_cell(), None);
        harness.press(KeyCode::Char('k'));
        assert_eq!(
            harness.view_data.cursor,
            Cursor::Grid {
                row: 1,
                field: Field::Amount
            }
        );
    }

    #[test]
    fn enter_edit_commit_updates_totals_and_marks_dirty() {
        let mut harness = Harness::new(&sample_snapshot());
        harness.press(KeyCode::Char('l'));
        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.mode, AppMode::Edit);
        assert_eq!(harness.state.draft, "$1,200.00");

        harness.clear_draft();
        harness.type_text("1300");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode, AppMode::Nav);
        assert!(!harness.state.clean);
        let document = harness.view_data.session.document();
        assert_eq!(document.total(Category::Amount).get(), 144_540);
        assert!(grid_title(&harness.state, &harness.view_data).ends_with("[modified]"));
    }

    #[test]
    fn rejected_edit_reports_and_keeps_value() {
        let mut harness = Harness::new(&sample_snapshot());
        harness.press(KeyCode::Char('l'));
        harness.press(KeyCode::Enter);
        harness.clear_draft();
        harness.type_text("lots");
        harness.press(KeyCode::Enter);

        let status = harness.state.status_line.clone().unwrap_or_default();
        assert!(status.contains("kept $1,200.00"), "{status}");
        assert!(harness.state.clean);
        assert!(harness.view_data.session.document().history().is_empty());
    }

    #[test]
    fn esc_cancels_without_touching_history() {
        let mut harness = Harness::new(&sample_snapshot());
        harness.press(KeyCode::Enter);
        harness.type_text("xyz");
        assert!(harness.names()[0].ends_with("xyz_"));

        harness.press(KeyCode::Esc);
        assert_eq!(harness.names()[0], "Rent");
        assert!(harness.view_data.session.document().history().is_empty());
    }

    #[test]
    fn add_delete_undo_redo_round_trip() {
        let mut harness = Harness::new(&five_lines());
        harness.press(KeyCode::Char('a'));
        assert_eq!(harness.names()[1], "New Expense");
        assert_eq!(
            harness.view_data.cursor,
            Cursor::Grid {
                row: 1,
                field: Field::Name
            }
        );

        harness.press(KeyCode::Char('d'));
        assert_eq!(harness.names(), ["a", "b", "c", "d", "e"]);

        harness.press(KeyCode::Char('u'));
        assert_eq!(harness.names()[1], "New Expense");
        harness.ctrl('z');
        assert_eq!(harness.names().len(), 5);
        assert!(harness.state.clean);

        harness.press(KeyCode::Char('r'));
        assert_eq!(harness.names().len(), 6);
        harness.ctrl('y');
        assert_eq!(harness.names().len(), 5);
        assert!(!harness.state.clean);

        harness.press(KeyCode::Char('r'));
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("nothing to redo")
        );
    }

    #[test]
    fn shift_j_and_k_move_rows() {
        let mut harness = Harness::new(&five_lines());
        harness.key(KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT));
        assert_eq!(harness.names(), ["b", "a", "c", "d", "e"]);
        assert_eq!(
            harness.view_data.cursor,
            Cursor::Grid {
                row: 1,
                field: Field::Name
            }
        );

        harness.key(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT));
        harness.key(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT));
        assert_eq!(harness.names(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn spacer_inserts_below_and_renders_blank() {
        let mut harness = Harness::new(&five_lines());
        harness.press(KeyCode::Char('s'));
        let rows = body_texts(&harness.state, &harness.view_data);
        assert!(rows[1].iter().all(String::is_empty));
        assert_eq!(harness.view_data.cursor_row(), Some(1));
    }

    #[test]
    fn tab_toggles_balance_row_and_edits_balance() {
        let mut harness = Harness::new(&five_lines());
        harness.press(KeyCode::Tab);
        assert_eq!(harness.view_data.cursor, Cursor::Balance(Category::Amount));
        harness.press(KeyCode::Char('l'));
        assert_eq!(harness.view_data.cursor, Cursor::Balance(Category::ToPay));

        harness.press(KeyCode::Enter);
        harness.clear_draft();
        harness.type_text("20");
        harness.press(KeyCode::Enter);

        let footer = footer_texts(&harness.state, &harness.view_data);
        assert_eq!(footer[0][0], "total");
        assert_eq!(footer[0][3], "$15.00");
        assert_eq!(footer[1][3], "$20.00");
        assert_eq!(footer[2][3], "$5.00");

        harness.press(KeyCode::Tab);
        assert!(matches!(harness.view_data.cursor, Cursor::Grid { .. }));
    }

    #[test]
    fn save_marks_clean_and_demo_refuses() {
        let mut harness = Harness::new(&five_lines());
        harness.press(KeyCode::Char('d'));
        harness.ctrl('s');
        assert_eq!(harness.runtime.saved.len(), 1);
        assert!(harness.state.clean);

        harness.press(KeyCode::Char('d'));
        harness.runtime.read_only = true;
        harness.ctrl('s');
        assert_eq!(harness.runtime.saved.len(), 1);
        assert!(!harness.state.clean);

        harness.runtime.read_only = false;
        harness.runtime.fail_save = true;
        harness.ctrl('s');
        let status = harness.state.status_line.clone().unwrap_or_default();
        assert!(status.contains("disk full"), "{status}");
        assert!(!harness.state.clean);
    }

    #[test]
    fn event_loop_quits_on_ctrl_q_after_idle_polls() -> Result<()> {
        let mut harness = Harness::new(&five_lines());
        let polled = harness.run_events(VecDeque::from([
            Ok(None),
            Ok(Some(Event::Resize(80, 24))),
            Ok(Some(Event::Key(KeyEvent::new(
                KeyCode::Char('q'),
                KeyModifiers::CONTROL,
            )))),
        ]))?;
        assert_eq!(polled, 3);
        Ok(())
    }

    #[test]
    fn event_loop_returns_input_errors_instead_of_bailing_out() {
        let mut harness = Harness::new(&five_lines());
        let error = harness
            .run_events(VecDeque::from([
                Ok(Some(Event::Key(KeyEvent::new(
                    KeyCode::Char('d'),
                    KeyModifiers::NONE,
                )))),
                Err(anyhow!("terminal went away")),
            ]))
            .expect_err("input error should end the loop");
        assert!(format!("{error:#}").contains("terminal went away"));
        assert!(!harness.state.clean);
    }

    #[test]
    fn ctrl_q_needs_confirmation_only_when_dirty() {
        let mut clean = Harness::new(&five_lines());
        assert!(clean.ctrl('q'));

        let mut dirty = Harness::new(&five_lines());
        dirty.press(KeyCode::Char('d'));
        assert!(!dirty.ctrl('q'));
        assert_eq!(dirty.state.status_line.as_deref(), Some(UNSAVED_QUIT_HINT));
        assert!(dirty.ctrl('q'));
    }

    #[test]
    fn ctrl_n_resets_after_confirmation() {
        let mut harness = Harness::new(&five_lines());
        harness.press(KeyCode::Char('d'));
        harness.ctrl('n');
        assert_eq!(harness.names().len(), 4);
        harness.ctrl('n');
        assert!(harness.names().is_empty());
        assert!(harness.state.clean);
        assert!(harness.view_data.session.document().history().is_empty());
    }

    #[test]
    fn status_clears_after_timeout() {
        let mut harness = Harness::new(&five_lines());
        harness.view_data.status_timeout = Duration::from_millis(1);
        harness.press(KeyCode::Char('u'));
        assert_eq!(harness.view_data.status_token, 1);

        std::thread::sleep(Duration::from_millis(50));
        process_internal_events(&mut harness.state, &mut harness.view_data, &harness.rx);
        assert!(harness.state.status_line.is_none());
        assert!(status_text(&harness.state).starts_with("NAV"));
    }

    #[test]
    fn help_toggles_and_swallows_keys() {
        let mut harness = Harness::new(&five_lines());
        harness.press(KeyCode::Char('?'));
        assert!(harness.view_data.help_visible);
        harness.press(KeyCode::Char('d'));
        assert_eq!(harness.names().len(), 5);
        harness.press(KeyCode::Esc);
        assert!(!harness.view_data.help_visible);
        assert!(help_overlay_text().contains("ctrl+s save"));
    }
}
