// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::CellId;

pub const UNSAVED_QUIT_HINT: &str = "unsaved changes; press ctrl+q again to quit or ctrl+s to save";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub focus: Option<CellId>,
    pub draft: String,
    pub status_line: Option<String>,
    pub clean: bool,
    pub confirm_quit: bool,
    quit_armed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            focus: None,
            draft: String::new(),
            status_line: None,
            clean: true,
            confirm_quit: true,
            quit_armed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Focus(Option<CellId>),
    /// Starts editing the focused cell from its committed display text.
    BeginEdit(String),
    DraftPush(char),
    DraftPop,
    CancelEdit,
    CommitEdit,
    SetStatus(String),
    ClearStatus,
    CleanChanged(bool),
    RequestQuit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    FocusChanged(Option<CellId>),
    DraftChanged(String),
    /// The host turns this into a document edit.
    EditCommitted { cell: CellId, text: String },
    StatusUpdated(String),
    StatusCleared,
    CleanChanged(bool),
    Quit,
}

impl AppState {
    pub fn is_editing(&self) -> bool {
        self.mode == AppMode::Edit
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        if command != AppCommand::RequestQuit {
            self.quit_armed = false;
        }
        match command {
            AppCommand::Focus(focus) => {
                if self.focus == focus {
                    return Vec::new();
                }
                let mut events = Vec::new();
                if self.is_editing() {
                    events.extend(self.leave_edit());
                }
                self.focus = focus;
                events.push(AppEvent::FocusChanged(focus));
                events
            }
            AppCommand::BeginEdit(committed) => {
                if self.focus.is_none() || self.is_editing() {
                    return Vec::new();
                }
                self.mode = AppMode::Edit;
                self.draft = committed;
                vec![
                    AppEvent::ModeChanged(self.mode),
                    AppEvent::DraftChanged(self.draft.clone()),
                ]
            }
            AppCommand::DraftPush(ch) => {
                if !self.is_editing() {
                    return Vec::new();
                }
                self.draft.push(ch);
                vec![AppEvent::DraftChanged(self.draft.clone())]
            }
            AppCommand::DraftPop => {
                if !self.is_editing() || self.draft.pop().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::DraftChanged(self.draft.clone())]
            }
            AppCommand::CancelEdit => {
                if !self.is_editing() {
                    return Vec::new();
                }
                let mut events = self.leave_edit();
                events.push(self.set_status("edit cancelled"));
                events
            }
            AppCommand::CommitEdit => {
                let Some(cell) = self.focus.filter(|_| self.is_editing()) else {
                    return Vec::new();
                };
                let text = std::mem::take(&mut self.draft);
                self.mode = AppMode::Nav;
                vec![
                    AppEvent::ModeChanged(self.mode),
                    AppEvent::EditCommitted { cell, text },
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
            AppCommand::CleanChanged(clean) => {
                if self.clean == clean {
                    return Vec::new();
                }
                self.clean = clean;
                vec![AppEvent::CleanChanged(clean)]
            }
            AppCommand::RequestQuit => self.request_quit(),
        }
    }

    fn request_quit(&mut self) -> Vec<AppEvent> {
        if self.clean || !self.confirm_quit || self.quit_armed {
            return vec![AppEvent::Quit];
        }
        self.quit_armed = true;
        vec![self.set_status(UNSAVED_QUIT_HINT)]
    }

    fn leave_edit(&mut self) -> Vec<AppEvent> {
        self.mode = AppMode::Nav;
        self.draft.clear();
        vec![AppEvent::ModeChanged(self.mode)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
