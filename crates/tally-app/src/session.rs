// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::document::Document;
use crate::history::{Step, Touch};
use crate::ids::CellId;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentCommand {
    LoadSnapshot(Snapshot),
    ResetToEmpty,
    /// Index of the new item; `None` appends.
    InsertLineItem {
        at: Option<usize>,
    },
    InsertSpacer {
        at: Option<usize>,
    },
    DeleteItemAt(usize),
    MoveItem {
        from: usize,
        to: usize,
    },
    EditCell {
        cell: CellId,
        text: String,
    },
    Undo,
    Redo,
    NoteSaved,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// The whole document was swapped out; cell and item handles are invalid.
    Replaced,
    DirtyStateChanged {
        clean: bool,
    },
    SnapshotChanged(Snapshot),
    /// Input did not parse; the host should show `display` again.
    EditRejected {
        cell: CellId,
        display: String,
        reason: String,
    },
    Touched(Touch),
}

/// Host-facing command surface over one document at a time.
#[derive(Debug, Clone, Default)]
pub struct Session {
    document: Document,
}

impl Session {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::new(Document::from_snapshot(snapshot))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_clean(&self) -> bool {
        self.document.is_clean()
    }

    pub fn dispatch(&mut self, command: DocumentCommand) -> Vec<DocumentEvent> {
        match command {
            DocumentCommand::LoadSnapshot(snapshot) => {
                log::debug!("loading snapshot with {} item(s)", snapshot.items.len());
                self.replace(Document::from_snapshot(&snapshot))
            }
            DocumentCommand::ResetToEmpty => {
                log::debug!("resetting to an empty budget");
                self.replace(Document::new())
            }
            DocumentCommand::InsertLineItem { at } => {
                let item = self.document.insert_line_item(at);
                self.settled(Some(Touch::Item(item)))
            }
            DocumentCommand::InsertSpacer { at } => {
                let item = self.document.insert_spacer(at);
                self.settled(Some(Touch::Item(item)))
            }
            DocumentCommand::DeleteItemAt(index) => {
                let step = self.document.delete_item_at(index);
                self.after(step)
            }
            DocumentCommand::MoveItem { from, to } => {
                let step = self.document.move_item(from, to);
                self.after(step)
            }
            DocumentCommand::EditCell { cell, text } => self.edit(cell, &text),
            DocumentCommand::Undo => {
                let step = self.document.undo();
                self.after(step)
            }
            DocumentCommand::Redo => {
                let step = self.document.redo();
                self.after(step)
            }
            DocumentCommand::NoteSaved => {
                self.document.note_clean_point();
                vec![DocumentEvent::DirtyStateChanged {
                    clean: self.document.is_clean(),
                }]
            }
        }
    }

    fn edit(&mut self, cell: CellId, text: &str) -> Vec<DocumentEvent> {
        match self.document.edit_text(cell, text) {
            Ok(step) => self.after(step),
            Err(error) => {
                log::debug!("rejected edit of {cell:?}: {error}");
                let display = self
                    .document
                    .cell(cell)
                    .map(|cell| cell.display().to_owned())
                    .unwrap_or_default();
                vec![DocumentEvent::EditRejected {
                    cell,
                    display,
                    reason: error.to_string(),
                }]
            }
        }
    }

    fn replace(&mut self, document: Document) -> Vec<DocumentEvent> {
        self.document = document;
        let mut events = vec![DocumentEvent::Replaced];
        events.extend(self.settled(None));
        events
    }

    fn after(&self, step: Option<Step>) -> Vec<DocumentEvent> {
        match step {
            Some(step) => self.settled(step.touch),
            None => Vec::new(),
        }
    }

    fn settled(&self, touch: Option<Touch>) -> Vec<DocumentEvent> {
        let mut events = Vec::with_capacity(3);
        if let Some(touch) = touch {
            events.push(DocumentEvent::Touched(touch));
        }
        events.push(DocumentEvent::DirtyStateChanged {
            clean: self.document.is_clean(),
        });
        events.push(DocumentEvent::SnapshotChanged(self.document.snapshot()));
        events
    }
}
