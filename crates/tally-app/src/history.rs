// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::{ActionId, CellId, ItemId};
use crate::ledger::Ledger;
use crate::value::CellValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Edit {
        cell: CellId,
        old: CellValue,
        new: CellValue,
    },
    Insert {
        item: ItemId,
        index: usize,
    },
    Remove {
        item: ItemId,
        index: usize,
    },
    /// Remove at `from`, then insert at `to`; identity is preserved.
    Move {
        from: usize,
        to: usize,
    },
}

impl ActionKind {
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::Edit { .. })
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Edit { .. } => "edit",
            Self::Insert { .. } => "insert",
            Self::Remove { .. } => "remove",
            Self::Move { .. } => "move",
        }
    }
}

/// What a step changed, for the host to highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    Cell(CellId),
    Item(ItemId),
}

/// Outcome of applying or undoing one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub action: ActionId,
    pub structural: bool,
    pub touch: Option<Touch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    id: ActionId,
    kind: ActionKind,
}

impl Action {
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    fn apply(&self, ledger: &mut Ledger) -> Option<Touch> {
        match &self.kind {
            ActionKind::Edit { cell, new, .. } => {
                let stored = ledger.set_input(*cell, new.clone());
                debug_assert!(stored, "replay of edit on {cell:?} was refused");
                Some(Touch::Cell(*cell))
            }
            ActionKind::Insert { item, index } => {
                ledger.insert_item(*index, *item);
                Some(Touch::Item(*item))
            }
            ActionKind::Remove { item, index } => {
                let removed = ledger.remove_item(*item);
                debug_assert_eq!(removed, Some(*index), "remove {item:?} off position");
                None
            }
            ActionKind::Move { from, to } => move_item(ledger, *from, *to),
        }
    }

    fn undo(&self, ledger: &mut Ledger) -> Option<Touch> {
        match &self.kind {
            ActionKind::Edit { cell, old, .. } => {
                let stored = ledger.set_input(*cell, old.clone());
                debug_assert!(stored, "undo of edit on {cell:?} was refused");
                Some(Touch::Cell(*cell))
            }
            ActionKind::Insert { item, .. } => {
                ledger.remove_item(*item);
                None
            }
            ActionKind::Remove { item, index } => {
                ledger.insert_item(*index, *item);
                Some(Touch::Item(*item))
            }
            ActionKind::Move { from, to } => move_item(ledger, *to, *from),
        }
    }
}

fn move_item(ledger: &mut Ledger, from: usize, to: usize) -> Option<Touch> {
    let item = ledger.remove_item_at(from)?;
    ledger.insert_item(to, item);
    Some(Touch::Item(item))
}

/// Linear undo/redo over a document's actions with a remembered clean point.
#[derive(Debug, Clone, Default)]
pub struct History {
    actions: Vec<Action>,
    next: usize,
    clean: Option<ActionId>,
    issued: u64,
}

impl History {
    /// Drops any redo tail, records `kind`, and applies it. Items created for
    /// dropped inserts stay in the ledger's arenas, unplaced.
    pub fn push(&mut self, kind: ActionKind, ledger: &mut Ledger) -> Step {
        if self.next < self.actions.len() {
            log::debug!(
                "discarding {} redo action(s)",
                self.actions.len() - self.next
            );
            self.actions.truncate(self.next);
        }

        self.issued += 1;
        let id = ActionId::new(self.issued);
        log::debug!("record {} as {id:?}", kind.label());
        let action = Action { id, kind };
        let touch = action.apply(ledger);
        let step = Step {
            action: id,
            structural: action.kind.is_structural(),
            touch,
        };
        self.actions.push(action);
        self.next = self.actions.len();
        step
    }

    pub fn undo(&mut self, ledger: &mut Ledger) -> Option<Step> {
        if self.next == 0 {
            return None;
        }
        self.next -= 1;
        let action = &self.actions[self.next];
        let touch = action.undo(ledger);
        Some(Step {
            action: action.id,
            structural: action.kind.is_structural(),
            touch,
        })
    }

    pub fn redo(&mut self, ledger: &mut Ledger) -> Option<Step> {
        let action = self.actions.get(self.next)?;
        let touch = action.apply(ledger);
        let step = Step {
            action: action.id,
            structural: action.kind.is_structural(),
            touch,
        };
        self.next += 1;
        Some(step)
    }

    pub fn is_clean(&self) -> bool {
        match self.next.checked_sub(1) {
            None => self.clean.is_none(),
            Some(last) => Some(self.actions[last].id) == self.clean,
        }
    }

    pub fn note_clean_point(&mut self) {
        self.clean = self
            .next
            .checked_sub(1)
            .map(|last| self.actions[last].id);
    }

    pub fn can_undo(&self) -> bool {
        self.next > 0
    }

    pub fn can_redo(&self) -> bool {
        self.next < self.actions.len()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Index of the next redoable action.
    pub fn cursor(&self) -> usize {
        self.next
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn clean_point(&self) -> Option<ActionId> {
        self.clean
    }
}
