// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::cell::{Category, Cell, Cells};
use crate::history::{ActionKind, History, Step};
use crate::ids::{CellId, ItemId};
use crate::item::{Item, LineItem, Rows};
use crate::ledger::Ledger;
use crate::nav::NavGraph;
use crate::snapshot::{BalanceRecord, ItemRecord, LineItemRecord, Snapshot};
use crate::value::{CellValue, Cents, ParseError};

/// Root of consistency: the ledger, its undo history and the navigation
/// graph derived from item order. Every mutation goes through `History` and
/// then settles here before control returns.
#[derive(Debug, Clone)]
pub struct Document {
    ledger: Ledger,
    history: History,
    nav: NavGraph,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::from_ledger(Ledger::new(&BalanceRecord::default()))
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::from_ledger(Ledger::from_snapshot(snapshot))
    }

    fn from_ledger(ledger: Ledger) -> Self {
        let nav = NavGraph::rebuild(ledger.rows());
        Self {
            ledger,
            history: History::default(),
            nav,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.ledger.snapshot()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn cells(&self) -> &Cells {
        self.ledger.cells()
    }

    pub fn rows(&self) -> &Rows {
        self.ledger.rows()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn nav(&self) -> &NavGraph {
        &self.nav
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.ledger.cell(id)
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<(ItemId, &Item)> {
        let id = self.rows().at(index)?;
        self.rows().get(id).map(|item| (id, item))
    }

    pub fn position_of(&self, item: ItemId) -> Option<usize> {
        self.rows().position(item)
    }

    pub fn line_item(&self, item: ItemId) -> Option<&LineItem> {
        self.ledger.line_item(item)
    }

    pub fn total(&self, category: Category) -> Cents {
        self.ledger.total(category)
    }

    pub fn remainder(&self, category: Category) -> Cents {
        self.ledger.remainder(category)
    }

    pub fn balance(&self, category: Category) -> Cents {
        self.ledger.balance(category)
    }

    pub fn balance_cell(&self, category: Category) -> CellId {
        self.ledger.balances().balance[category.index()]
    }

    pub fn total_cell(&self, category: Category) -> CellId {
        self.ledger.balances().total[category.index()]
    }

    pub fn remainder_cell(&self, category: Category) -> CellId {
        self.ledger.balances().remainder[category.index()]
    }

    pub fn find_stale(&self) -> Option<CellId> {
        self.ledger.find_stale()
    }

    /// Records `kind`, applies it and settles.
    pub fn do_action(&mut self, kind: ActionKind) -> Step {
        let step = self.history.push(kind, &mut self.ledger);
        self.settle(step);
        step
    }

    /// Places a new item built from `record` at `index`, or at the end.
    pub fn insert_item(&mut self, record: &ItemRecord, index: Option<usize>) -> ItemId {
        let item = self.ledger.create_item(record);
        let len = self.len();
        let index = index.map_or(len, |index| index.min(len));
        self.do_action(ActionKind::Insert { item, index });
        item
    }

    pub fn insert_line_item(&mut self, index: Option<usize>) -> ItemId {
        self.insert_item(&ItemRecord::Line(LineItemRecord::default()), index)
    }

    pub fn insert_spacer(&mut self, index: Option<usize>) -> ItemId {
        self.insert_item(&ItemRecord::spacer(), index)
    }

    pub fn remove_item(&mut self, item: ItemId) -> Option<Step> {
        let index = self.position_of(item)?;
        Some(self.do_action(ActionKind::Remove { item, index }))
    }

    pub fn delete_item_at(&mut self, index: usize) -> Option<Step> {
        let item = self.rows().at(index)?;
        Some(self.do_action(ActionKind::Remove { item, index }))
    }

    /// Moves the item at `from` so it ends up at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Option<Step> {
        let len = self.len();
        if from >= len || to >= len || from == to {
            return None;
        }
        Some(self.do_action(ActionKind::Move { from, to }))
    }

    /// Skips derived cells, values of the wrong type and null edits.
    pub fn edit(&mut self, cell: CellId, value: CellValue) -> Option<Step> {
        let current = self.ledger.cell(cell)?;
        let format = current.input_format()?;
        if !format.accepts(&value) || *current.value() == value {
            return None;
        }
        let old = current.value().clone();
        Some(self.do_action(ActionKind::Edit {
            cell,
            old,
            new: value,
        }))
    }

    pub fn edit_text(&mut self, cell: CellId, raw: &str) -> Result<Option<Step>, ParseError> {
        let Some(format) = self.ledger.cell(cell).and_then(Cell::input_format) else {
            return Ok(None);
        };
        let value = format.parse(raw)?;
        Ok(self.edit(cell, value))
    }

    pub fn undo(&mut self) -> Option<Step> {
        let step = self.history.undo(&mut self.ledger)?;
        self.settle(step);
        Some(step)
    }

    pub fn redo(&mut self) -> Option<Step> {
        let step = self.history.redo(&mut self.ledger)?;
        self.settle(step);
        Some(step)
    }

    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    pub fn note_clean_point(&mut self) {
        self.history.note_clean_point();
    }

    fn settle(&mut self, step: Step) {
        self.ledger.refresh_totals();
        if step.structural {
            self.nav = NavGraph::rebuild(self.ledger.rows());
        }
        debug_assert_eq!(self.ledger.find_stale(), None, "stale cell after settle");
        log::trace!(
            "settled {:?}: {} item(s), cursor {}/{}",
            step.action,
            self.len(),
            self.history.cursor(),
            self.history.len()
        );
    }
}
