// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::cell::{Category, Cell, Cells, Formula};
use crate::ids::{CellId, ItemId};
use crate::item::{Item, LineItem, Rows};
use crate::snapshot::{BalanceRecord, ItemRecord, LineItemRecord, Snapshot};
use crate::value::{CellValue, Cents, ValueFormat};

/// Balance inputs and their totals/remainders, indexed by `Category::index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub balance: [CellId; 3],
    pub total: [CellId; 3],
    pub remainder: [CellId; 3],
}

/// Everything actions mutate: cells, items, balances.
#[derive(Debug, Clone)]
pub struct Ledger {
    cells: Cells,
    rows: Rows,
    balances: Balances,
}

impl Ledger {
    pub fn new(balances: &BalanceRecord) -> Self {
        let mut cells = Cells::default();
        let rows = Rows::default();

        let balance = Category::ALL.map(|category| {
            cells.add_input(
                ValueFormat::Money,
                CellValue::Money(Cents::from_dollars(balances.get(category))),
            )
        });
        let total = Category::ALL.map(|category| cells.add_derived(Formula::Total(category), &rows));
        let remainder = Category::ALL.map(|category| {
            let index = category.index();
            cells.add_derived(
                Formula::Remainder {
                    balance: balance[index],
                    total: total[index],
                },
                &rows,
            )
        });

        Self {
            cells,
            rows,
            balances: Balances {
                balance,
                total,
                remainder,
            },
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut ledger = Self::new(&snapshot.balances);
        for record in &snapshot.items {
            let id = ledger.create_item(record);
            ledger.rows.insert(usize::MAX, id);
        }
        ledger.refresh_totals();
        ledger
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn rows(&self) -> &Rows {
        &self.rows
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Builds an unplaced item in the arena.
    pub fn create_item(&mut self, record: &ItemRecord) -> ItemId {
        let item = match record {
            ItemRecord::Line(line) => Item::Line(LineItem::build(&mut self.cells, line)),
            ItemRecord::Spacer(_) => Item::Spacer,
        };
        self.rows.alloc(item)
    }

    pub fn set_input(&mut self, cell: CellId, value: CellValue) -> bool {
        self.cells.set_value(cell, value, &self.rows)
    }

    pub fn insert_item(&mut self, index: usize, item: ItemId) -> usize {
        self.rows.insert(index, item)
    }

    pub fn remove_item(&mut self, item: ItemId) -> Option<usize> {
        self.rows.remove(item)
    }

    pub fn remove_item_at(&mut self, index: usize) -> Option<ItemId> {
        self.rows.remove_at(index)
    }

    /// Totals are pulled; each pushes into its remainder.
    pub fn refresh_totals(&mut self) {
        for total in self.balances.total {
            self.cells.refresh(total, &self.rows);
        }
    }

    pub fn total(&self, category: Category) -> Cents {
        self.cells.money(self.balances.total[category.index()])
    }

    pub fn remainder(&self, category: Category) -> Cents {
        self.cells.money(self.balances.remainder[category.index()])
    }

    pub fn balance(&self, category: Category) -> Cents {
        self.cells.money(self.balances.balance[category.index()])
    }

    pub fn find_stale(&self) -> Option<CellId> {
        self.cells.find_stale(&self.rows)
    }

    pub fn snapshot(&self) -> Snapshot {
        let items = self
            .rows
            .iter()
            .map(|(_, item)| match item {
                Item::Line(line) => ItemRecord::Line(line.record(&self.cells)),
                Item::Spacer => ItemRecord::spacer(),
            })
            .collect();
        Snapshot {
            items,
            balances: BalanceRecord {
                amount: self.balance(Category::Amount).to_dollars(),
                to_pay: self.balance(Category::ToPay).to_dollars(),
                due: self.balance(Category::Due).to_dollars(),
            },
        }
    }

    pub fn line_item(&self, item: ItemId) -> Option<&LineItem> {
        self.rows.get(item).and_then(Item::as_line)
    }

    pub fn default_line_record() -> ItemRecord {
        ItemRecord::Line(LineItemRecord::default())
    }
}
