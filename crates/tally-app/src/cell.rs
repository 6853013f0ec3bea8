// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::CellId;
use crate::value::{CellValue, Cents, ExactMoney, Percent, ValueFormat};

/// The three aggregated budget categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Amount,
    ToPay,
    Due,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Amount, Self::ToPay, Self::Due];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::ToPay => "to pay",
            Self::Due => "due",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Amount => 0,
            Self::ToPay => 1,
            Self::Due => 2,
        }
    }
}

/// Recomputation rule of a derived cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    ToPay { amount: CellId, pay: CellId },
    Due { to_pay: CellId, paid: CellId },
    ActuallyDue { due: CellId, usually_due: CellId },
    /// No fixed upstream cells; the owner pulls it over the whole item list.
    Total(Category),
    Remainder { balance: CellId, total: CellId },
}

pub const NOT_DUE_PLACEHOLDER: &str = "-";

impl Formula {
    pub fn upstream(self) -> Vec<CellId> {
        match self {
            Self::ToPay { amount, pay } => vec![amount, pay],
            Self::Due { to_pay, paid } => vec![to_pay, paid],
            Self::ActuallyDue { due, usually_due } => vec![due, usually_due],
            Self::Total(_) => Vec::new(),
            Self::Remainder { balance, total } => vec![balance, total],
        }
    }

    fn evaluate(self, cells: &Cells, totals: &dyn Aggregate) -> CellValue {
        match self {
            Self::ToPay { amount, pay } => {
                CellValue::ExactMoney(cells.exact(amount).percent_of(cells.percent(pay)))
            }
            Self::Due { to_pay, paid } => CellValue::ExactMoney(
                cells
                    .exact(to_pay)
                    .percent_of(cells.percent(paid).complement()),
            ),
            Self::ActuallyDue { due, usually_due } => {
                if cells.exact(due).is_zero() {
                    CellValue::Text(NOT_DUE_PLACEHOLDER.to_owned())
                } else {
                    CellValue::Text(cells.text(usually_due).to_owned())
                }
            }
            Self::Total(category) => CellValue::Money(totals.total(category, cells)),
            Self::Remainder { balance, total } => {
                CellValue::Money(cells.money(balance).saturating_sub(cells.money(total)))
            }
        }
    }
}

/// Source of per-category sums for `Formula::Total`.
pub trait Aggregate {
    fn total(&self, category: Category, cells: &Cells) -> Cents;
}

/// For cells that never read a total.
pub struct NoAggregate;

impl Aggregate for NoAggregate {
    fn total(&self, _category: Category, _cells: &Cells) -> Cents {
        Cents::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Input(ValueFormat),
    Derived(Formula),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    value: CellValue,
    display: String,
    subscriber: Option<CellId>,
    kind: CellKind,
}

impl Cell {
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn subscriber(&self) -> Option<CellId> {
        self.subscriber
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn input_format(&self) -> Option<ValueFormat> {
        match self.kind {
            CellKind::Input(format) => Some(format),
            CellKind::Derived(_) => None,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, CellKind::Input(_))
    }

    fn store(&mut self, value: CellValue) {
        self.display = value.display();
        self.value = value;
    }
}

/// Cell arena owned by a Document. Subscriber links are plain handles into it.
/// Slots are never freed; cells of unplaced items keep their values but feed
/// no total.
#[derive(Debug, Clone, Default)]
pub struct Cells {
    slots: Vec<Cell>,
}

impl Cells {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots.get(id.get())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, cell)| (CellId::new(index), cell))
    }

    pub fn money(&self, id: CellId) -> Cents {
        self.get(id)
            .map(|cell| cell.value.as_money())
            .unwrap_or(Cents::ZERO)
    }

    /// Unrounded money; input cells convert from whole cents.
    pub fn exact(&self, id: CellId) -> ExactMoney {
        self.get(id)
            .map(|cell| cell.value.as_exact())
            .unwrap_or(ExactMoney::ZERO)
    }

    pub fn percent(&self, id: CellId) -> Percent {
        self.get(id)
            .map(|cell| cell.value.as_percent())
            .unwrap_or(Percent::ZERO)
    }

    pub fn text(&self, id: CellId) -> &str {
        self.get(id).map(|cell| cell.value.as_text()).unwrap_or("")
    }

    pub fn add_input(&mut self, format: ValueFormat, initial: CellValue) -> CellId {
        debug_assert!(format.accepts(&initial), "{format:?} cannot hold {initial:?}");
        let id = CellId::new(self.slots.len());
        self.slots.push(Cell {
            display: initial.display(),
            value: initial,
            subscriber: None,
            kind: CellKind::Input(format),
        });
        id
    }

    /// Adds a derived cell, subscribes it to every upstream cell of `formula`,
    /// and computes its first value.
    pub fn add_derived(&mut self, formula: Formula, totals: &dyn Aggregate) -> CellId {
        let value = formula.evaluate(self, totals);
        let id = CellId::new(self.slots.len());
        self.slots.push(Cell {
            display: value.display(),
            value,
            subscriber: None,
            kind: CellKind::Derived(formula),
        });
        for upstream in formula.upstream() {
            self.subscribe(upstream, id);
        }
        id
    }

    fn subscribe(&mut self, upstream: CellId, downstream: CellId) {
        let Some(cell) = self.slots.get_mut(upstream.get()) else {
            return;
        };
        debug_assert!(
            cell.subscriber.is_none(),
            "cell {upstream:?} already feeds {:?}",
            cell.subscriber
        );
        cell.subscriber = Some(downstream);
    }

    /// Stores a new value on an input cell and runs its cascade to completion.
    /// Returns false when `id` is not an input cell that can hold `value`.
    pub fn set_value(&mut self, id: CellId, value: CellValue, totals: &dyn Aggregate) -> bool {
        let Some(cell) = self.slots.get_mut(id.get()) else {
            return false;
        };
        match cell.kind {
            CellKind::Input(format) if format.accepts(&value) => {}
            _ => return false,
        }
        cell.store(value);
        let next = cell.subscriber;
        self.propagate(next, totals);
        true
    }

    /// Recomputes a derived cell and everything downstream of it.
    pub fn refresh(&mut self, id: CellId, totals: &dyn Aggregate) {
        self.propagate(Some(id), totals);
    }

    fn propagate(&mut self, start: Option<CellId>, totals: &dyn Aggregate) {
        let mut next = start;
        while let Some(id) = next {
            let Some(cell) = self.slots.get(id.get()) else {
                return;
            };
            let CellKind::Derived(formula) = cell.kind else {
                return;
            };
            let value = formula.evaluate(self, totals);
            log::trace!("refresh {id:?} -> {value:?}");
            let cell = &mut self.slots[id.get()];
            cell.store(value);
            next = cell.subscriber;
        }
    }

    /// First derived cell whose cached value disagrees with its formula.
    pub fn find_stale(&self, totals: &dyn Aggregate) -> Option<CellId> {
        self.iter().find_map(|(id, cell)| match cell.kind {
            CellKind::Derived(formula) if formula.evaluate(self, totals) != cell.value => Some(id),
            _ => None,
        })
    }
}
