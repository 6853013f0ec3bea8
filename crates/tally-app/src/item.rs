// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::cell::{Aggregate, Category, Cells, Formula, NoAggregate};
use crate::ids::{CellId, ItemId};
use crate::snapshot::LineItemRecord;
use crate::value::{CellValue, Cents, ExactMoney, Percent, ValueFormat};

pub const NEW_LINE_ITEM_NAME: &str = "New Expense";
pub const INPUT_FIELD_COUNT: usize = 5;

/// Columns of a line item, in grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Amount,
    Pay,
    ToPay,
    Paid,
    Due,
    UsuallyDue,
    ActuallyDue,
}

impl Field {
    pub const ALL: [Self; 8] = [
        Self::Name,
        Self::Amount,
        Self::Pay,
        Self::ToPay,
        Self::Paid,
        Self::Due,
        Self::UsuallyDue,
        Self::ActuallyDue,
    ];

    /// Editable fields in navigation order.
    pub const INPUTS: [Self; INPUT_FIELD_COUNT] = [
        Self::Name,
        Self::Amount,
        Self::Pay,
        Self::Paid,
        Self::UsuallyDue,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Amount => "amount",
            Self::Pay => "pay %",
            Self::ToPay => "to pay",
            Self::Paid => "paid %",
            Self::Due => "due",
            Self::UsuallyDue => "usually due",
            Self::ActuallyDue => "actually due",
        }
    }

    pub const fn is_input(self) -> bool {
        matches!(
            self,
            Self::Name | Self::Amount | Self::Pay | Self::Paid | Self::UsuallyDue
        )
    }

    pub const fn category(self) -> Option<Category> {
        match self {
            Self::Amount => Some(Category::Amount),
            Self::ToPay => Some(Category::ToPay),
            Self::Due => Some(Category::Due),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub name: CellId,
    pub amount: CellId,
    pub pay: CellId,
    pub to_pay: CellId,
    pub paid: CellId,
    pub due: CellId,
    pub usually_due: CellId,
    pub actually_due: CellId,
}

impl LineItem {
    /// Creates the item's cells in dependency order so every subscriber link
    /// points forward.
    pub fn build(cells: &mut Cells, record: &LineItemRecord) -> Self {
        let name = cells.add_input(ValueFormat::Text, CellValue::Text(record.name.clone()));
        let amount = cells.add_input(
            ValueFormat::Money,
            CellValue::Money(Cents::from_dollars(record.amount)),
        );
        let pay = cells.add_input(
            ValueFormat::Percent,
            CellValue::Percent(Percent::from_fraction(record.pay_percent)),
        );
        let to_pay = cells.add_derived(Formula::ToPay { amount, pay }, &NoAggregate);
        let paid = cells.add_input(
            ValueFormat::Percent,
            CellValue::Percent(Percent::from_fraction(record.paid_percent)),
        );
        let due = cells.add_derived(Formula::Due { to_pay, paid }, &NoAggregate);
        let usually_due = cells.add_input(
            ValueFormat::Text,
            CellValue::Text(record.usually_due.clone()),
        );
        let actually_due =
            cells.add_derived(Formula::ActuallyDue { due, usually_due }, &NoAggregate);

        Self {
            name,
            amount,
            pay,
            to_pay,
            paid,
            due,
            usually_due,
            actually_due,
        }
    }

    pub const fn cell(&self, field: Field) -> CellId {
        match field {
            Field::Name => self.name,
            Field::Amount => self.amount,
            Field::Pay => self.pay,
            Field::ToPay => self.to_pay,
            Field::Paid => self.paid,
            Field::Due => self.due,
            Field::UsuallyDue => self.usually_due,
            Field::ActuallyDue => self.actually_due,
        }
    }

    pub const fn category_cell(&self, category: Category) -> CellId {
        match category {
            Category::Amount => self.amount,
            Category::ToPay => self.to_pay,
            Category::Due => self.due,
        }
    }

    pub fn field_of(&self, cell: CellId) -> Option<Field> {
        Field::ALL.into_iter().find(|field| self.cell(*field) == cell)
    }

    pub fn record(&self, cells: &Cells) -> LineItemRecord {
        LineItemRecord {
            name: cells.text(self.name).to_owned(),
            amount: cells.money(self.amount).to_dollars(),
            pay_percent: cells.percent(self.pay).fraction(),
            paid_percent: cells.percent(self.paid).fraction(),
            usually_due: cells.text(self.usually_due).to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Line(LineItem),
    Spacer,
}

impl Item {
    pub const fn as_line(&self) -> Option<&LineItem> {
        match self {
            Self::Line(line) => Some(line),
            Self::Spacer => None,
        }
    }

    pub const fn is_spacer(&self) -> bool {
        matches!(self, Self::Spacer)
    }
}

/// Item arena plus the document order. Items leave `order` when removed but
/// stay in the arena so history can put them back. The arena only grows: an
/// item whose insert was dropped from the redo tail is never placed again and
/// is released with the owning Document on load or reset.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    items: Vec<Item>,
    order: Vec<ItemId>,
}

impl Rows {
    pub fn alloc(&mut self, item: Item) -> ItemId {
        let id = ItemId::new(self.items.len());
        self.items.push(item);
        id
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.get())
    }

    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<ItemId> {
        self.order.get(index).copied()
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Inserts at `index`, clamped to the end.
    pub fn insert(&mut self, index: usize, id: ItemId) -> usize {
        debug_assert!(self.position(id).is_none(), "{id:?} is already placed");
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        index
    }

    pub fn remove(&mut self, id: ItemId) -> Option<usize> {
        let index = self.position(id)?;
        self.order.remove(index);
        Some(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<ItemId> {
        (index < self.order.len()).then(|| self.order.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|item| (*id, item)))
    }

    pub fn line_items(&self) -> impl Iterator<Item = (ItemId, &LineItem)> {
        self.iter()
            .filter_map(|(id, item)| item.as_line().map(|line| (id, line)))
    }

    /// Placed item owning `cell`, if any.
    pub fn owner_of(&self, cell: CellId) -> Option<(ItemId, Field)> {
        self.line_items()
            .find_map(|(id, line)| line.field_of(cell).map(|field| (id, field)))
    }
}

impl Aggregate for Rows {
    fn total(&self, category: Category, cells: &Cells) -> Cents {
        self.line_items()
            .fold(ExactMoney::ZERO, |sum, (_, line)| {
                sum.saturating_add(cells.exact(line.category_cell(category)))
            })
            .round_to_cents()
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, Item, LineItem, Rows};
    use crate::cell::{Aggregate, Category, Cells};
    use crate::snapshot::LineItemRecord;
    use crate::value::Cents;

    fn record(name: &str, amount: f64) -> LineItemRecord {
        LineItemRecord {
            name: name.to_owned(),
            amount,
            ..LineItemRecord::default()
        }
    }

    #[test]
    fn line_item_derives_to_pay_due_and_actually_due() {
        let mut cells = Cells::default();
        let line = LineItem::build(
            &mut cells,
            &LineItemRecord {
                name: "Rent".to_owned(),
                amount: 100.0,
                pay_percent: 0.5,
                paid_percent: 0.2,
                usually_due: "1st".to_owned(),
            },
        );
        assert_eq!(cells.money(line.to_pay), Cents::new(5_000));
        assert_eq!(cells.money(line.due), Cents::new(4_000));
        assert_eq!(cells.text(line.actually_due), "1st");
        assert_eq!(line.field_of(line.paid), Some(Field::Paid));
    }

    #[test]
    fn rows_keep_identity_across_remove_and_insert() {
        let mut cells = Cells::default();
        let mut rows = Rows::default();
        let first = rows.alloc(Item::Line(LineItem::build(&mut cells, &record("a", 1.0))));
        let spacer = rows.alloc(Item::Spacer);
        let last = rows.alloc(Item::Line(LineItem::build(&mut cells, &record("b", 2.0))));
        for id in [first, spacer, last] {
            rows.insert(usize::MAX, id);
        }

        assert_eq!(rows.remove(spacer), Some(1));
        assert_eq!(rows.order(), &[first, last]);
        assert_eq!(rows.insert(1, spacer), 1);
        assert_eq!(rows.order(), &[first, spacer, last]);
        assert_eq!(rows.remove_at(7), None);
    }

    #[test]
    fn totals_skip_spacers_and_removed_items() {
        let mut cells = Cells::default();
        let mut rows = Rows::default();
        let rent = rows.alloc(Item::Line(LineItem::build(&mut cells, &record("rent", 900.0))));
        let spacer = rows.alloc(Item::Spacer);
        let power = rows.alloc(Item::Line(LineItem::build(&mut cells, &record("power", 60.5))));
        for id in [rent, spacer, power] {
            rows.insert(usize::MAX, id);
        }

        assert_eq!(rows.total(Category::Amount, &cells), Cents::new(96_050));
        rows.remove(power);
        assert_eq!(rows.total(Category::Amount, &cells), Cents::new(90_000));
        assert_eq!(rows.total(Category::Due, &cells), Cents::new(90_000));
    }
}
