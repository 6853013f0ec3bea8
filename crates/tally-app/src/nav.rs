// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;

use crate::ids::CellId;
use crate::item::{Field, INPUT_FIELD_COUNT, Rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavLinks {
    pub left: Option<CellId>,
    pub right: Option<CellId>,
    pub up: Option<CellId>,
    pub down: Option<CellId>,
}

impl NavLinks {
    pub const fn toward(&self, direction: Direction) -> Option<CellId> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavSlot {
    /// Position among line items, spacers not counted.
    pub row: usize,
    pub field: Field,
}

/// Focus-movement links between line item input cells. Derived from item
/// order and rebuilt from scratch after every structural change.
#[derive(Debug, Clone, Default)]
pub struct NavGraph {
    links: HashMap<CellId, NavLinks>,
    slots: HashMap<CellId, NavSlot>,
    grid: Vec<[CellId; INPUT_FIELD_COUNT]>,
}

impl NavGraph {
    pub fn rebuild(rows: &Rows) -> Self {
        let grid: Vec<[CellId; INPUT_FIELD_COUNT]> = rows
            .line_items()
            .map(|(_, line)| Field::INPUTS.map(|field| line.cell(field)))
            .collect();

        let mut links = HashMap::with_capacity(grid.len() * INPUT_FIELD_COUNT);
        let mut slots = HashMap::with_capacity(grid.len() * INPUT_FIELD_COUNT);
        for (row, cells) in grid.iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                links.insert(
                    *cell,
                    NavLinks {
                        left: column.checked_sub(1).map(|left| cells[left]),
                        right: cells.get(column + 1).copied(),
                        up: row
                            .checked_sub(1)
                            .and_then(|above| grid.get(above))
                            .map(|above| above[column]),
                        down: grid.get(row + 1).map(|below| below[column]),
                    },
                );
                slots.insert(
                    *cell,
                    NavSlot {
                        row,
                        field: Field::INPUTS[column],
                    },
                );
            }
        }

        Self { links, slots, grid }
    }

    pub fn links(&self, cell: CellId) -> Option<NavLinks> {
        self.links.get(&cell).copied()
    }

    pub fn step(&self, from: CellId, direction: Direction) -> Option<CellId> {
        self.links.get(&from)?.toward(direction)
    }

    pub fn slot(&self, cell: CellId) -> Option<NavSlot> {
        self.slots.get(&cell).copied()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.links.contains_key(&cell)
    }

    pub fn first(&self) -> Option<CellId> {
        self.grid.first().map(|cells| cells[0])
    }

    /// Cell at `(row, field)`, clamping the row into range.
    pub fn nearest(&self, row: usize, field: Field) -> Option<CellId> {
        let column = Field::INPUTS.iter().position(|input| *input == field)?;
        let last = self.grid.len().checked_sub(1)?;
        self.grid.get(row.min(last)).map(|cells| cells[column])
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }
}
