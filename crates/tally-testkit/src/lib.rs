// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use tally_app::{BalanceRecord, ItemRecord, LineItemRecord, Snapshot};

const EXPENSE_NAMES: [&str; 24] = [
    "Rent",
    "Mortgage",
    "Electric",
    "Gas",
    "Water",
    "Trash",
    "Internet",
    "Phone",
    "Car Payment",
    "Car Insurance",
    "Renters Insurance",
    "Groceries",
    "Gym",
    "Streaming",
    "Music",
    "Student Loan",
    "Credit Card",
    "Daycare",
    "Pet Food",
    "Parking",
    "Transit Pass",
    "Savings",
    "Charity",
    "Haircut",
];

const DUE_DAYS: [&str; 10] = [
    "1st", "5th", "10th", "12th", "15th", "18th", "20th", "25th", "28th", "",
];

const PERCENT_STEPS: [f64; 6] = [0.0, 0.25, 0.5, 0.75, 0.9, 1.0];

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible budgets. Amounts are whole cents and
/// percentages whole percents, so generated snapshots survive a load/save
/// cycle unchanged.
pub struct BudgetFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl BudgetFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn line_item(&mut self) -> LineItemRecord {
        LineItemRecord {
            name: self.pick(&EXPENSE_NAMES).to_owned(),
            amount: self.dollars(5_00, 2_500_00),
            pay_percent: self.pick_percent(),
            paid_percent: self.pick_percent(),
            usually_due: self.pick(&DUE_DAYS).to_owned(),
        }
    }

    /// `lines` line items with a spacer roughly every fourth row.
    pub fn budget(&mut self, lines: usize) -> Snapshot {
        let mut items = Vec::with_capacity(lines + lines / 3);
        for index in 0..lines {
            if index > 0 && self.int_n(4) == 0 {
                items.push(ItemRecord::spacer());
            }
            items.push(ItemRecord::Line(self.line_item()));
        }
        let balances = BalanceRecord {
            amount: self.dollars(1_000_00, 8_000_00),
            to_pay: self.dollars(500_00, 5_000_00),
            due: self.dollars(0, 3_000_00),
        };
        Snapshot { items, balances }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_percent(&mut self) -> f64 {
        PERCENT_STEPS[self.rng.int_n(PERCENT_STEPS.len())]
    }

    fn dollars(&mut self, min_cents: i64, max_cents: i64) -> f64 {
        let span = (max_cents - min_cents + 1) as u64;
        let cents = min_cents + (self.rng.next_u64() % span) as i64;
        cents as f64 / 100.0
    }
}

pub fn line(name: &str, amount: f64, pay_percent: f64, paid_percent: f64) -> ItemRecord {
    ItemRecord::Line(LineItemRecord {
        name: name.to_owned(),
        amount,
        pay_percent,
        paid_percent,
        usually_due: String::new(),
    })
}

/// Small hand-written budget with a spacer, used where exact numbers matter.
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        items: vec![
            ItemRecord::Line(LineItemRecord {
                name: "Rent".to_owned(),
                amount: 1_200.0,
                pay_percent: 1.0,
                paid_percent: 0.0,
                usually_due: "1st".to_owned(),
            }),
            ItemRecord::Line(LineItemRecord {
                name: "Electric".to_owned(),
                amount: 85.4,
                pay_percent: 0.5,
                paid_percent: 0.0,
                usually_due: "12th".to_owned(),
            }),
            ItemRecord::spacer(),
            ItemRecord::Line(LineItemRecord {
                name: "Internet".to_owned(),
                amount: 60.0,
                pay_percent: 1.0,
                paid_percent: 1.0,
                usually_due: "20th".to_owned(),
            }),
        ],
        balances: BalanceRecord {
            amount: 1_500.0,
            to_pay: 1_300.0,
            due: 1_250.0,
        },
    }
}

/// Five line items `a`..`e` with amounts 1..5 dollars and no spacers.
pub fn five_lines() -> Snapshot {
    Snapshot {
        items: ["a", "b", "c", "d", "e"]
            .iter()
            .zip(1..)
            .map(|(name, dollars)| line(name, f64::from(dollars), 1.0, 0.0))
            .collect(),
        balances: BalanceRecord {
            amount: 100.0,
            to_pay: 100.0,
            due: 100.0,
        },
    }
}

pub fn temp_budget_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("budget.json");
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::{BudgetFaker, five_lines, sample_snapshot};
    use std::collections::BTreeSet;
    use tally_app::{Document, ItemRecord};

    #[test]
    fn same_seed_same_budget() {
        let left = BudgetFaker::new(42).budget(8);
        let right = BudgetFaker::new(42).budget(8);
        assert_eq!(left, right);
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(BudgetFaker::new(0).seed(), 1);
    }

    #[test]
    fn budget_has_requested_line_count() {
        let mut faker = BudgetFaker::new(7);
        let budget = faker.budget(12);
        let lines = budget
            .items
            .iter()
            .filter(|item| matches!(item, ItemRecord::Line(_)))
            .count();
        assert_eq!(lines, 12);
        assert!(!matches!(budget.items.first(), Some(ItemRecord::Spacer(_))));
    }

    #[test]
    fn generated_budgets_survive_a_document_round_trip() {
        for seed in 1_u64..10_u64 {
            let budget = BudgetFaker::new(seed).budget(6);
            assert_eq!(Document::from_snapshot(&budget).snapshot(), budget);
        }
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            names.insert(BudgetFaker::new(seed).line_item().name);
        }
        assert!(names.len() >= 8, "got {}", names.len());
    }

    #[test]
    fn fixtures_are_well_formed() {
        assert_eq!(five_lines().items.len(), 5);
        assert_eq!(sample_snapshot().items.len(), 4);
    }

    #[test]
    fn int_n() {
        let mut faker = BudgetFaker::new(42);
        for _ in 0..100 {
            assert!(faker.int_n(5) < 5);
        }
    }
}
