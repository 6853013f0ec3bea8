// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};

use crate::cell::Category;
use crate::item::NEW_LINE_ITEM_NAME;

/// Persisted/transmitted shape of a whole document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    // Budgets saved by the first desktop build used `expenses`.
    #[serde(alias = "expenses", default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub balances: BalanceRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemRecord {
    Spacer(SpacerRecord),
    Line(LineItemRecord),
}

impl ItemRecord {
    pub const fn spacer() -> Self {
        Self::Spacer(SpacerRecord { space: true })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacerRecord {
    pub space: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemRecord {
    pub name: String,
    pub amount: f64,
    pub pay_percent: f64,
    pub paid_percent: f64,
    pub usually_due: String,
}

impl Default for LineItemRecord {
    fn default() -> Self {
        Self {
            name: NEW_LINE_ITEM_NAME.to_owned(),
            amount: 0.0,
            pay_percent: 1.0,
            paid_percent: 0.0,
            usually_due: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceRecord {
    pub amount: f64,
    pub to_pay: f64,
    pub due: f64,
}

impl BalanceRecord {
    pub const fn get(&self, category: Category) -> f64 {
        match category {
            Category::Amount => self.amount,
            Category::ToPay => self.to_pay,
            Category::Due => self.due,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemRecord {
    #[serde(default)]
    space: bool,
    #[serde(flatten)]
    line: LineItemRecord,
}

impl<'de> Deserialize<'de> for ItemRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawItemRecord::deserialize(deserializer).map(Self::from)
    }
}

impl From<RawItemRecord> for ItemRecord {
    fn from(raw: RawItemRecord) -> Self {
        if raw.space {
            Self::spacer()
        } else {
            Self::Line(raw.line)
        }
    }
}
