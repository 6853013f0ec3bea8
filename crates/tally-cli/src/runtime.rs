// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use tally_app::Snapshot;
use tally_store::BudgetFile;
use tally_testkit::BudgetFaker;

const DEMO_SEED: u64 = 2026;
const DEMO_LINES: usize = 12;

pub struct FileRuntime {
    file: BudgetFile,
}

impl FileRuntime {
    pub fn new(file: BudgetFile) -> Self {
        Self { file }
    }
}

impl tally_tui::AppRuntime for FileRuntime {
    fn load_budget(&mut self) -> Result<Snapshot> {
        self.file.load()
    }

    fn save_budget(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.file.save(snapshot)
    }

    fn budget_label(&self) -> String {
        self.file.path().display().to_string()
    }
}

/// Seeded in-memory budget; nothing is read from or written to disk.
pub struct DemoRuntime {
    snapshot: Snapshot,
}

impl DemoRuntime {
    pub fn new() -> Self {
        Self {
            snapshot: BudgetFaker::new(DEMO_SEED).budget(DEMO_LINES),
        }
    }
}

impl Default for DemoRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl tally_tui::AppRuntime for DemoRuntime {
    fn load_budget(&mut self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }

    fn save_budget(&mut self, _snapshot: &Snapshot) -> Result<()> {
        bail!("demo budget is in-memory; restart without --demo to edit a file")
    }

    fn budget_label(&self) -> String {
        "demo".to_owned()
    }

    fn can_save(&self) -> bool {
        false
    }
}
