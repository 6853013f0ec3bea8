// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tally_app::Snapshot;

pub const APP_NAME: &str = "tally";
pub const BUDGET_FILE_NAME: &str = "budget.json";
pub const BUDGET_PATH_ENV: &str = "TALLY_BUDGET_PATH";

/// A budget document on disk. The file is only touched by `load` and `save`.
#[derive(Debug, Clone)]
pub struct BudgetFile {
    path: PathBuf,
    existed: bool,
}

impl BudgetFile {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_budget_path(&printable)?;
        if path.is_dir() {
            bail!(
                "budget path {} is a directory; pass a file path such as {}",
                path.display(),
                path.join(BUDGET_FILE_NAME).display()
            );
        }
        Ok(Self {
            path: path.to_path_buf(),
            existed: path.exists(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file was on disk when opened or has been saved since.
    pub fn existed(&self) -> bool {
        self.existed
    }

    /// Reads the budget; a missing file is an empty budget.
    pub fn load(&mut self) -> Result<Snapshot> {
        if !self.path.exists() {
            log::info!("no budget at {}; starting empty", self.path.display());
            self.existed = false;
            return Ok(Snapshot::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read budget {}", self.path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw).with_context(|| {
            format!(
                "parse budget {}; fix the JSON or move the file aside",
                self.path.display()
            )
        })?;
        self.existed = true;
        log::info!(
            "loaded {} item(s) from {}",
            snapshot.items.len(),
            self.path.display()
        );
        Ok(snapshot)
    }

    /// Writes pretty JSON to a sibling temp file, then renames it over the
    /// budget so a crash never leaves a half-written file.
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let dir = parent_dir(&self.path);
        fs::create_dir_all(&dir)
            .with_context(|| format!("create budget directory {}", dir.display()))?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut temp, snapshot).context("encode budget")?;
        temp.write_all(b"\n").context("finish budget file")?;
        temp.as_file().sync_all().context("flush budget file")?;
        temp.persist(&self.path)
            .map_err(|error| anyhow!(error.error))
            .with_context(|| format!("replace budget {}", self.path.display()))?;

        self.existed = true;
        log::info!(
            "saved {} item(s) to {}",
            snapshot.items.len(),
            self.path.display()
        );
        Ok(())
    }
}

pub fn default_budget_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(BUDGET_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {BUDGET_PATH_ENV} to a writable budget path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join(BUDGET_FILE_NAME))
}

pub fn validate_budget_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("budget path must not be empty");
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "budget path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("budget path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!("budget path {path:?} contains '?'; remove query parameters and use a plain file path");
    }

    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
