// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::fs;
use tally_app::{Document, DocumentCommand, Session, Snapshot};
use tally_store::{BudgetFile, validate_budget_path};
use tally_testkit::{BudgetFaker, sample_snapshot, temp_budget_path};

#[test]
fn validate_budget_path_rejects_uri_forms() {
    assert!(validate_budget_path("").is_err());
    assert!(validate_budget_path("file:budget.json").is_err());
    assert!(validate_budget_path("https://example.com/budget.json").is_err());
    assert!(validate_budget_path("budget.json?mode=ro").is_err());
    assert!(validate_budget_path("/tmp/budget.json").is_ok());
    assert!(validate_budget_path("C:/budgets/home.json").is_ok());
}

#[test]
fn missing_file_loads_as_empty_budget() -> Result<()> {
    let (_dir, path) = temp_budget_path()?;
    let mut file = BudgetFile::open(&path)?;

    assert!(!file.existed());
    assert_eq!(file.load()?, Snapshot::default());
    assert!(!path.exists());
    Ok(())
}

#[test]
fn save_then_load_round_trips() -> Result<()> {
    let (_dir, path) = temp_budget_path()?;
    let snapshot = BudgetFaker::new(9).budget(7);

    let mut file = BudgetFile::open(&path)?;
    file.save(&snapshot)?;
    assert!(file.existed());

    let mut reopened = BudgetFile::open(&path)?;
    assert!(reopened.existed());
    assert_eq!(reopened.load()?, snapshot);
    Ok(())
}

#[test]
fn save_creates_missing_parent_directories() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("home.json");

    BudgetFile::open(&path)?.save(&sample_snapshot())?;
    let raw = fs::read_to_string(&path)?;
    assert!(raw.contains("\"usuallyDue\": \"1st\""), "{raw}");
    assert!(raw.contains("\"space\": true"), "{raw}");
    assert!(raw.ends_with('\n'));
    Ok(())
}

#[test]
fn legacy_expenses_key_matches_items_key() -> Result<()> {
    let (_dir, path) = temp_budget_path()?;
    fs::write(
        &path,
        r#"{"expenses":[{"name":"Rent","amount":900,"payPercent":1,"paidPercent":0,"usuallyDue":"1st"},{"space":true}],"balances":{"amount":1000,"toPay":900,"due":900}}"#,
    )?;
    let legacy = BudgetFile::open(&path)?.load()?;

    fs::write(
        &path,
        r#"{"items":[{"name":"Rent","amount":900,"payPercent":1,"paidPercent":0,"usuallyDue":"1st"},{"space":true}],"balances":{"amount":1000,"toPay":900,"due":900}}"#,
    )?;
    let current = BudgetFile::open(&path)?.load()?;

    assert_eq!(legacy, current);
    assert_eq!(
        Document::from_snapshot(&legacy).snapshot(),
        Document::from_snapshot(&current).snapshot()
    );
    Ok(())
}

#[test]
fn malformed_json_reports_the_path() -> Result<()> {
    let (_dir, path) = temp_budget_path()?;
    fs::write(&path, "{ not json")?;

    let error = BudgetFile::open(&path)?
        .load()
        .expect_err("malformed file should fail");
    let message = format!("{error:#}");
    assert!(message.contains("parse budget"), "{message}");
    assert!(message.contains("budget.json"), "{message}");
    Ok(())
}

#[test]
fn directory_path_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let error = BudgetFile::open(dir.path()).expect_err("directory should fail");
    assert!(error.to_string().contains("is a directory"));
    Ok(())
}

#[test]
fn session_edits_survive_save_and_reload() -> Result<()> {
    let (_dir, path) = temp_budget_path()?;
    let mut file = BudgetFile::open(&path)?;
    let mut session = Session::from_snapshot(&sample_snapshot());

    session.dispatch(DocumentCommand::InsertLineItem { at: Some(1) });
    session.dispatch(DocumentCommand::MoveItem { from: 0, to: 2 });
    file.save(&session.document().snapshot())?;
    session.dispatch(DocumentCommand::NoteSaved);
    assert!(session.is_clean());

    let reloaded = file.load()?;
    assert_eq!(reloaded, session.document().snapshot());
    Ok(())
}
