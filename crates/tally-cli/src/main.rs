// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::{DemoRuntime, FileRuntime};
use std::env;
use std::path::PathBuf;
use tally_app::AppState;
use tally_store::BudgetFile;
use tally_tui::UiOptions;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tally --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init(config.log_file().as_deref(), config.log_level()?)?;

    let budget_path = match &options.budget_path {
        Some(path) => path.clone(),
        None => config.budget_path()?,
    };
    if options.print_budget_path {
        println!("{}", budget_path.display());
        return Ok(());
    }

    let ui = UiOptions {
        status_timeout: config.status_timeout()?,
        confirm_quit: config.confirm_quit(),
    };
    let mut state = AppState::default();

    if options.demo {
        if options.check_only {
            return Ok(());
        }
        log::info!("starting demo budget");
        return tally_tui::run_app(&mut state, &mut DemoRuntime::new(), ui);
    }

    let mut file = BudgetFile::open(&budget_path).with_context(|| {
        format!(
            "open budget {} -- if this path is wrong, pass --file or set [storage].budget_path or {}",
            budget_path.display(),
            tally_store::BUDGET_PATH_ENV
        )
    })?;
    if options.check_only {
        let snapshot = file.load()?;
        log::info!("check passed: {} item(s)", snapshot.items.len());
        return Ok(());
    }

    log::info!("editing {}", budget_path.display());
    tally_tui::run_app(&mut state, &mut FileRuntime::new(file), ui)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    budget_path: Option<PathBuf>,
    print_config_path: bool,
    print_budget_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        budget_path: None,
        print_config_path: false,
        print_budget_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--file" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--file requires a budget file path"))?;
                tally_store::validate_budget_path(value.as_ref())?;
                options.budget_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_budget_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("tally: household budget editor");
    println!("  --config <path>          Use a specific config path");
    println!("  --file <path>            Edit this budget file instead of the configured one");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved budget file path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with a seeded demo budget (in-memory, no saving)");
    println!("  --check                  Validate config and budget file, then exit");
    println!("  --help                   Show this help");
}
