//! Audacity Batch Cleaner CLI
//!
//! Opens every project in the input folder in Audacity, cleans it up
//! through the scripting pipe, and exports the result.
//!
//! Exit status: 0 when everything succeeded (or there was nothing to do),
//! 1 when the batch could not start, 2 when at least one project failed.

mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::Parser;

use abc_core::config::{ConfigManager, Settings};
use abc_core::editor::AudacityLauncher;
use abc_core::logging::{init_tracing, init_tracing_with_file, LogLevel};
use abc_core::orchestrator::{BatchError, BatchProcessor, BatchReport, ProjectStatus};

use cli::{Cli, Commands};

const EXIT_SUCCESS: u8 = 0;
const EXIT_FATAL: u8 = 1;
const EXIT_PROJECT_FAILED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command.clone().unwrap_or(Commands::Run) {
        Commands::Run => run(&cli),
        Commands::List => list(&cli).map(|_| ExitCode::SUCCESS),
        Commands::InitConfig { force } => init_config(&cli.config, force).map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Load the config file, creating it if needed, and apply CLI overrides.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    let settings = config.settings_mut();
    if let Some(input) = &cli.input {
        settings.paths.input_folder = input.to_string_lossy().to_string();
    }
    if let Some(output) = &cli.output {
        settings.paths.output_folder = output.to_string_lossy().to_string();
    }
    if let Some(editor) = &cli.editor {
        settings.editor.executable = editor.to_string_lossy().to_string();
    }

    config.validate()?;
    Ok(config.into_settings())
}

fn log_level(cli: &Cli, settings: &Settings) -> LogLevel {
    if cli.verbose {
        LogLevel::Debug
    } else {
        settings.logging.level
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let settings = load_settings(cli)?;

    let processor = BatchProcessor::new(settings.clone())
        .context("Failed to resolve the configured folders")?
        .with_console(Arc::new(|line: &str| println!("{}", line)));

    std::fs::create_dir_all(processor.logs_dir())
        .with_context(|| format!("Failed to create {}", processor.logs_dir().display()))?;
    let _guard = init_tracing_with_file(log_level(cli, &settings), processor.logs_dir());

    tracing::info!("Audacity Batch Cleaner v{}", abc_core::version());
    tracing::debug!("Config: {}", cli.config.display());

    let launcher = AudacityLauncher::new(settings.editor.clone());
    let result = processor.run(&launcher);
    match &result {
        Ok(report) => print_summary(report),
        Err(e @ BatchError::NoProjects { .. }) => println!("{}", e),
        Err(e) => tracing::error!("{}", e),
    }
    Ok(ExitCode::from(exit_status(&result)))
}

/// Process exit status for a finished (or refused) batch.
fn exit_status(result: &Result<BatchReport, BatchError>) -> u8 {
    match result {
        Ok(report) if report.has_failures() => EXIT_PROJECT_FAILED,
        Ok(_) => EXIT_SUCCESS,
        Err(BatchError::NoProjects { .. }) => EXIT_SUCCESS,
        Err(_) => EXIT_FATAL,
    }
}

fn list(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    init_tracing(log_level(cli, &settings));

    let processor = BatchProcessor::new(settings)?;
    let projects = match processor.discover() {
        Ok(projects) => projects,
        Err(e @ BatchError::NoProjects { .. }) => {
            println!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} project(s) in {}:",
        projects.len(),
        processor.input_dir().display()
    );
    for project in &projects {
        println!(
            "  {} -> {}",
            project.name,
            processor.output_path(project).display()
        );
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to replace it)",
            path.display()
        );
    }

    ConfigManager::new(path)
        .save()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!(
        "Done: {} project(s), {} succeeded, {} skipped, {} failed",
        report.total(),
        report.succeeded(),
        report.skipped(),
        report.failed()
    );

    for result in &report.results {
        match result.status {
            ProjectStatus::Succeeded => {
                if let Some(output) = &result.output_path {
                    println!("  ok      {} -> {}", result.project, output.display());
                }
            }
            ProjectStatus::Skipped => println!(
                "  skipped {}: {}",
                result.project,
                result.message.as_deref().unwrap_or("")
            ),
            ProjectStatus::Failed => println!(
                "  FAILED  {}: {}",
                result.project,
                result.message.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
