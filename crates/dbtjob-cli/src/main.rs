use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dbtjob_core::Config;
use dbtjob_dbt::{Manifest, TaskGraphBuilder};
use dbtjob_jobspec::{merge_tasks_into_job_spec, JobSpecDocument};

mod args;
mod settings;

use args::Cli;
use settings::RunSettings;

fn main() -> Result<()> {
    // .env is optional; DBTJOB_* variables feed clap's env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(&cli)?;
    let verbose = cli.verbose;
    let settings = RunSettings::resolve(cli, config)?;

    run(&settings, verbose)
}

/// Load config if specified, else ./dbtjob.toml when present, else defaults
fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        return Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()));
    }

    let default_path = Path::new("dbtjob.toml");
    if default_path.exists() {
        return Config::from_file(default_path).context("Failed to load dbtjob.toml");
    }

    if cli.verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

fn run(settings: &RunSettings, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading manifest from:".cyan(), settings.manifest_path.display());
    }

    let manifest = Manifest::from_file(&settings.manifest_path)
        .context("Failed to load manifest")?;

    let builder = TaskGraphBuilder::with_defaults(&settings.options, &settings.dbt_options, settings.run_tests);
    let tasks = builder.build(&manifest);

    if verbose {
        eprintln!(
            "{} {} tasks from {} nodes{}",
            "Compiled".cyan(),
            tasks.len(),
            manifest.nodes.len(),
            if settings.run_tests { "" } else { " (tests skipped)" }
        );
    }

    if settings.print {
        let mut document = JobSpecDocument::from_file(&settings.input_job_spec_path)
            .context("Failed to load job spec")?;
        document.replace_tasks(&tasks)?;
        if let Some(new_name) = &settings.new_job_name {
            document.rename_first_job(new_name)?;
        }
        print!("{}", document.to_yaml_string()?);
        return Ok(());
    }

    merge_tasks_into_job_spec(
        &settings.input_job_spec_path,
        &tasks,
        settings.target_job_spec_path.as_deref(),
        settings.new_job_name.as_deref(),
    )
    .context("Failed to update job spec")?;

    let written = settings
        .target_job_spec_path
        .as_deref()
        .unwrap_or(&settings.input_job_spec_path);
    eprintln!("{} {}", "Job spec saved to:".green(), written.display());

    Ok(())
}
