//! Effective run settings: defaults < dbtjob.toml < environment < flags

use anyhow::{bail, Result};
use dbtjob_core::{Config, TaskKey, TaskOptions};
use std::path::PathBuf;
use crate::args::Cli;

/// Everything one run needs, after layering
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub manifest_path: PathBuf,
    pub input_job_spec_path: PathBuf,
    pub target_job_spec_path: Option<PathBuf>,
    pub new_job_name: Option<String>,

    /// Flags appended to every dbt command
    pub dbt_options: String,

    pub run_tests: bool,
    pub options: TaskOptions,
    pub print: bool,
}

impl RunSettings {
    /// Layer command-line values over the config file
    pub fn resolve(cli: Cli, config: Config) -> Result<Self> {
        let Some(target) = cli.target.or(config.target) else {
            bail!("No dbt target given. Pass --target or set `target` in dbtjob.toml");
        };

        let extra = cli
            .extra_dbt_command_options
            .or(config.extra_dbt_command_options)
            .map(|extra| extra.trim().to_string())
            .filter(|extra| !extra.is_empty());
        let dbt_options = match extra {
            Some(extra) => format!("--target {} {}", target, extra),
            None => format!("--target {}", target),
        };

        let mut options = config.task;
        overlay(&mut options.warehouse_id, cli.warehouse_id);
        overlay(&mut options.catalog, cli.catalog);
        overlay(&mut options.schema, cli.schema);
        overlay(&mut options.profiles_directory, cli.profiles_directory);
        overlay(&mut options.project_directory, cli.project_directory);
        if cli.source.is_some() {
            options.source = cli.source;
        }
        if let Some(environment_key) = cli.environment_key {
            options.environment_key = environment_key;
        }
        if let Some(enable) = cli.enable_dbt_deps {
            options.enable_dbt_deps = enable;
        }
        let pinned: Vec<TaskKey> = cli
            .dbt_tasks_deps
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(TaskKey::from)
            .collect();
        if !pinned.is_empty() {
            options.dbt_tasks_deps = pinned;
        }

        Ok(Self {
            manifest_path: cli.dbt_manifest_path,
            input_job_spec_path: cli.input_job_spec_path,
            target_job_spec_path: cli.target_job_spec_path,
            new_job_name: cli.new_job_name,
            dbt_options,
            run_tests: cli.run_tests.unwrap_or(config.run_tests),
            options,
            print: cli.print,
        })
    }
}

fn overlay(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}
