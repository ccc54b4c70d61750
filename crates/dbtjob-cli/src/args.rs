//! Command-line arguments

use clap::builder::BoolishValueParser;
use clap::Parser;
use dbtjob_core::TaskSource;
use std::path::PathBuf;

/// dbtjob - Compile a dbt manifest into job tasks
#[derive(Debug, Parser)]
#[command(name = "dbtjob")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to dbt manifest.json
    #[arg(long, env = "DBTJOB_MANIFEST_PATH")]
    pub dbt_manifest_path: PathBuf,

    /// Job spec YAML whose first job receives the tasks
    #[arg(long)]
    pub input_job_spec_path: PathBuf,

    /// Where to write the updated job spec (default: overwrite the input)
    #[arg(long)]
    pub target_job_spec_path: Option<PathBuf>,

    /// dbt target passed to every command
    #[arg(long, env = "DBTJOB_TARGET")]
    pub target: Option<String>,

    /// Rename the job being updated
    #[arg(long)]
    pub new_job_name: Option<String>,

    /// Job environment key for every task
    #[arg(long, env = "DBTJOB_ENVIRONMENT_KEY")]
    pub environment_key: Option<String>,

    /// Project source (WORKSPACE or GIT)
    #[arg(long)]
    pub source: Option<TaskSource>,

    /// SQL warehouse id
    #[arg(long, alias = "warehouse_id", env = "DBTJOB_WAREHOUSE_ID")]
    pub warehouse_id: Option<String>,

    #[arg(long, env = "DBTJOB_CATALOG")]
    pub catalog: Option<String>,

    #[arg(long, env = "DBTJOB_SCHEMA")]
    pub schema: Option<String>,

    /// Directory containing profiles.yml
    #[arg(long)]
    pub profiles_directory: Option<String>,

    /// Directory containing dbt_project.yml
    #[arg(long)]
    pub project_directory: Option<String>,

    /// Extra flags appended to every dbt command
    #[arg(long, allow_hyphen_values = true)]
    pub extra_dbt_command_options: Option<String>,

    /// Generate tasks for dbt tests
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub run_tests: Option<bool>,

    /// Run `dbt deps` before each command
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub enable_dbt_deps: Option<bool>,

    /// Comma-separated task keys every task depends on
    #[arg(long, value_delimiter = ',')]
    pub dbt_tasks_deps: Vec<String>,

    /// Path to config file (default: dbtjob.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the updated job spec to stdout instead of writing it
    #[arg(long)]
    pub print: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
