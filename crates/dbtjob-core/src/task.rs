//! Compiled task model and its job-spec wire form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// dbt resource types that can be compiled into tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// `dbt run`
    Model,

    /// `dbt seed`
    Seed,

    /// `dbt snapshot`
    Snapshot,

    /// `dbt test`
    Test,
}

impl ResourceType {
    /// All resource types, in registration order
    pub const ALL: [ResourceType; 4] = [Self::Model, Self::Seed, Self::Snapshot, Self::Test];

    /// The manifest spelling of this type (also the unique_id prefix)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Seed => "seed",
            Self::Snapshot => "snapshot",
            Self::Test => "test",
        }
    }

    /// Parse a manifest `resource_type` value. Unknown types yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "model" => Some(Self::Model),
            "seed" => Some(Self::Seed),
            "snapshot" => Some(Self::Snapshot),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    /// Type of a fully-qualified node name, read from the part before the first `.`
    ///
    /// Names without a `.` have no type prefix and yield `None`.
    pub fn of_node_name(node_name: &str) -> Option<Self> {
        let (prefix, _) = node_name.split_once('.')?;
        Self::parse(prefix)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a task inside a job, derived from a node's unique_id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKey(String);

impl TaskKey {
    /// Normalize a fully-qualified node name (`model.pkg.users` -> `model_pkg_users`)
    pub fn from_node_name(node_name: &str) -> Self {
        Self(node_name.replace('.', "_"))
    }

    /// Wrap an already-normalized key (e.g. a pinned dependency from the CLI)
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Where the job platform fetches the dbt project from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskSource {
    /// Project lives in the platform workspace
    Workspace,

    /// Project is checked out from the job's git source
    Git,
}

impl FromStr for TaskSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "workspace" => Ok(Self::Workspace),
            "git" => Ok(Self::Git),
            other => Err(format!("unknown task source '{}', expected WORKSPACE or GIT", other)),
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspace => f.write_str("WORKSPACE"),
            Self::Git => f.write_str("GIT"),
        }
    }
}

/// Options shared by every generated task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOptions {
    /// SQL warehouse the dbt commands run on
    pub warehouse_id: Option<String>,

    pub catalog: Option<String>,

    pub schema: Option<String>,

    /// Directory containing `profiles.yml`
    pub profiles_directory: Option<String>,

    /// Directory containing `dbt_project.yml`
    pub project_directory: Option<String>,

    pub source: Option<TaskSource>,

    /// Job environment the task runs in
    pub environment_key: String,

    /// Prefix every task with `dbt deps`
    pub enable_dbt_deps: bool,

    /// Task keys every task depends on in addition to its manifest edges
    pub dbt_tasks_deps: Vec<TaskKey>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            warehouse_id: None,
            catalog: None,
            schema: None,
            profiles_directory: None,
            project_directory: None,
            source: None,
            environment_key: "Default".to_string(),
            enable_dbt_deps: false,
            dbt_tasks_deps: Vec::new(),
        }
    }
}

/// A compiled task: one manifest node, one job task
///
/// Borrows the run's [`TaskOptions`]; every task of a run points at the same bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct Task<'a> {
    pub task_key: TaskKey,

    /// Shell-style dbt commands, run in order
    pub commands: Vec<String>,

    pub options: &'a TaskOptions,

    /// Upstream task keys, de-duplicated, in first-seen order
    pub depends_on: Vec<TaskKey>,
}

impl Task<'_> {
    /// Convert to the job-spec wire form
    pub fn to_spec(&self) -> TaskSpec {
        let options = self.options;
        TaskSpec {
            task_key: self.task_key.to_string(),
            dbt_task: DbtTaskSpec {
                commands: self.commands.clone(),
                project_directory: options.project_directory.clone(),
                profiles_directory: options.profiles_directory.clone(),
                catalog: options.catalog.clone(),
                schema: options.schema.clone(),
                warehouse_id: options.warehouse_id.clone(),
                source: options.source,
            },
            environment_key: options.environment_key.clone(),
            depends_on: self
                .depends_on
                .iter()
                .map(|key| TaskDependency { task_key: key.to_string() })
                .collect(),
        }
    }
}

/// Task as it appears under `resources.jobs.<job>.tasks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub task_key: String,
    pub dbt_task: DbtTaskSpec,
    pub environment_key: String,
    #[serde(default)]
    pub depends_on: Vec<TaskDependency>,
}

/// The `dbt_task` block of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbtTaskSpec {
    pub commands: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles_directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TaskSource>,
}

/// One entry of a task's `depends_on` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    pub task_key: String,
}
