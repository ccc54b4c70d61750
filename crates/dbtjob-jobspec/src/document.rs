//! YAML job-spec documents (`resources.jobs.<job>.tasks`)

use dbtjob_core::{Task, TaskSpec};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// A parsed job-spec document
///
/// The document is kept as a generic YAML tree so that fields this tool does
/// not know about survive a rewrite. Mappings keep their declaration order,
/// which is what makes "the first job" well defined.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpecDocument {
    root: Value,

    /// Where the document came from, for error messages
    origin: String,
}

impl JobSpecDocument {
    /// Load document from file
    pub fn from_file(path: &Path) -> Result<Self, JobSpecError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JobSpecError::NotFound(path.display().to_string())
            } else {
                JobSpecError::IoError(path.display().to_string(), e.to_string())
            }
        })?;

        Self::parse(&contents, path.display().to_string())
    }

    /// Parse document from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, JobSpecError> {
        Self::parse(yaml, "<string>".to_string())
    }

    fn parse(yaml: &str, origin: String) -> Result<Self, JobSpecError> {
        let root = serde_yaml::from_str(yaml)
            .map_err(|e| JobSpecError::ParseError(origin.clone(), e.to_string()))?;

        Ok(Self { root, origin })
    }

    /// The whole document tree
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Name of the first job under `resources.jobs`
    pub fn first_job_name(&self) -> Result<String, JobSpecError> {
        let jobs = self
            .root
            .get("resources")
            .and_then(|resources| resources.get("jobs"))
            .and_then(Value::as_mapping)
            .filter(|jobs| !jobs.is_empty())
            .ok_or_else(|| JobSpecError::NoJobsFound(self.origin.clone()))?;

        jobs.iter()
            .next()
            .map(|(name, _)| job_name(name))
            .ok_or_else(|| JobSpecError::NoJobsFound(self.origin.clone()))
    }

    /// Replace the `tasks` of the first job with `tasks`; returns that job's name
    ///
    /// Sibling fields of the job and all other jobs are left alone. A job without
    /// a `tasks` field gets one appended.
    pub fn replace_tasks(&mut self, tasks: &[Task<'_>]) -> Result<String, JobSpecError> {
        let specs: Vec<TaskSpec> = tasks.iter().map(Task::to_spec).collect();
        let tasks_value = serde_yaml::to_value(&specs)
            .map_err(|e| JobSpecError::SerializeError(e.to_string()))?;

        let origin = self.origin.clone();
        let (name, job) = self.first_job_mut()?;
        let job = job
            .as_mapping_mut()
            .ok_or_else(|| JobSpecError::InvalidJob(origin, name.clone()))?;

        job.insert(Value::String("tasks".to_string()), tasks_value);
        tracing::debug!(job = %name, tasks = specs.len(), "replaced job tasks");

        Ok(name)
    }

    /// Rename the first job: both its key in `resources.jobs` and its `name` field
    ///
    /// The job keeps its position in the jobs map.
    pub fn rename_first_job(&mut self, new_name: &str) -> Result<(), JobSpecError> {
        let current = self.first_job_name()?;
        let origin = self.origin.clone();
        let jobs = self.jobs_mut()?;

        if current != new_name && jobs.contains_key(new_name) {
            return Err(JobSpecError::DuplicateJob(origin, new_name.to_string()));
        }

        let renamed: Mapping = std::mem::take(jobs)
            .into_iter()
            .enumerate()
            .map(|(index, (key, value))| {
                if index == 0 {
                    (Value::String(new_name.to_string()), value)
                } else {
                    (key, value)
                }
            })
            .collect();
        *jobs = renamed;

        let (_, job) = self.first_job_mut()?;
        let job = job
            .as_mapping_mut()
            .ok_or_else(|| JobSpecError::InvalidJob(origin, new_name.to_string()))?;
        job.insert(Value::String("name".to_string()), Value::String(new_name.to_string()));

        tracing::debug!(from = %current, to = new_name, "renamed job");
        Ok(())
    }

    /// Serialize the document back to YAML
    pub fn to_yaml_string(&self) -> Result<String, JobSpecError> {
        serde_yaml::to_string(&self.root)
            .map_err(|e| JobSpecError::SerializeError(e.to_string()))
    }

    /// Write the document to `path`, replacing any existing file
    pub fn save_to_file(&self, path: &Path) -> Result<(), JobSpecError> {
        let yaml = self.to_yaml_string()?;

        std::fs::write(path, yaml)
            .map_err(|e| JobSpecError::WriteError(path.display().to_string(), e.to_string()))
    }

    fn jobs_mut(&mut self) -> Result<&mut Mapping, JobSpecError> {
        let origin = &self.origin;
        self.root
            .get_mut("resources")
            .and_then(|resources| resources.get_mut("jobs"))
            .and_then(Value::as_mapping_mut)
            .filter(|jobs| !jobs.is_empty())
            .ok_or_else(|| JobSpecError::NoJobsFound(origin.clone()))
    }

    fn first_job_mut(&mut self) -> Result<(String, &mut Value), JobSpecError> {
        let origin = self.origin.clone();
        self.jobs_mut()?
            .iter_mut()
            .next()
            .map(|(name, job)| (job_name(name), job))
            .ok_or(JobSpecError::NoJobsFound(origin))
    }
}

fn job_name(key: &Value) -> String {
    match key {
        Value::String(name) => name.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Replace the first job's tasks in the document at `document_path`
///
/// The result goes to `output_path`, or back to `document_path` when none is
/// given. Nothing is written if loading or merging fails.
pub fn merge_tasks_into_job_spec(
    document_path: &Path,
    tasks: &[Task<'_>],
    output_path: Option<&Path>,
    new_job_name: Option<&str>,
) -> Result<(), JobSpecError> {
    let mut document = JobSpecDocument::from_file(document_path)?;

    let job = document.replace_tasks(tasks)?;
    if let Some(new_name) = new_job_name {
        document.rename_first_job(new_name)?;
    }

    let target = output_path.unwrap_or(document_path);
    document.save_to_file(target)?;

    tracing::info!(job = %new_job_name.unwrap_or(&job), tasks = tasks.len(), path = %target.display(), "wrote job spec");
    Ok(())
}

/// Job-spec errors
#[derive(Debug, thiserror::Error)]
pub enum JobSpecError {
    #[error("Job spec file not found: {0}")]
    NotFound(String),

    #[error("Failed to read job spec file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse job spec YAML {0}: {1}")]
    ParseError(String, String),

    #[error("No jobs found under resources.jobs in {0}")]
    NoJobsFound(String),

    #[error("Job '{1}' in {0} is not a mapping")]
    InvalidJob(String, String),

    #[error("Job '{1}' already exists in {0}")]
    DuplicateJob(String, String),

    #[error("Failed to serialize job spec: {0}")]
    SerializeError(String),

    #[error("Failed to write job spec file {0}: {1}")]
    WriteError(String, String),
}
