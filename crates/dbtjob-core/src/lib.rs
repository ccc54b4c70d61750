//! dbtjob Core
//!
//! Domain types shared by the manifest compiler and the job-spec merger.
//! The wire shape produced by [`TaskSpec`] is what ends up in job documents,
//! so field names there must track the job platform's schema.

pub mod task;
pub mod config;

pub use task::{ResourceType, Task, TaskKey, TaskOptions, TaskSource, TaskSpec, DbtTaskSpec, TaskDependency};
pub use config::{Config, ConfigError};
