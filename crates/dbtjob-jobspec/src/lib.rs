//! Job-spec document handling
//!
//! Loads a YAML job specification, swaps the task list of its first job for a
//! freshly compiled one and writes the document back. Everything outside that
//! task list is carried through as-is, in its original key order.

pub mod document;

pub use document::{merge_tasks_into_job_spec, JobSpecDocument, JobSpecError};
