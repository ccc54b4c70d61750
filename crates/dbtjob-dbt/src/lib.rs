//! dbt manifest compilation
//!
//! This crate handles:
//! - Parsing manifest.json in the order nodes were written
//! - Filtering node dependencies by the upstream types each node may wait on
//! - Turning model, seed, snapshot and test nodes into job tasks
//! - Assembling the ordered task list for a whole manifest

pub mod manifest;
pub mod resolver;
pub mod factory;
pub mod builder;

pub use manifest::{Manifest, ManifestNode, ManifestNodes, DependsOn, ManifestError};
pub use resolver::resolve_dependencies;
pub use factory::TaskFactory;
pub use builder::TaskGraphBuilder;
