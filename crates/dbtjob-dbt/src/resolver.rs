//! Dependency filtering by upstream resource type

use dbtjob_core::{ResourceType, TaskKey};
use crate::manifest::ManifestNode;

/// Keep the node's dependencies whose type prefix is in `allowed`, as task keys
///
/// Input order is kept and duplicates are passed through. Names without a known
/// type prefix (sources, macros, malformed ids) never match and are dropped.
pub fn resolve_dependencies(node: &ManifestNode, allowed: &[ResourceType]) -> Vec<TaskKey> {
    node.depends_on
        .nodes
        .iter()
        .filter(|dep| {
            ResourceType::of_node_name(dep)
                .map(|dep_type| allowed.contains(&dep_type))
                .unwrap_or(false)
        })
        .map(|dep| TaskKey::from_node_name(dep))
        .collect()
}
