//! Task list assembly
//!
//! Walks the manifest in file order and hands each node to the factory
//! registered for its resource type. Nodes whose type has no factory are
//! skipped; leaving out the test factory is how test tasks are turned off.

use std::collections::{HashMap, HashSet};
use dbtjob_core::{ResourceType, Task, TaskKey, TaskOptions};
use crate::factory::TaskFactory;
use crate::manifest::Manifest;

/// Resource type -> factory lookup table
#[derive(Debug, Clone, Default)]
pub struct TaskGraphBuilder<'a> {
    factories: HashMap<ResourceType, TaskFactory<'a>>,
}

impl<'a> TaskGraphBuilder<'a> {
    /// Builder with no factories registered
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Builder with model, seed and snapshot factories, plus test when `run_tests`
    pub fn with_defaults(options: &'a TaskOptions, dbt_options: &str, run_tests: bool) -> Self {
        ResourceType::ALL
            .into_iter()
            .filter(|resource_type| run_tests || *resource_type != ResourceType::Test)
            .fold(Self::new(), |builder, resource_type| {
                builder.with_factory(TaskFactory::new(resource_type, options, dbt_options))
            })
    }

    /// Register a factory, replacing any previous one for the same type
    pub fn register(&mut self, factory: TaskFactory<'a>) {
        self.factories.insert(factory.resource_type(), factory);
    }

    pub fn with_factory(mut self, factory: TaskFactory<'a>) -> Self {
        self.register(factory);
        self
    }

    /// Whether tasks will be generated for `resource_type`
    pub fn handles(&self, resource_type: ResourceType) -> bool {
        self.factories.contains_key(&resource_type)
    }

    /// Compile every supported node of the manifest into a task, in manifest order
    pub fn build(&self, manifest: &Manifest) -> Vec<Task<'a>> {
        let mut tasks = Vec::new();
        let mut seen_keys = HashSet::new();

        for (unique_id, node) in manifest.nodes.iter() {
            let factory = ResourceType::parse(&node.resource_type)
                .and_then(|resource_type| self.factories.get(&resource_type));

            let Some(factory) = factory else {
                tracing::debug!(node = unique_id, resource_type = %node.resource_type, "skipping node");
                continue;
            };

            let task_key = TaskKey::from_node_name(unique_id);
            if !seen_keys.insert(task_key.clone()) {
                tracing::warn!(node = unique_id, task_key = %task_key, "task key already emitted by another node");
            }

            let task = factory.create_task(&node.name, task_key, node);
            tracing::debug!(
                task_key = %task.task_key,
                depends_on = task.depends_on.len(),
                "built task"
            );
            tasks.push(task);
        }

        tracing::info!(nodes = manifest.nodes.len(), tasks = tasks.len(), "compiled manifest");
        tasks
    }
}
