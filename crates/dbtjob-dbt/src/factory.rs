//! Per-resource-type task construction
//!
//! A factory is plain data: the upstream types a node may wait on and the dbt
//! verb it runs. Every factory of a run shares one [`TaskOptions`] bundle and one
//! string of extra command flags (e.g. `--target dev`).

use dbtjob_core::{ResourceType, Task, TaskKey, TaskOptions};
use crate::manifest::ManifestNode;
use crate::resolver::resolve_dependencies;

const MODEL_UPSTREAM: &[ResourceType] = &[
    ResourceType::Model,
    ResourceType::Seed,
    ResourceType::Snapshot,
    ResourceType::Test,
];
const MODELS_ONLY: &[ResourceType] = &[ResourceType::Model];
const NO_UPSTREAM: &[ResourceType] = &[];

/// Builds tasks for one resource type
#[derive(Debug, Clone)]
pub struct TaskFactory<'a> {
    resource_type: ResourceType,
    allowed_upstream: &'static [ResourceType],
    verb: &'static str,
    options: &'a TaskOptions,
    dbt_options: String,
}

impl<'a> TaskFactory<'a> {
    /// Factory for `resource_type` with its fixed allow-list and verb
    pub fn new(resource_type: ResourceType, options: &'a TaskOptions, dbt_options: impl Into<String>) -> Self {
        let (allowed_upstream, verb) = match resource_type {
            ResourceType::Model => (MODEL_UPSTREAM, "run"),
            ResourceType::Snapshot => (MODELS_ONLY, "snapshot"),
            // seeds load static files and never wait on other nodes
            ResourceType::Seed => (NO_UPSTREAM, "seed"),
            ResourceType::Test => (MODELS_ONLY, "test"),
        };

        Self {
            resource_type,
            allowed_upstream,
            verb,
            options,
            dbt_options: dbt_options.into(),
        }
    }

    pub fn model(options: &'a TaskOptions, dbt_options: impl Into<String>) -> Self {
        Self::new(ResourceType::Model, options, dbt_options)
    }

    pub fn seed(options: &'a TaskOptions, dbt_options: impl Into<String>) -> Self {
        Self::new(ResourceType::Seed, options, dbt_options)
    }

    pub fn snapshot(options: &'a TaskOptions, dbt_options: impl Into<String>) -> Self {
        Self::new(ResourceType::Snapshot, options, dbt_options)
    }

    pub fn test(options: &'a TaskOptions, dbt_options: impl Into<String>) -> Self {
        Self::new(ResourceType::Test, options, dbt_options)
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Upstream resource types this factory's tasks may depend on
    pub fn allowed_upstream(&self) -> &'static [ResourceType] {
        self.allowed_upstream
    }

    /// Turn one manifest node into a task
    ///
    /// `node_name` is the unqualified dbt name used for `--select`.
    pub fn create_task(&self, node_name: &str, task_key: TaskKey, node: &ManifestNode) -> Task<'a> {
        let mut commands = Vec::with_capacity(2);
        if self.options.enable_dbt_deps {
            commands.push(self.command("deps"));
        }
        commands.push(self.command(&format!("{} --select {}", self.verb, node_name)));

        let resolved = resolve_dependencies(node, self.allowed_upstream);
        let mut depends_on: Vec<TaskKey> = Vec::with_capacity(resolved.len() + self.options.dbt_tasks_deps.len());
        for key in resolved.into_iter().chain(self.options.dbt_tasks_deps.iter().cloned()) {
            if key != task_key && !depends_on.contains(&key) {
                depends_on.push(key);
            }
        }

        Task {
            task_key,
            commands,
            options: self.options,
            depends_on,
        }
    }

    fn command(&self, args: &str) -> String {
        if self.dbt_options.is_empty() {
            format!("dbt {}", args)
        } else {
            format!("dbt {} {}", args, self.dbt_options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DependsOn;
    use pretty_assertions::assert_eq;

    fn node(name: &str, resource_type: &str, deps: &[&str]) -> ManifestNode {
        ManifestNode {
            name: name.to_string(),
            resource_type: resource_type.to_string(),
            depends_on: DependsOn {
                nodes: deps.iter().map(|d| d.to_string()).collect(),
            },
        }
    }

    fn keys(names: &[&str]) -> Vec<TaskKey> {
        names.iter().map(|n| TaskKey::new(*n)).collect()
    }

    const ALL_DEPS: &[&str] = &["model.pkg.m0", "seed.pkg.s1", "snapshot.pkg.snap", "test.pkg.t1", "source.pkg.raw"];

    #[test]
    fn model_task_commands_and_dependencies() {
        let options = TaskOptions::default();
        let factory = TaskFactory::model(&options, "--target dev");

        let task = factory.create_task("m1", TaskKey::new("model_pkg_m1"), &node("m1", "model", ALL_DEPS));

        assert_eq!(task.commands, vec!["dbt run --select m1 --target dev".to_string()]);
        assert_eq!(
            task.depends_on,
            keys(&["model_pkg_m0", "seed_pkg_s1", "snapshot_pkg_snap", "test_pkg_t1"])
        );
    }

    #[test]
    fn snapshot_and_test_only_wait_on_models() {
        let options = TaskOptions::default();

        let snapshot = TaskFactory::snapshot(&options, "--target dev")
            .create_task("snap", TaskKey::new("snapshot_pkg_snap"), &node("snap", "snapshot", ALL_DEPS));
        assert_eq!(snapshot.commands, vec!["dbt snapshot --select snap --target dev".to_string()]);
        assert_eq!(snapshot.depends_on, keys(&["model_pkg_m0"]));

        let test = TaskFactory::test(&options, "--target dev")
            .create_task("t2", TaskKey::new("test_pkg_t2"), &node("t2", "test", ALL_DEPS));
        assert_eq!(test.commands, vec!["dbt test --select t2 --target dev".to_string()]);
        assert_eq!(test.depends_on, keys(&["model_pkg_m0"]));
    }

    #[test]
    fn seed_has_no_dependencies() {
        let options = TaskOptions::default();
        let task = TaskFactory::seed(&options, "--target dev")
            .create_task("s2", TaskKey::new("seed_pkg_s2"), &node("s2", "seed", ALL_DEPS));

        assert_eq!(task.commands, vec!["dbt seed --select s2 --target dev".to_string()]);
        assert!(task.depends_on.is_empty());
    }

    #[test]
    fn dbt_deps_runs_first_when_enabled() {
        let options = TaskOptions {
            enable_dbt_deps: true,
            ..TaskOptions::default()
        };
        let task = TaskFactory::model(&options, "--target dev --upgrade")
            .create_task("m1", TaskKey::new("model_pkg_m1"), &node("m1", "model", &[]));

        assert_eq!(
            task.commands,
            vec![
                "dbt deps --target dev --upgrade".to_string(),
                "dbt run --select m1 --target dev --upgrade".to_string(),
            ]
        );
    }

    #[test]
    fn empty_flags_leave_no_trailing_space() {
        let options = TaskOptions::default();
        let task = TaskFactory::seed(&options, "")
            .create_task("s1", TaskKey::new("seed_pkg_s1"), &node("s1", "seed", &[]));

        assert_eq!(task.commands, vec!["dbt seed --select s1".to_string()]);
    }

    #[test]
    fn pinned_dependencies_are_appended_and_deduplicated() {
        let options = TaskOptions {
            dbt_tasks_deps: keys(&["install_deps", "model_pkg_m0"]),
            ..TaskOptions::default()
        };
        let factory = TaskFactory::model(&options, "--target dev");

        let task = factory.create_task(
            "m1",
            TaskKey::new("model_pkg_m1"),
            &node("m1", "model", &["model.pkg.m0", "seed.pkg.s1", "model.pkg.m0"]),
        );
        assert_eq!(task.depends_on, keys(&["model_pkg_m0", "seed_pkg_s1", "install_deps"]));

        let seed = TaskFactory::seed(&options, "--target dev")
            .create_task("s1", TaskKey::new("seed_pkg_s1"), &node("s1", "seed", &[]));
        assert_eq!(seed.depends_on, keys(&["install_deps", "model_pkg_m0"]));
    }

    #[test]
    fn pinned_dependency_skips_the_task_itself() {
        let options = TaskOptions {
            dbt_tasks_deps: keys(&["seed_pkg_s1"]),
            ..TaskOptions::default()
        };
        let task = TaskFactory::seed(&options, "")
            .create_task("s1", TaskKey::new("seed_pkg_s1"), &node("s1", "seed", &[]));

        assert!(task.depends_on.is_empty());
    }

    #[test]
    fn task_shares_the_factory_options() {
        let options = TaskOptions::default();
        let task = TaskFactory::model(&options, "")
            .create_task("m1", TaskKey::new("model_pkg_m1"), &node("m1", "model", &[]));

        assert!(std::ptr::eq(task.options, &options));
    }
}
