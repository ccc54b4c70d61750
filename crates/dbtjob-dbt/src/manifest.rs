//! dbt manifest.json parsing
//!
//! Only the fields needed to build tasks are read. Node order is kept exactly as
//! it appears in the file so that compiled task lists are stable between runs.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// dbt manifest.json structure (subset of fields we care about)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    /// Model, seed, snapshot and test nodes, in file order
    #[serde(default)]
    pub nodes: ManifestNodes,
}

impl Manifest {
    /// Load manifest from file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound(path.display().to_string())
            } else {
                ManifestError::IoError(path.display().to_string(), e.to_string())
            }
        })?;

        Self::from_str(&contents)
    }

    /// Parse manifest from JSON string
    pub fn from_str(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json)
            .map_err(|e| ManifestError::ParseError(e.to_string()))
    }

    /// Get a specific node by unique_id
    pub fn get_node(&self, unique_id: &str) -> Option<&ManifestNode> {
        self.nodes
            .iter()
            .find(|(id, _)| *id == unique_id)
            .map(|(_, node)| node)
    }
}

/// Order-preserving `unique_id -> node` map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestNodes(Vec<(String, ManifestNode)>);

impl ManifestNodes {
    /// Iterate nodes in the order they appear in the manifest
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestNode)> {
        self.0.iter().map(|(id, node)| (id.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ManifestNodes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodesVisitor;

        impl<'de> Visitor<'de> for NodesVisitor {
            type Value = ManifestNodes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of unique_id to manifest node")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut nodes = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((unique_id, node)) = map.next_entry::<String, ManifestNode>()? {
                    nodes.push((unique_id, node));
                }
                Ok(ManifestNodes(nodes))
            }
        }

        deserializer.deserialize_map(NodesVisitor)
    }
}

/// A node in the manifest (model, test, snapshot, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Node name (e.g., "users")
    pub name: String,

    /// Resource type (model, test, snapshot, etc.)
    pub resource_type: String,

    /// Dependencies
    #[serde(default)]
    pub depends_on: DependsOn,
}

/// Dependencies structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependsOn {
    /// List of node unique_ids this node depends on
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// Manifest parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest file not found: {0}")]
    NotFound(String),

    #[error("Failed to read manifest file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse manifest JSON: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_keep_file_order() {
        let manifest = Manifest::from_str(
            r#"{
                "nodes": {
                    "model.pkg.zeta": {"name": "zeta", "resource_type": "model"},
                    "seed.pkg.alpha": {"name": "alpha", "resource_type": "seed"},
                    "model.pkg.mid": {"name": "mid", "resource_type": "model"}
                }
            }"#,
        )
        .unwrap();

        let ids: Vec<&str> = manifest.nodes.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["model.pkg.zeta", "seed.pkg.alpha", "model.pkg.mid"]);
    }

    #[test]
    fn missing_depends_on_means_no_dependencies() {
        let manifest = Manifest::from_str(
            r#"{"nodes": {"seed.pkg.s1": {"name": "s1", "resource_type": "seed"}}}"#,
        )
        .unwrap();

        let node = manifest.get_node("seed.pkg.s1").unwrap();
        assert!(node.depends_on.nodes.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let manifest = Manifest::from_str(
            r#"{
                "metadata": {"dbt_version": "1.8.0"},
                "nodes": {
                    "model.pkg.m1": {
                        "name": "m1",
                        "resource_type": "model",
                        "config": {"materialized": "table"},
                        "depends_on": {"macros": [], "nodes": ["seed.pkg.s1"]}
                    }
                },
                "sources": {}
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.nodes.len(), 1);
        assert_eq!(
            manifest.get_node("model.pkg.m1").unwrap().depends_on.nodes,
            vec!["seed.pkg.s1".to_string()]
        );
    }

    #[test]
    fn manifest_without_nodes_is_empty() {
        let manifest = Manifest::from_str("{}").unwrap();
        assert!(manifest.nodes.is_empty());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = Manifest::from_str("{ not json").unwrap_err();
        assert!(matches!(err, ManifestError::ParseError(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Manifest::from_file(Path::new("no/such/manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn parse_fixture_manifest() {
        let manifest_path = Path::new("../../fixtures/manifest.json");

        if manifest_path.exists() {
            let manifest = Manifest::from_file(manifest_path).unwrap();

            let model = manifest.get_node("model.jaffle_shop.orders").unwrap();
            assert_eq!(model.name, "orders");
            assert_eq!(model.resource_type, "model");
            assert!(!model.depends_on.nodes.is_empty());
        }
    }
}
