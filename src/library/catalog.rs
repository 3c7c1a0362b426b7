//! Read-only catalog of content nodes.
//!
//! The catalog is loaded once at startup and never mutated. Lookup indexes
//! (`id`, `series`, `tag`) are built at construction so navigation queries
//! don't rescan the node list.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::domain::{ContentNode, NodeId};

/// Errors raised while building a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Node {id} has episode number 0 (episodes are 1-based)")]
    InvalidEpisodeNumber { id: NodeId },

    #[error("Unsupported catalog version: {0}")]
    UnsupportedVersion(u32),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// On-disk catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Catalog format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Nodes in catalog order
    pub nodes: Vec<ContentNode>,
}

fn default_version() -> u32 {
    CATALOG_VERSION
}

/// Current catalog format version
pub const CATALOG_VERSION: u32 = 1;

/// Ordered, immutable collection of content nodes
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    nodes: Vec<ContentNode>,

    /// id -> position in `nodes`
    positions: HashMap<NodeId, usize>,

    /// series id -> positions, sorted by (episode, catalog order)
    series: HashMap<String, Vec<usize>>,

    /// tag -> positions in catalog order
    tags: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Build a catalog from nodes in catalog order
    pub fn new(nodes: Vec<ContentNode>) -> Result<Self, CatalogError> {
        let mut positions = HashMap::with_capacity(nodes.len());
        let mut series: HashMap<String, Vec<usize>> = HashMap::new();
        let mut tags: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, node) in nodes.iter().enumerate() {
            if node.episode_number == Some(0) {
                return Err(CatalogError::InvalidEpisodeNumber {
                    id: node.id.clone(),
                });
            }

            if positions.insert(node.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(node.id.clone()));
            }

            if let Some(series_id) = &node.series_id {
                series.entry(series_id.clone()).or_default().push(pos);
            }

            for tag in &node.tags {
                tags.entry(tag.clone()).or_default().push(pos);
            }
        }

        // Stable sort keeps catalog order for equal (or missing) episode numbers
        for members in series.values_mut() {
            members.sort_by_key(|&pos| nodes[pos].episode_order());
        }

        Ok(Self {
            nodes,
            positions,
            series,
            tags,
        })
    }

    /// Parse a catalog from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        if file.version != CATALOG_VERSION {
            return Err(CatalogError::UnsupportedVersion(file.version));
        }
        Self::new(file.nodes)
    }

    /// Load a catalog from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;

        let catalog = Self::from_json(&content)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;

        tracing::debug!(path = %path.display(), nodes = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Get a node by ID
    pub fn get(&self, id: &str) -> Option<&ContentNode> {
        self.positions.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Catalog position of a node
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// All nodes in catalog order
    pub fn nodes(&self) -> &[ContentNode] {
        &self.nodes
    }

    /// Members of a series, sorted ascending by episode number
    pub fn series(&self, series_id: &str) -> Vec<&ContentNode> {
        self.series
            .get(series_id)
            .map(|members| members.iter().map(|&pos| &self.nodes[pos]).collect())
            .unwrap_or_default()
    }

    /// Number of distinct series
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Nodes sharing at least one tag with `id`, in catalog order, excluding `id`
    pub fn related(&self, id: &str) -> Vec<&ContentNode> {
        let Some(&origin) = self.positions.get(id) else {
            return Vec::new();
        };

        let mut candidates: Vec<usize> = self.nodes[origin]
            .tags
            .iter()
            .filter_map(|tag| self.tags.get(tag))
            .flatten()
            .copied()
            .filter(|&pos| pos != origin)
            .collect();

        candidates.sort_unstable();
        candidates.dedup();
        candidates.into_iter().map(|pos| &self.nodes[pos]).collect()
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(nodes: &[&ContentNode]) -> Vec<String> {
        nodes.iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn test_catalog_get_and_position() {
        let catalog = Catalog::new(vec![
            ContentNode::new("a", "a.mp4"),
            ContentNode::new("b", "b.mp4"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("b").unwrap().resource_url, "b.mp4");
        assert_eq!(catalog.position("b"), Some(1));
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Catalog::new(vec![
            ContentNode::new("a", "a.mp4"),
            ContentNode::new("a", "a2.mp4"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(_))));
    }

    #[test]
    fn test_zero_episode_rejected() {
        let result = Catalog::new(vec![ContentNode::new("a", "a.mp4").with_episode("s", 0)]);
        assert!(matches!(
            result,
            Err(CatalogError::InvalidEpisodeNumber { .. })
        ));
    }

    #[test]
    fn test_series_sorted_by_episode_then_catalog_order() {
        let catalog = Catalog::new(vec![
            ContentNode::new("ep3", "3.mp4").with_episode("s", 3),
            ContentNode::new("unnumbered-1", "u1.mp4").with_series("s"),
            ContentNode::new("ep1", "1.mp4").with_episode("s", 1),
            ContentNode::new("unnumbered-2", "u2.mp4").with_series("s"),
            ContentNode::new("other", "o.mp4").with_episode("t", 1),
        ])
        .unwrap();

        assert_eq!(
            ids(&catalog.series("s")),
            vec!["unnumbered-1", "unnumbered-2", "ep1", "ep3"]
        );
        assert_eq!(catalog.series_count(), 2);
        assert!(catalog.series("nope").is_empty());
    }

    #[test]
    fn test_related_in_catalog_order_without_duplicates() {
        let catalog = Catalog::new(vec![
            ContentNode::new("x", "x.mp4").with_tags(["async", "tokio"]),
            ContentNode::new("origin", "o.mp4").with_tags(["tokio", "async"]),
            ContentNode::new("y", "y.mp4").with_tag("go"),
            ContentNode::new("z", "z.mp4").with_tag("tokio"),
        ])
        .unwrap();

        assert_eq!(ids(&catalog.related("origin")), vec!["x", "z"]);
        assert!(catalog.related("missing").is_empty());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "version": 1,
            "nodes": [
                {"id": "a", "seriesId": "s", "episodeNumber": 1, "resourceUrl": "a.mp4"},
                {"id": "b", "seriesId": "s", "episodeNumber": 2, "resourceUrl": "b.mp4"}
            ]
        }"#;

        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(ids(&catalog.series("s")), vec!["a", "b"]);
    }

    #[test]
    fn test_from_json_rejects_unknown_version() {
        let json = r#"{"version": 7, "nodes": []}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::UnsupportedVersion(7))
        ));
    }
}
