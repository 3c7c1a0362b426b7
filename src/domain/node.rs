//! Content nodes: the units of playable content in a feed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Opaque node identifier, unique across a catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A unit of playable content.
///
/// Nodes are immutable for the lifetime of a session. Vertical neighbors come
/// from `series_id`/`episode_number`, horizontal neighbors from
/// `alternate_versions` or, failing that, from `tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Unique node identifier
    pub id: NodeId,

    /// Series this node is an episode of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,

    /// Position within the series (1-based; only meaningful with `series_id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,

    /// Ordered ring of alternate renderings (node ids)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_versions: Vec<NodeId>,

    /// Topic labels, used only when there are no alternates
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    /// Primary media resource to preload and play
    pub resource_url: String,
}

impl ContentNode {
    /// Create a standalone node with no series, alternates, or tags
    pub fn new(id: impl Into<NodeId>, resource_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            series_id: None,
            episode_number: None,
            alternate_versions: Vec::new(),
            tags: BTreeSet::new(),
            resource_url: resource_url.into(),
        }
    }

    /// Place the node in a series at the given episode number
    pub fn with_episode(mut self, series_id: impl Into<String>, episode_number: u32) -> Self {
        self.series_id = Some(series_id.into());
        self.episode_number = Some(episode_number);
        self
    }

    /// Place the node in a series without an episode number
    pub fn with_series(mut self, series_id: impl Into<String>) -> Self {
        self.series_id = Some(series_id.into());
        self
    }

    /// Set the alternate ring
    pub fn with_alternates(mut self, ids: impl IntoIterator<Item = impl Into<NodeId>>) -> Self {
        self.alternate_versions = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Episode number used for ordering; missing numbers sort as 0
    pub fn episode_order(&self) -> u32 {
        self.episode_number.unwrap_or(0)
    }

    /// Whether the node shares at least one tag with `other`
    pub fn shares_tag_with(&self, other: &ContentNode) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }
}
