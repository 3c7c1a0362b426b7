//! Navigation graph resolution.
//!
//! No adjacency is stored anywhere: the four neighbors of a node are derived
//! on demand from the catalog.
//!
//! - Up/Down: next/previous member of the node's series (episode order)
//! - Left/Right: the node's alternate ring, or failing that the first two
//!   tag-sharing nodes in catalog order
//!
//! An unknown node id resolves to an empty result. Resolution is
//! deterministic for an unchanged catalog.

use std::collections::{HashSet, VecDeque};

use crate::domain::{ContentNode, Direction, NeighborReason};
use crate::library::Catalog;

/// A resolved neighbor and why it was chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub node: &'a ContentNode,
    pub reason: NeighborReason,
}

impl<'a> Neighbor<'a> {
    fn new(node: &'a ContentNode, reason: NeighborReason) -> Self {
        Self { node, reason }
    }
}

/// Neighbors of a node in all four directions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavigationResult<'a> {
    pub up: Option<Neighbor<'a>>,
    pub down: Option<Neighbor<'a>>,
    pub left: Option<Neighbor<'a>>,
    pub right: Option<Neighbor<'a>>,
}

impl<'a> NavigationResult<'a> {
    /// Neighbor in a given direction
    pub fn get(&self, direction: Direction) -> Option<Neighbor<'a>> {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// All four directions in resolution order, resolved or not
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Option<Neighbor<'a>>)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// True when no direction has a neighbor
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, n)| n.is_none())
    }
}

/// Resolve the neighbors of `node_id`
pub fn resolve<'a>(catalog: &'a Catalog, node_id: &str) -> NavigationResult<'a> {
    let Some(node) = catalog.get(node_id) else {
        tracing::debug!(node_id, "Node not in catalog, no neighbors");
        return NavigationResult::default();
    };

    let mut result = NavigationResult::default();
    resolve_vertical(catalog, node, &mut result);

    if !node.alternate_versions.is_empty() {
        resolve_alternates(catalog, node, &mut result);
    } else if !node.tags.is_empty() {
        resolve_related(catalog, node, &mut result);
    }

    result
}

/// Resolve a single direction
pub fn neighbor<'a>(catalog: &'a Catalog, node_id: &str, direction: Direction) -> Option<Neighbor<'a>> {
    resolve(catalog, node_id).get(direction)
}

/// Nodes reachable from `node_id` within `depth` hops, nearest first.
///
/// The origin is excluded and each node appears once. Within a hop, nodes are
/// ordered by direction (Up, Down, Left, Right).
pub fn preload_targets<'a>(catalog: &'a Catalog, node_id: &str, depth: usize) -> Vec<&'a ContentNode> {
    let Some(origin) = catalog.get(node_id) else {
        return Vec::new();
    };

    let mut seen: HashSet<&str> = HashSet::from([origin.id.as_str()]);
    let mut targets = Vec::new();
    let mut frontier = VecDeque::from([(origin, 0usize)]);

    while let Some((node, hops)) = frontier.pop_front() {
        if hops == depth {
            continue;
        }

        for (_, found) in resolve(catalog, node.id.as_str()).iter() {
            if let Some(next) = found {
                if seen.insert(next.node.id.as_str()) {
                    targets.push(next.node);
                    frontier.push_back((next.node, hops + 1));
                }
            }
        }
    }

    targets
}

fn resolve_vertical<'a>(catalog: &'a Catalog, node: &ContentNode, result: &mut NavigationResult<'a>) {
    let Some(series_id) = node.series_id.as_deref() else {
        return;
    };

    let episodes = catalog.series(series_id);
    if episodes.len() <= 1 {
        return;
    }

    let Some(i) = episodes.iter().position(|n| n.id == node.id) else {
        return;
    };

    result.up = episodes
        .get(i + 1)
        .copied()
        .map(|n| Neighbor::new(n, NeighborReason::NextEpisode));
    result.down = i
        .checked_sub(1)
        .and_then(|k| episodes.get(k))
        .copied()
        .map(|n| Neighbor::new(n, NeighborReason::PreviousEpisode));
}

fn resolve_alternates<'a>(catalog: &'a Catalog, node: &ContentNode, result: &mut NavigationResult<'a>) {
    let ring = &node.alternate_versions;

    // A node missing from its own ring sits just before the ring's first entry
    let (left, right) = match ring.iter().position(|id| *id == node.id) {
        Some(j) => (ring.get(j + 1), j.checked_sub(1).and_then(|k| ring.get(k))),
        None => (ring.first(), None),
    };

    result.left = left
        .and_then(|id| catalog.get(id.as_str()))
        .map(|n| Neighbor::new(n, NeighborReason::Alternate));
    result.right = right
        .and_then(|id| catalog.get(id.as_str()))
        .map(|n| Neighbor::new(n, NeighborReason::Alternate));
}

fn resolve_related<'a>(catalog: &'a Catalog, node: &ContentNode, result: &mut NavigationResult<'a>) {
    // First matches in catalog order; no relevance scoring
    let mut candidates = catalog.related(node.id.as_str()).into_iter();

    result.left = candidates
        .next()
        .map(|n| Neighbor::new(n, NeighborReason::Related));
    result.right = candidates
        .next()
        .map(|n| Neighbor::new(n, NeighborReason::Related));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(neighbor: Option<Neighbor<'_>>) -> Option<&str> {
        neighbor.map(|n| n.node.id.as_str())
    }

    #[test]
    fn test_unknown_node_is_empty() {
        let catalog = Catalog::new(vec![ContentNode::new("a", "a.mp4")]).unwrap();
        assert!(resolve(&catalog, "missing").is_empty());
    }

    #[test]
    fn test_isolated_node_is_empty() {
        let catalog = Catalog::new(vec![ContentNode::new("a", "a.mp4").with_episode("s", 1)]).unwrap();
        assert!(resolve(&catalog, "a").is_empty());
    }

    #[test]
    fn test_alternate_ring_positions() {
        let ring = ["v1", "v2", "v3"];
        let catalog = Catalog::new(vec![
            ContentNode::new("v1", "1.mp4").with_alternates(ring),
            ContentNode::new("v2", "2.mp4").with_alternates(ring),
            ContentNode::new("v3", "3.mp4").with_alternates(ring),
        ])
        .unwrap();

        let middle = resolve(&catalog, "v2");
        assert_eq!(id_of(middle.left), Some("v3"));
        assert_eq!(id_of(middle.right), Some("v1"));
        assert_eq!(middle.left.unwrap().reason, NeighborReason::Alternate);

        // No wraparound at either end
        let first = resolve(&catalog, "v1");
        assert_eq!(id_of(first.left), Some("v2"));
        assert!(first.right.is_none());

        let last = resolve(&catalog, "v3");
        assert!(last.left.is_none());
        assert_eq!(id_of(last.right), Some("v2"));
    }

    #[test]
    fn test_node_missing_from_own_ring() {
        let catalog = Catalog::new(vec![
            ContentNode::new("base", "b.mp4").with_alternates(["alt-1", "alt-2"]),
            ContentNode::new("alt-1", "1.mp4"),
            ContentNode::new("alt-2", "2.mp4"),
        ])
        .unwrap();

        let result = resolve(&catalog, "base");
        assert_eq!(id_of(result.left), Some("alt-1"));
        assert!(result.right.is_none());
    }

    #[test]
    fn test_ring_entry_not_in_catalog_is_absent() {
        let catalog = Catalog::new(vec![
            ContentNode::new("a", "a.mp4").with_alternates(["ghost", "a", "also-ghost"]),
        ])
        .unwrap();

        let result = resolve(&catalog, "a");
        assert!(result.left.is_none());
        assert!(result.right.is_none());
    }

    #[test]
    fn test_alternates_take_precedence_over_tags() {
        let catalog = Catalog::new(vec![
            ContentNode::new("a", "a.mp4")
                .with_alternates(["a", "b"])
                .with_tag("rust"),
            ContentNode::new("b", "b.mp4"),
            ContentNode::new("c", "c.mp4").with_tag("rust"),
        ])
        .unwrap();

        let result = resolve(&catalog, "a");
        assert_eq!(id_of(result.left), Some("b"));
        assert_eq!(result.left.unwrap().reason, NeighborReason::Alternate);
        assert!(result.right.is_none());
    }

    #[test]
    fn test_related_fallback_first_two_matches() {
        let catalog = Catalog::new(vec![
            ContentNode::new("a", "a.mp4").with_tag("rust"),
            ContentNode::new("b", "b.mp4").with_tag("go"),
            ContentNode::new("c", "c.mp4").with_tags(["rust", "async"]),
            ContentNode::new("d", "d.mp4").with_tag("async"),
            ContentNode::new("e", "e.mp4").with_tag("rust"),
        ])
        .unwrap();

        let result = resolve(&catalog, "c");
        assert_eq!(id_of(result.left), Some("a"));
        assert_eq!(id_of(result.right), Some("d"));
        assert_eq!(result.right.unwrap().reason, NeighborReason::Related);
    }

    #[test]
    fn test_related_single_candidate() {
        let catalog = Catalog::new(vec![
            ContentNode::new("a", "a.mp4").with_tag("rust"),
            ContentNode::new("b", "b.mp4").with_tag("rust"),
        ])
        .unwrap();

        let result = resolve(&catalog, "a");
        assert_eq!(id_of(result.left), Some("b"));
        assert!(result.right.is_none());
    }

    #[test]
    fn test_preload_targets_depth() {
        let catalog = Catalog::new(vec![
            ContentNode::new("e1", "1.mp4").with_episode("s", 1),
            ContentNode::new("e2", "2.mp4").with_episode("s", 2),
            ContentNode::new("e3", "3.mp4").with_episode("s", 3),
            ContentNode::new("e4", "4.mp4").with_episode("s", 4),
        ])
        .unwrap();

        let ids = |nodes: Vec<&ContentNode>| -> Vec<String> {
            nodes.iter().map(|n| n.id.to_string()).collect()
        };

        assert!(preload_targets(&catalog, "e2", 0).is_empty());
        assert_eq!(ids(preload_targets(&catalog, "e2", 1)), vec!["e3", "e1"]);
        assert_eq!(ids(preload_targets(&catalog, "e2", 2)), vec!["e3", "e1", "e4"]);
        assert!(preload_targets(&catalog, "missing", 3).is_empty());
    }
}
