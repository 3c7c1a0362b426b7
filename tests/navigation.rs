//! Navigation Integration Tests
//!
//! Tests for neighbor resolution over catalogs loaded from disk.

use feedgrid::core::resolver::{self, preload_targets};
use feedgrid::domain::{ContentNode, Direction, NeighborReason};
use feedgrid::library::Catalog;
use tempfile::TempDir;

fn id_of(catalog: &Catalog, id: &str, direction: Direction) -> Option<String> {
    resolver::neighbor(catalog, id, direction).map(|n| n.node.id.to_string())
}

fn series_catalog() -> Catalog {
    // Inserted out of episode order on purpose
    Catalog::new(vec![
        ContentNode::new("ep3", "s/3.mp4").with_episode("s", 3),
        ContentNode::new("ep1", "s/1.mp4").with_episode("s", 1),
        ContentNode::new("ep2", "s/2.mp4").with_episode("s", 2),
        ContentNode::new("ep4", "s/4.mp4").with_episode("s", 4),
    ])
    .unwrap()
}

#[test]
fn test_three_episode_example() {
    let catalog = Catalog::new(vec![
        ContentNode::new("A", "a.mp4").with_episode("S", 1),
        ContentNode::new("B", "b.mp4").with_episode("S", 2),
        ContentNode::new("C", "c.mp4").with_episode("S", 3),
    ])
    .unwrap();

    let result = resolver::resolve(&catalog, "B");

    let up = result.up.unwrap();
    assert_eq!(up.node.id.as_str(), "C");
    assert_eq!(up.reason, NeighborReason::NextEpisode);

    let down = result.down.unwrap();
    assert_eq!(down.node.id.as_str(), "A");
    assert_eq!(down.reason, NeighborReason::PreviousEpisode);

    assert!(result.left.is_none());
    assert!(result.right.is_none());
}

#[test]
fn test_vertical_symmetry() {
    let catalog = series_catalog();

    for node in catalog.nodes() {
        let id = node.id.as_str();
        if let Some(up) = id_of(&catalog, id, Direction::Up) {
            assert_eq!(id_of(&catalog, &up, Direction::Down).as_deref(), Some(id));
        }
        if let Some(down) = id_of(&catalog, id, Direction::Down) {
            assert_eq!(id_of(&catalog, &down, Direction::Up).as_deref(), Some(id));
        }
    }

    // Series boundaries
    assert_eq!(id_of(&catalog, "ep1", Direction::Down), None);
    assert_eq!(id_of(&catalog, "ep4", Direction::Up), None);
}

#[test]
fn test_missing_episode_number_sorts_first() {
    let catalog = Catalog::new(vec![
        ContentNode::new("ep1", "1.mp4").with_episode("s", 1),
        ContentNode::new("trailer", "t.mp4").with_series("s"),
        ContentNode::new("ep2", "2.mp4").with_episode("s", 2),
    ])
    .unwrap();

    assert_eq!(id_of(&catalog, "trailer", Direction::Up).as_deref(), Some("ep1"));
    assert_eq!(id_of(&catalog, "ep1", Direction::Down).as_deref(), Some("trailer"));
}

#[test]
fn test_ring_symmetry() {
    let ring = ["v1", "v2", "v3", "v4"];
    let catalog = Catalog::new(
        ring.iter()
            .map(|id| ContentNode::new(*id, format!("{}.mp4", id)).with_alternates(ring))
            .collect(),
    )
    .unwrap();

    for id in ring {
        if let Some(left) = id_of(&catalog, id, Direction::Left) {
            assert_eq!(id_of(&catalog, &left, Direction::Right).as_deref(), Some(id));
        }
    }

    // No wraparound
    assert_eq!(id_of(&catalog, "v1", Direction::Right), None);
    assert_eq!(id_of(&catalog, "v4", Direction::Left), None);
    assert_eq!(id_of(&catalog, "v2", Direction::Left).as_deref(), Some("v3"));
    assert_eq!(id_of(&catalog, "v2", Direction::Right).as_deref(), Some("v1"));
}

#[test]
fn test_alternates_take_precedence_over_tags() {
    let catalog = Catalog::new(vec![
        ContentNode::new("a", "a.mp4")
            .with_alternates(["a", "b"])
            .with_tag("math"),
        ContentNode::new("b", "b.mp4").with_alternates(["a", "b"]),
        ContentNode::new("c", "c.mp4").with_tag("math"),
    ])
    .unwrap();

    let left = resolver::neighbor(&catalog, "a", Direction::Left).unwrap();
    assert_eq!(left.node.id.as_str(), "b");
    assert_eq!(left.reason, NeighborReason::Alternate);
}

#[test]
fn test_related_fallback_is_deterministic() {
    let catalog = Catalog::new(vec![
        ContentNode::new("x", "x.mp4").with_tags(["physics", "waves"]),
        ContentNode::new("y", "y.mp4").with_tag("chemistry"),
        ContentNode::new("z", "z.mp4").with_tag("waves"),
        ContentNode::new("w", "w.mp4").with_tag("physics"),
        ContentNode::new("q", "q.mp4").with_tag("physics"),
    ])
    .unwrap();

    let first = resolver::resolve(&catalog, "x");
    for _ in 0..10 {
        assert_eq!(resolver::resolve(&catalog, "x"), first);
    }

    // Catalog order, not tag order
    let left = first.left.unwrap();
    let right = first.right.unwrap();
    assert_eq!(left.node.id.as_str(), "z");
    assert_eq!(right.node.id.as_str(), "w");
    assert_eq!(left.reason, NeighborReason::Related);
}

#[test]
fn test_preload_targets_depth() {
    let catalog = series_catalog();

    let one: Vec<_> = preload_targets(&catalog, "ep2", 1)
        .iter()
        .map(|n| n.id.to_string())
        .collect();
    assert_eq!(one, vec!["ep3", "ep1"]);

    let two: Vec<_> = preload_targets(&catalog, "ep2", 2)
        .iter()
        .map(|n| n.id.to_string())
        .collect();
    assert_eq!(two, vec!["ep3", "ep1", "ep4"]);

    assert!(preload_targets(&catalog, "ep2", 0).is_empty());
    assert!(preload_targets(&catalog, "missing", 3).is_empty());
}

#[tokio::test]
async fn test_resolve_catalog_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalog.json");

    let json = r#"{
        "version": 1,
        "nodes": [
            {"id": "intro", "seriesId": "calc", "episodeNumber": 1, "resourceUrl": "https://cdn.example.com/1.mp4", "tags": ["calculus"]},
            {"id": "limits", "seriesId": "calc", "episodeNumber": 2, "resourceUrl": "https://cdn.example.com/2.mp4",
             "alternateVersions": ["limits", "limits-visual"]},
            {"id": "limits-visual", "resourceUrl": "https://cdn.example.com/2v.mp4",
             "alternateVersions": ["limits", "limits-visual"]},
            {"id": "derivatives", "resourceUrl": "https://cdn.example.com/d.mp4", "tags": ["calculus"]}
        ]
    }"#;
    tokio::fs::write(&path, json).await.unwrap();

    let catalog = Catalog::load(&path).await.unwrap();
    assert_eq!(catalog.len(), 4);

    let limits = resolver::resolve(&catalog, "limits");
    assert_eq!(limits.down.unwrap().node.id.as_str(), "intro");
    assert_eq!(limits.left.unwrap().node.id.as_str(), "limits-visual");
    assert!(limits.up.is_none());
    assert!(limits.right.is_none());

    let intro = resolver::resolve(&catalog, "intro");
    assert_eq!(intro.up.unwrap().node.id.as_str(), "limits");
    assert_eq!(intro.left.unwrap().node.id.as_str(), "derivatives");
    assert!(intro.right.is_none());
}

#[tokio::test]
async fn test_load_rejects_duplicate_ids() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalog.json");

    let json = r#"{"nodes": [
        {"id": "a", "resourceUrl": "a.mp4"},
        {"id": "a", "resourceUrl": "b.mp4"}
    ]}"#;
    tokio::fs::write(&path, json).await.unwrap();

    let err = Catalog::load(&path).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Duplicate"));
}
