//! Tests for `traversal` module.

use super::index::DiskAnnIndex;
use super::params::DiskAnnParams;
use crate::distance::DistanceMetric;
use tempfile::TempDir;

fn small_index(dim: usize) -> (TempDir, DiskAnnIndex<f32>) {
    let dir = TempDir::new().unwrap();
    let index = DiskAnnIndex::create(
        dir.path().join("idx"),
        dim,
        DiskAnnParams::custom(8, 32, 50),
        DistanceMetric::Euclidean,
    )
    .unwrap();
    (dir, index)
}

#[test]
fn test_traverse_empty_index() {
    let (_dir, index) = small_index(4);
    assert!(index.traverse(&[0.0, 0.0, 0.0, 0.0], 10).is_empty());
}

#[test]
fn test_traverse_single_node() {
    let (_dir, mut index) = small_index(4);
    index.insert(&[1.0f32, 0.0, 0.0, 0.0], None).unwrap();

    let hits = index.traverse(&[1.0, 0.0, 0.0, 0.0], 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].1, 0);
    assert!(hits[0].0.abs() < 1e-6);
}

#[test]
fn test_traverse_sorted_ascending() {
    let (_dir, mut index) = small_index(2);
    for i in 0..50 {
        #[allow(clippy::cast_precision_loss)]
        index.insert(&[i as f32, 0.0], None).unwrap();
    }

    let hits = index.traverse(&[0.0, 0.0], 16);
    assert_eq!(hits.len(), 16);
    for pair in hits.windows(2) {
        assert!(pair[0].0 <= pair[1].0, "hits must be sorted by distance");
    }
    // The origin itself is the closest point.
    assert_eq!(hits[0].1, 0);
}

#[test]
fn test_traverse_respects_ef_bound() {
    let (_dir, mut index) = small_index(2);
    for i in 0..30 {
        #[allow(clippy::cast_precision_loss)]
        index.insert(&[i as f32, 1.0], None).unwrap();
    }

    let hits = index.traverse(&[0.0, 0.0], 5);
    assert_eq!(hits.len(), 5);
}

#[test]
fn test_traverse_is_deterministic() {
    let (_dir, mut index) = small_index(3);
    for i in 0..40 {
        #[allow(clippy::cast_precision_loss)]
        let v = [(i % 7) as f32, (i % 5) as f32, (i % 3) as f32];
        index.insert(&v, None).unwrap();
    }

    let query = [1.0, 2.0, 0.5];
    let first = index.traverse(&query, 12);
    let second = index.traverse(&query, 12);
    assert_eq!(first, second);
}

#[test]
fn test_traverse_ties_break_by_ascending_id() {
    let (_dir, mut index) = small_index(2);
    // Four points equidistant from the query.
    index.insert(&[1.0f32, 0.0], None).unwrap();
    index.insert(&[-1.0f32, 0.0], None).unwrap();
    index.insert(&[0.0f32, 1.0], None).unwrap();
    index.insert(&[0.0f32, -1.0], None).unwrap();

    let hits = index.traverse(&[0.0, 0.0], 10);
    let ids: Vec<u32> = hits.iter().map(|&(_, id)| id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}
