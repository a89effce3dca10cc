//! Recall tests against exhaustive ground truth.

use super::index::DiskAnnIndex;
use super::params::DiskAnnParams;
use crate::distance::DistanceMetric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn random_unit_vector(rng: &mut StdRng, dim: usize) -> Vec<f32> {
    let v: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.into_iter().map(|x| x / norm.max(1e-12)).collect()
}

#[test]
fn test_recall_at_10_on_random_unit_vectors() {
    let dim = 12;
    let n = 2000;
    let queries = 40;

    let dir = TempDir::new().unwrap();
    let mut index: DiskAnnIndex<f32> = DiskAnnIndex::create(
        dir.path().join("idx"),
        dim,
        DiskAnnParams::default(),
        DistanceMetric::Euclidean,
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..n {
        let v = random_unit_vector(&mut rng, dim);
        index.insert(&v, None).unwrap();
    }

    let mut total_recall = 0.0;
    for _ in 0..queries {
        let q = random_unit_vector(&mut rng, dim);
        let approx: Vec<u64> = index
            .search(&q, 10)
            .unwrap()
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        let exact: Vec<u64> = index
            .exact_search(&q, 10)
            .unwrap()
            .into_iter()
            .map(|(_, id)| id)
            .collect();

        let hits = approx.iter().filter(|id| exact.contains(id)).count();
        #[allow(clippy::cast_precision_loss)]
        {
            total_recall += hits as f64 / exact.len() as f64;
        }
    }

    let mean_recall = total_recall / f64::from(queries);
    assert!(
        mean_recall >= 0.7,
        "mean recall@10 {mean_recall:.3} below target"
    );
}

#[test]
fn test_recall_survives_churn() {
    // Delete a third of the points, reinsert fresh ones, and make sure the
    // graph still routes queries to their true neighbors.
    let dim = 8;
    let dir = TempDir::new().unwrap();
    let mut index: DiskAnnIndex<f32> = DiskAnnIndex::create(
        dir.path().join("idx"),
        dim,
        DiskAnnParams::default(),
        DistanceMetric::Euclidean,
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..300 {
        let v = random_unit_vector(&mut rng, dim);
        index.insert(&v, None).unwrap();
    }
    for id in (1..=300u64).step_by(3) {
        index.delete_by_id(id).unwrap();
    }
    for _ in 0..100 {
        let v = random_unit_vector(&mut rng, dim);
        index.insert(&v, None).unwrap();
    }

    let mut total_recall = 0.0;
    for _ in 0..20 {
        let q = random_unit_vector(&mut rng, dim);
        let approx: Vec<u64> = index
            .search(&q, 10)
            .unwrap()
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        let exact: Vec<u64> = index
            .exact_search(&q, 10)
            .unwrap()
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        let hits = approx.iter().filter(|id| exact.contains(id)).count();
        #[allow(clippy::cast_precision_loss)]
        {
            total_recall += hits as f64 / exact.len() as f64;
        }
    }

    let mean_recall = total_recall / 20.0;
    assert!(
        mean_recall >= 0.7,
        "post-churn mean recall@10 {mean_recall:.3} below target"
    );
}
