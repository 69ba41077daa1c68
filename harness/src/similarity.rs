use crate::embeddings::EmbeddingMatrix;
use anyhow::Result;

/// Added to every norm before dividing so zero vectors stay finite.
pub const NORM_EPS: f32 = 1e-9;

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn normalized(v: &[f32]) -> Vec<f32> {
    let denom = l2_norm(v) + NORM_EPS;
    v.iter().map(|x| x / denom).collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity of the query against every row, in row order.
pub fn cosine_scores(db: &EmbeddingMatrix, query: &[f32]) -> Result<Vec<f32>> {
    anyhow::ensure!(
        query.len() == db.dim(),
        "query has {} components but database rows have {}",
        query.len(),
        db.dim()
    );
    let qn = normalized(query);
    let scores = db
        .iter_rows()
        .map(|row| {
            let denom = l2_norm(row) + NORM_EPS;
            dot(row, &qn) / denom
        })
        .collect();
    Ok(scores)
}

/// Mean of the `topk` largest cosine similarities between `query` and the rows of `db`.
///
/// Errors when `topk` is zero or exceeds the number of rows instead of truncating.
pub fn topk_mean_cosine(db: &EmbeddingMatrix, query: &[f32], topk: usize) -> Result<f64> {
    anyhow::ensure!(topk > 0, "topk must be at least 1");
    anyhow::ensure!(
        topk <= db.rows(),
        "topk {} exceeds database size {}",
        topk,
        db.rows()
    );
    let mut scores = cosine_scores(db, query)?;
    if topk < scores.len() {
        // partition so the k largest land in front, unordered
        scores.select_nth_unstable_by(topk - 1, |a, b| b.total_cmp(a));
    }
    let sum: f64 = scores[..topk].iter().map(|&s| s as f64).sum();
    Ok(sum / topk as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{seeded_rng, synthetic_batch};
    use rand::Rng;

    fn matrix(rows: &[[f32; 2]]) -> EmbeddingMatrix {
        EmbeddingMatrix::from_rows(rows.iter().flatten().copied().collect(), 2).unwrap()
    }

    #[test]
    fn picks_the_most_aligned_rows() {
        let db = matrix(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [3.0, 3.0]]);
        let m = topk_mean_cosine(&db, &[2.0, 0.0], 2).unwrap();
        let expected = (1.0 + std::f64::consts::FRAC_1_SQRT_2) / 2.0;
        assert!((m - expected).abs() < 1e-6, "got {}", m);
    }

    #[test]
    fn topk_equal_to_n_is_mean_of_all_scores() {
        let batch = synthetic_batch(&mut seeded_rng(3), 64, 16).unwrap();
        let scores = cosine_scores(&batch.db, &batch.query).unwrap();
        let all = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
        let m = topk_mean_cosine(&batch.db, &batch.query, 64).unwrap();
        assert!((m - all).abs() < 1e-9);
        assert!((-1.0..=1.0).contains(&m));
    }

    #[test]
    fn metric_stays_within_cosine_bounds() {
        let mut rng = seeded_rng(11);
        for _ in 0..25 {
            let n = rng.gen_range(1..300);
            let dim = rng.gen_range(1..48);
            let topk = rng.gen_range(1..=n);
            let batch = synthetic_batch(&mut rng, n, dim).unwrap();
            let m = topk_mean_cosine(&batch.db, &batch.query, topk).unwrap();
            assert!(m.is_finite());
            assert!((-1.0 - 1e-6..=1.0 + 1e-6).contains(&m), "n={} dim={} topk={} metric={}", n, dim, topk, m);
        }
    }

    #[test]
    fn larger_k_never_raises_the_mean() {
        let batch = synthetic_batch(&mut seeded_rng(5), 500, 32).unwrap();
        let top1 = topk_mean_cosine(&batch.db, &batch.query, 1).unwrap();
        let top10 = topk_mean_cosine(&batch.db, &batch.query, 10).unwrap();
        let top100 = topk_mean_cosine(&batch.db, &batch.query, 100).unwrap();
        assert!(top1 >= top10 && top10 >= top100);
    }

    #[test]
    fn zero_vectors_score_zero_not_nan() {
        let db = matrix(&[[0.0, 0.0], [1.0, 1.0]]);
        let scores = cosine_scores(&db, &[0.0, 0.0]).unwrap();
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let batch = synthetic_batch(&mut seeded_rng(9), 20, 4).unwrap();
        let before = batch.clone();
        topk_mean_cosine(&batch.db, &batch.query, 5).unwrap();
        assert_eq!(batch, before);
    }

    #[test]
    fn rejects_bad_topk_and_mismatched_query() {
        let db = matrix(&[[1.0, 0.0], [0.0, 1.0]]);
        assert!(topk_mean_cosine(&db, &[1.0, 0.0], 0).is_err());
        let err = topk_mean_cosine(&db, &[1.0, 0.0], 3).unwrap_err();
        assert!(err.to_string().contains("exceeds database size"));
        assert!(topk_mean_cosine(&db, &[1.0, 0.0, 0.0], 1).is_err());
    }
}
