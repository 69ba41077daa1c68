use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Row-major `rows x dim` block of embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    dim: usize,
}

impl EmbeddingMatrix {
    pub fn from_rows(data: Vec<f32>, dim: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(dim > 0, "embedding dim must be positive");
        anyhow::ensure!(
            data.len() % dim == 0,
            "buffer of {} values is not a multiple of dim {}",
            data.len(),
            dim
        );
        Ok(Self { data, dim })
    }

    pub fn rows(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dim)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Stand-in database plus a single query, both standard normal.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBatch {
    pub db: EmbeddingMatrix,
    pub query: Vec<f32>,
}

/// Deterministic random source; every sampling call borrows it mutably.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn standard_normal(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.sample::<f32, _>(StandardNormal)).collect()
}

/// Sample an `n x dim` database, then a `dim` query, from the same source.
pub fn synthetic_batch(rng: &mut StdRng, n: usize, dim: usize) -> anyhow::Result<SyntheticBatch> {
    anyhow::ensure!(n > 0 && dim > 0, "synthetic batch needs positive n and dim (got n={}, dim={})", n, dim);
    let db = EmbeddingMatrix::from_rows(standard_normal(rng, n * dim), dim)?;
    let query = standard_normal(rng, dim);
    Ok(SyntheticBatch { db, query })
}
