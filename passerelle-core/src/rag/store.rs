//! Vector index abstraction and the exact flat L2 implementation.
//!
//! The index only knows row ids. Mapping a row back to its document text is
//! the caller's job, which is why rows must be added in the same order as
//! the texts they were embedded from.

use super::types::Neighbor;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use thiserror::Error;

/// Errors raised by matrix construction and index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Cannot build an embedding matrix from zero vectors")]
    Empty,

    #[error("Embedding dimension must be greater than zero")]
    ZeroDimension,

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Requested {k} neighbors but the index holds only {len} vectors")]
    KTooLarge { k: usize, len: usize },

    #[error("Matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// A well-shaped `rows x dimension` matrix of embeddings.
///
/// Row `i` holds the embedding of input `i`.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Array2<f32>,
}

impl EmbeddingMatrix {
    /// Stacks vectors into a matrix, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = rows.first().map(Vec::len).ok_or(IndexError::Empty)?;
        if dimension == 0 {
            return Err(IndexError::ZeroDimension);
        }

        let count = rows.len();
        let mut flat = Vec::with_capacity(count * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            flat.extend(row);
        }

        let data = Array2::from_shape_vec((count, dimension), flat)?;
        Ok(Self { data })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }
}

/// Nearest-neighbor search over embedding rows.
///
/// Implementations return neighbors ordered from closest to farthest.
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored and query vector must have.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends every row of `matrix`. Row ids continue from the current length.
    fn add(&mut self, matrix: &EmbeddingMatrix) -> Result<()>;

    /// Returns the `k` stored rows closest to `query`, closest first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Exact brute-force index using squared Euclidean distance.
///
/// Every search scans all rows. Ties are broken by ascending row id so the
/// result order is deterministic.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    vectors: Array2<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: Array2::zeros((0, dimension)),
        }
    }

    /// Builds an index holding exactly the rows of `matrix`.
    pub fn from_matrix(matrix: &EmbeddingMatrix) -> Result<Self> {
        let mut index = Self::new(matrix.dimension());
        index.add(matrix)?;
        Ok(index)
    }
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    fn len(&self) -> usize {
        self.vectors.nrows()
    }

    fn add(&mut self, matrix: &EmbeddingMatrix) -> Result<()> {
        if matrix.dimension() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: matrix.dimension(),
            });
        }
        self.vectors.append(Axis(0), matrix.view())?;
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }
        if k > self.len() {
            return Err(IndexError::KTooLarge { k, len: self.len() });
        }

        let query = ArrayView1::from(query);
        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .rows()
            .into_iter()
            .enumerate()
            .map(|(id, row)| {
                let diff = &row - &query;
                Neighbor {
                    id,
                    distance: diff.dot(&diff),
                }
            })
            .collect();

        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        neighbors.truncate(k);
        Ok(neighbors)
    }
}
