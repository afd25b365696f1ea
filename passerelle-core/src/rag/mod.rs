//! Context retrieval for the transition writer.
//!
//! # Overview
//!
//! A folder of short articles is turned into a knowledge base once per run:
//! 1. **Loading**: every file of the folder is read whole (see [`load_documents`])
//! 2. **Embedding**: each document becomes one vector via the [`Embedder`]
//! 3. **Indexing**: the vectors are stacked into an [`EmbeddingMatrix`] and
//!    added to an exact [`FlatL2Index`]
//!
//! Queries embed the text, take the `k` nearest rows and return the matching
//! documents joined by newlines, closest first.
//!
//! Row `i` of the index always corresponds to `texts[i]`. Nothing here
//! inserts, removes or persists documents after the build.

mod embedder;
mod indexer;
mod store;
mod types;

pub use embedder::{Embedder, EmbedderError};
pub use indexer::{load_documents, IndexerError};
pub use store::{EmbeddingMatrix, FlatL2Index, IndexError, VectorIndex};
pub use types::{Document, Neighbor};

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Embedder error: {0}")]
    Embedder(#[from] EmbedderError),

    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("No documents found in {0}")]
    EmptyCorpus(String),

    #[error("Index holds {index_len} vectors but {texts_len} texts were supplied")]
    Misaligned { index_len: usize, texts_len: usize },

    #[error("Search returned row {id} outside the {len} known texts")]
    UnknownRow { id: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, RagError>;

/// The loaded embedding model, the built index and the raw texts.
///
/// Built once by [`load_embeddings_from_documents`]; read-only afterwards, so
/// a shared reference can serve concurrent queries.
#[derive(Debug)]
pub struct KnowledgeBase<I: VectorIndex = FlatL2Index> {
    embedder: Embedder,
    index: I,
    texts: Vec<String>,
}

impl<I: VectorIndex> KnowledgeBase<I> {
    /// Assembles a knowledge base from an already-built index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Misaligned`] if the index and the texts differ in length.
    pub fn from_parts(embedder: Embedder, index: I, texts: Vec<String>) -> Result<Self> {
        if index.len() != texts.len() {
            return Err(RagError::Misaligned {
                index_len: index.len(),
                texts_len: texts.len(),
            });
        }
        Ok(Self {
            embedder,
            index,
            texts,
        })
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn into_parts(self) -> (Embedder, I, Vec<String>) {
        (self.embedder, self.index, self.texts)
    }

    /// Returns the `k` documents closest to `query`, newline-joined.
    pub async fn retrieve_context(&self, query: &str, k: usize) -> Result<String> {
        retrieve_context(query, &self.embedder, &self.index, &self.texts, k).await
    }
}

/// Loads every document of `doc_folder`, embeds it and builds a flat L2 index.
///
/// # Errors
///
/// Fails if any entry of the folder cannot be read as text, if embedding
/// fails, if the model returns vectors of differing dimension, or if the
/// folder is empty.
pub async fn load_embeddings_from_documents(
    doc_folder: impl AsRef<Path>,
    embedder: Embedder,
) -> Result<KnowledgeBase> {
    let doc_folder = doc_folder.as_ref();
    let documents = load_documents(doc_folder).await?;
    info!(folder = %doc_folder.display(), count = documents.len(), "Loaded documents");

    if documents.is_empty() {
        return Err(RagError::EmptyCorpus(doc_folder.display().to_string()));
    }

    let texts: Vec<String> = documents.into_iter().map(|d| d.text).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    debug!(model = embedder.model(), "Embedding documents");
    let vectors = embedder.embed_batch(&refs).await?;

    let matrix = EmbeddingMatrix::from_rows(vectors)?;
    let index = FlatL2Index::from_matrix(&matrix)?;
    info!(
        rows = matrix.rows(),
        dimension = matrix.dimension(),
        "Built flat L2 index"
    );

    KnowledgeBase::from_parts(embedder, index, texts)
}

/// Embeds `query`, searches `index` for `k` neighbors and joins the matching
/// `texts` with newlines, in the order the search returned them.
pub async fn retrieve_context<I: VectorIndex + ?Sized>(
    query: &str,
    embedder: &Embedder,
    index: &I,
    texts: &[String],
    k: usize,
) -> Result<String> {
    let embedding = embedder.embed(query).await?;
    debug!(dimension = embedding.len(), k, "Searching index");

    let neighbors = index.search(&embedding, k)?;

    let mut retrieved = Vec::with_capacity(neighbors.len());
    for neighbor in &neighbors {
        let text = texts.get(neighbor.id).ok_or(RagError::UnknownRow {
            id: neighbor.id,
            len: texts.len(),
        })?;
        debug!(row = neighbor.id, distance = neighbor.distance, "Retrieved document");
        retrieved.push(text.as_str());
    }

    Ok(retrieved.join("\n"))
}
