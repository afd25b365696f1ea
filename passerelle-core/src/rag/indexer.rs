//! Document loading for the context folder.
//!
//! The folder is read flat: every entry is expected to be a UTF-8 text file
//! and is loaded whole. There is no extension filter, no recursion and no
//! skipping of unreadable entries.

use super::types::Document;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors that can occur while loading documents.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// An I/O error occurred while listing the folder.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A folder entry could not be read as UTF-8 text.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for indexing operations.
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Reads every entry of `dir_path` as a document, ordered by file name.
///
/// A subdirectory, binary file or permission error fails the whole load.
pub async fn load_documents(dir_path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir_path = dir_path.as_ref();
    let mut entries = fs::read_dir(dir_path).await?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        paths.push(entry.path());
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)
            .await
            .map_err(|source| IndexerError::Read {
                path: path.display().to_string(),
                source,
            })?;
        debug!(file = %path.display(), bytes = text.len(), "Loaded document");
        documents.push(Document::new(path, text));
    }

    Ok(documents)
}
