use std::path::PathBuf;

/// One file of the context folder, loaded wholesale.
///
/// Documents are never chunked: the whole file is embedded as a single
/// vector and returned verbatim when retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A search hit: the row of the index and its distance to the query.
///
/// `distance` is the squared Euclidean distance, so lower is closer and
/// `0.0` means the vectors are identical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f32,
}
