use super::{Result, WriterError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A reference pair shown to the model: two joined paragraphs and the
/// transition an editor wrote between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub transition: String,
}

impl Example {
    pub fn new(input: impl Into<String>, transition: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            transition: transition.into(),
        }
    }
}

/// Reads a JSON array of `{"input": ..., "transition": ...}` objects.
pub fn load_examples(path: impl AsRef<Path>) -> Result<Vec<Example>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| WriterError::ExamplesRead {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Draws `min(count, pool.len())` distinct examples uniformly at random.
pub fn sample_examples<'a, R: Rng + ?Sized>(
    pool: &'a [Example],
    count: usize,
    rng: &mut R,
) -> Vec<&'a Example> {
    pool.choose_multiple(rng, count.min(pool.len())).collect()
}
