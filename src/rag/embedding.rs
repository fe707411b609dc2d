//! Embedding abstraction
//!
//! The index never hard-codes an embedding scheme; anything that maps
//! text to a fixed-length vector plugs in here.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps text to a fixed-length numeric vector
pub trait Embedder: Send + Sync {
    /// Embed one text
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Output vector length, constant for this embedder
    fn dim(&self) -> usize;
}

/// Deterministic hashed bag-of-words embedder
///
/// Lowercased alphanumeric tokens are hashed into a fixed number of
/// buckets and the count vector is l2-normalized. Keyword-grade
/// retrieval quality, zero external dependencies, stable within a
/// process. A real embedding model implements the same trait.
pub struct HashedBagEmbedder {
    dim: usize,
}

impl HashedBagEmbedder {
    /// Default vector width
    pub const DEFAULT_DIM: usize = 256;

    /// Create an embedder with the given vector width
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for HashedBagEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIM)
    }
}

impl Embedder for HashedBagEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];

        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dim;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }

        vector
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

/// Lowercased alphanumeric token runs
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
