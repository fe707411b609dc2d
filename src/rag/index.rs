//! In-memory vector index
//!
//! Brute-force cosine search over embedded chunks. Read-mostly after
//! the corpus load; upsert is idempotent by entry id.

use std::collections::HashMap;
use std::sync::Arc;

use crate::rag::embedding::Embedder;
use crate::rag::loader::DocumentChunk;

/// One stored entry: text, metadata, and its embedding
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, String>,
    /// Precomputed embedding; computed from `text` at upsert when None
    pub embedding: Option<Vec<f32>>,
}

impl IndexEntry {
    /// Build an entry from a chunk, keyed by its rule id
    ///
    /// Returns None when the chunk carries no identifying key; such
    /// chunks are dropped rather than indexed.
    pub fn from_chunk(chunk: &DocumentChunk) -> Option<Self> {
        let id = chunk.metadata.get("rule_id")?.clone();
        Some(Self {
            id,
            text: chunk.text.clone(),
            metadata: chunk.metadata.clone(),
            embedding: None,
        })
    }
}

/// One search hit
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, String>,
    pub score: f32,
}

struct StoredEntry {
    id: String,
    text: String,
    metadata: HashMap<String, String>,
    embedding: Vec<f32>,
}

/// In-memory similarity index with exact-match metadata filtering
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    /// Entries in first-insertion order; overwrites keep the original slot
    entries: Vec<StoredEntry>,
    by_id: HashMap<String, usize>,
}

impl VectorIndex {
    /// Create an empty index over the given embedder
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Write entries, overwriting by id
    ///
    /// Re-adding an existing id replaces the stored entry in place, so
    /// first-insertion order is stable across repeated loads.
    pub fn upsert(&mut self, entries: Vec<IndexEntry>) {
        for entry in entries {
            let embedding = entry
                .embedding
                .unwrap_or_else(|| self.embedder.embed(&entry.text));

            let stored = StoredEntry {
                id: entry.id,
                text: entry.text,
                metadata: entry.metadata,
                embedding,
            };

            match self.by_id.get(&stored.id) {
                Some(&slot) => self.entries[slot] = stored,
                None => {
                    self.by_id.insert(stored.id.clone(), self.entries.len());
                    self.entries.push(stored);
                }
            }
        }
    }

    /// Index chunks directly, skipping any without an identifying key
    pub fn upsert_chunks(&mut self, chunks: &[DocumentChunk]) {
        let entries = chunks.iter().filter_map(IndexEntry::from_chunk).collect();
        self.upsert(entries);
    }

    /// Rank entries by cosine similarity to the query text
    ///
    /// `filter` restricts candidates to entries whose metadata matches
    /// every given key/value exactly. Ties break by first-insertion
    /// order; `top_k` of zero returns nothing.
    pub fn search(
        &self,
        query_text: &str,
        top_k: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Vec<SearchResult> {
        if top_k == 0 {
            return Vec::new();
        }

        let query = self.embedder.embed(query_text);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| match filter {
                Some(wanted) => wanted
                    .iter()
                    .all(|(k, v)| entry.metadata.get(k) == Some(v)),
                None => true,
            })
            .map(|(seq, entry)| (seq, cosine_similarity(&query, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(seq, score)| {
                let entry = &self.entries[seq];
                SearchResult {
                    id: entry.id.clone(),
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                    score,
                }
            })
            .collect()
    }

    /// Remove all entries, leaving the index as freshly constructed
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_id.clear();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
