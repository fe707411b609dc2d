// Retrieval over the design-rule deck.
//
// Components:
// - Loader: split the deck into chunks and extract metadata
// - Embedding: pluggable text → vector mapping
// - Index: in-memory cosine search with metadata filtering
// - Retriever: corpus load at construction, query → formatted context

pub mod embedding;
pub mod index;
pub mod loader;
pub mod retriever;

// Re-export key types
pub use embedding::{Embedder, HashedBagEmbedder};
pub use index::{IndexEntry, SearchResult, VectorIndex};
pub use loader::{ChunkExtractor, DocumentChunk, BUILTIN_RULES};
pub use retriever::RuleRetriever;
