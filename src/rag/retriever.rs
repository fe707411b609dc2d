//! Rule retriever
//!
//! End-to-end path from a natural-language question to model-ready
//! context text: load the deck once, then rank and format matches.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::rag::embedding::Embedder;
use crate::rag::index::{SearchResult, VectorIndex};
use crate::rag::loader::ChunkExtractor;

/// Constant header preceding every rendered context block
pub const CONTEXT_HEADER: &str = "Relevant Design Rules:";

/// Retriever over one rule deck
///
/// The index is populated once at construction; queries are read-only
/// afterwards.
pub struct RuleRetriever {
    index: VectorIndex,
}

impl fmt::Debug for RuleRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRetriever")
            .field("rules", &self.index.len())
            .finish()
    }
}

impl RuleRetriever {
    /// Build a retriever from deck text
    pub fn new(corpus: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let extractor = ChunkExtractor::new().context("Failed to compile deck field patterns")?;
        let chunks = extractor.extract(corpus);

        let mut index = VectorIndex::new(embedder);
        index.upsert_chunks(&chunks);

        Ok(Self { index })
    }

    /// Build a retriever from a deck file on disk
    pub fn from_file(path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let corpus = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule deck: {}", path.display()))?;
        Self::new(&corpus, embedder)
    }

    /// Answer a question with formatted context text
    ///
    /// Each matched rule renders as an identifying line, its value,
    /// and the full original text, blocks separated by blank lines.
    /// The model is asked to answer strictly from this text, so the
    /// shape is fixed.
    pub fn query(&self, question: &str, n_results: usize, layer: Option<&str>) -> String {
        let filter = layer.map(|l| {
            let mut wanted = HashMap::new();
            wanted.insert("layer".to_string(), l.to_string());
            wanted
        });

        let results = self.index.search(question, n_results, filter.as_ref());

        let mut lines = vec![format!("{}\n", CONTEXT_HEADER)];
        for result in &results {
            let rule_id = result
                .metadata
                .get("rule_id")
                .map(String::as_str)
                .unwrap_or("N/A");
            let layer = result
                .metadata
                .get("layer")
                .map(String::as_str)
                .unwrap_or("N/A");
            let value = result
                .metadata
                .get("value")
                .map(String::as_str)
                .unwrap_or("N/A");

            lines.push(format!("[Rule {} - {}]", rule_id, layer));
            lines.push(format!("Value: {}", value));
            lines.push(result.text.clone());
            lines.push(String::new());
        }

        lines.join("\n")
    }

    /// Exact lookup of one rule by id
    ///
    /// A degenerate one-result search; absence is a normal outcome.
    pub fn get_rule(&self, rule_id: &str) -> Option<SearchResult> {
        self.index.search(rule_id, 1, None).into_iter().next()
    }

    /// Number of indexed rules
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the deck produced no rules
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::embedding::HashedBagEmbedder;

    const DECK: &str = "\
=== ASAP7 Design Rules ===
---
M1.W.1 - Minimum Width
Layer: Metal1
Value: 18nm
Description: All Metal1 shapes must have minimum width of 18nm.
---
M1.S.1 - Minimum Spacing
Layer: Metal1
Value: 18nm
Description: Minimum spacing between Metal1 shapes on the same net.
---
PO.W.1 - Minimum Width
Layer: Poly
Value: 20nm
Description: Minimum poly gate width.
---
this section has no identifier and is skipped
";

    fn retriever() -> RuleRetriever {
        RuleRetriever::new(DECK, Arc::new(HashedBagEmbedder::default())).unwrap()
    }

    #[test]
    fn test_construction_indexes_valid_sections_only() {
        let retriever = retriever();
        assert_eq!(retriever.len(), 3);
    }

    #[test]
    fn test_query_contains_identifier_and_value_verbatim() {
        let retriever = retriever();
        let context = retriever.query("minimum width metal1", 1, None);

        assert!(context.starts_with(CONTEXT_HEADER));
        assert!(context.contains("M1.W.1"));
        assert!(context.contains("18nm"));
        assert!(context.contains("[Rule M1.W.1 - Metal1]"));
        assert!(context.contains("Value: 18nm"));
    }

    #[test]
    fn test_query_layer_filter() {
        let retriever = retriever();
        let context = retriever.query("minimum width", 5, Some("Poly"));

        assert!(context.contains("PO.W.1"));
        assert!(!context.contains("M1.W.1"));
    }

    #[test]
    fn test_query_blocks_separated_by_blank_lines() {
        let retriever = retriever();
        let context = retriever.query("minimum", 2, None);

        let blocks: Vec<&str> = context.split("\n\n").collect();
        // Header, two rule blocks, trailing slot from the final blank line
        assert!(blocks.len() >= 3);
    }

    #[test]
    fn test_get_rule_exact_lookup() {
        let retriever = retriever();
        let rule = retriever.get_rule("M1.S.1").unwrap();
        assert_eq!(rule.metadata["rule_id"], "M1.S.1");
    }

    #[test]
    fn test_get_rule_absent_is_none() {
        let empty = RuleRetriever::new("", Arc::new(HashedBagEmbedder::default())).unwrap();
        assert!(empty.is_empty());
        assert!(empty.get_rule("M1.W.1").is_none());
    }

    #[test]
    fn test_query_on_empty_deck_is_header_only() {
        let empty = RuleRetriever::new("", Arc::new(HashedBagEmbedder::default())).unwrap();
        let context = empty.query("anything", 3, None);
        assert_eq!(context, format!("{}\n", CONTEXT_HEADER));
    }
}
