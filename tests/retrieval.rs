//! Integration tests for the retrieval pipeline
//!
//! Exercises the full path from deck text to formatted context: chunk
//! extraction, embedding, similarity ranking, and rendering, over the
//! rule deck shipped with the binary.

use edapilot::rag::{ChunkExtractor, HashedBagEmbedder, RuleRetriever, BUILTIN_RULES};
use std::io::Write;
use std::sync::Arc;

fn retriever_from(corpus: &str) -> RuleRetriever {
    let embedder = Arc::new(HashedBagEmbedder::default());
    RuleRetriever::new(corpus, embedder).expect("deck should index")
}

#[test]
fn test_builtin_deck_indexes_all_rules() {
    let retriever = retriever_from(BUILTIN_RULES);
    assert_eq!(retriever.len(), 17);
}

#[test]
fn test_most_relevant_rule_ranks_first() {
    let retriever = retriever_from(BUILTIN_RULES);
    let context = retriever.query("minimum width metal1", 3, None);

    assert!(context.starts_with("Relevant Design Rules:"));

    // The width rule for Metal1 must beat the width rules of the other
    // metals and the other Metal1 rules
    let first_block = context
        .find("[Rule")
        .map(|start| &context[start..])
        .expect("context should render at least one rule");
    assert!(first_block.starts_with("[Rule M1.W.1 - Metal1]"));
    assert!(first_block.contains("Value: 18nm"));
}

#[test]
fn test_different_net_spacing_is_retrievable() {
    let retriever = retriever_from(BUILTIN_RULES);
    let context = retriever.query("spacing between different nets on metal1", 3, None);

    assert!(context.contains("M1.S.2"));
    assert!(context.contains("21nm"));
}

#[test]
fn test_layer_filter_excludes_other_layers() {
    let retriever = retriever_from(BUILTIN_RULES);
    let context = retriever.query("minimum spacing", 5, Some("Poly"));

    assert!(context.contains("PO.S.1"));
    assert!(!context.contains("Metal1"));
    assert!(!context.contains("M2.S.1"));
    assert!(!context.contains("ACT.S.1"));
}

#[test]
fn test_filter_on_absent_layer_renders_header_only() {
    let retriever = retriever_from(BUILTIN_RULES);
    let context = retriever.query("minimum width", 5, Some("Metal99"));

    assert!(context.starts_with("Relevant Design Rules:"));
    assert!(!context.contains("[Rule"));
}

#[test]
fn test_n_results_caps_rendered_blocks() {
    let retriever = retriever_from(BUILTIN_RULES);
    let context = retriever.query("minimum spacing", 2, None);

    assert_eq!(context.matches("[Rule").count(), 2);
}

#[test]
fn test_exact_rule_lookup_by_id() {
    let retriever = retriever_from(BUILTIN_RULES);

    let rule = retriever.get_rule("PO.EX.1").expect("rule should exist");
    assert_eq!(rule.metadata["rule_id"], "PO.EX.1");
    assert_eq!(rule.metadata["layer"], "Poly");
    assert_eq!(rule.metadata["value"], "10nm");
    assert!(rule.text.contains("beyond the active region"));
}

#[test]
fn test_noise_sections_never_indexed() {
    let deck = "\
=== SOME RULE DECK ===
---
M1.W.1 - Minimum Width
Layer: Metal1
Value: 18nm
Description: All Metal1 shapes must have a minimum width of 18nm.
---
revision history: v1.2 widened the via enclosure
---
m9.x.1 - lowercase identifiers are not rule ids
---
";
    let retriever = retriever_from(deck);
    assert_eq!(retriever.len(), 1);

    let context = retriever.query("via enclosure revision", 5, None);
    assert!(!context.contains("revision history"));
    assert!(!context.contains("lowercase"));
}

#[test]
fn test_file_and_text_construction_agree() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BUILTIN_RULES.as_bytes()).unwrap();

    let embedder = Arc::new(HashedBagEmbedder::default());
    let from_file = RuleRetriever::from_file(file.path(), embedder).unwrap();
    let from_text = retriever_from(BUILTIN_RULES);

    assert_eq!(from_file.len(), from_text.len());
    assert_eq!(
        from_file.query("minimum width metal1", 3, None),
        from_text.query("minimum width metal1", 3, None)
    );
}

#[test]
fn test_missing_deck_file_reports_path() {
    let embedder = Arc::new(HashedBagEmbedder::default());
    let err = RuleRetriever::from_file(std::path::Path::new("/no/such/deck.txt"), embedder)
        .unwrap_err();

    assert!(format!("{:#}", err).contains("/no/such/deck.txt"));
}

#[test]
fn test_every_extracted_chunk_is_indexed() {
    let extractor = ChunkExtractor::new().unwrap();
    let chunks = extractor.extract(BUILTIN_RULES);
    let retriever = retriever_from(BUILTIN_RULES);

    // Every valid chunk carries a rule id, so none are dropped between
    // extraction and indexing
    assert_eq!(chunks.len(), retriever.len());
}
