//! Rule deck loader
//!
//! Splits a flat rule document into chunks and extracts structured
//! metadata per section. Sections that cannot be identified are
//! skipped rather than indexed as noise.

use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;

/// Delimiter line between sections of a rule deck
pub const SECTION_DELIMITER: &str = "---";

/// Marker prefix for document header sections (never indexed)
pub const HEADER_MARKER: &str = "===";

/// Sentinel for optional fields absent from a section
pub const FIELD_MISSING: &str = "N/A";

/// Source tag attached to every chunk's metadata
pub const CORPUS_SOURCE: &str = "ASAP7_DRM";

/// Rule deck shipped with the binary
pub const BUILTIN_RULES: &str = include_str!("../../data/design_rules.txt");

/// One retrievable unit of a source document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    /// Trimmed full section text
    pub text: String,
    /// Extracted fields; always contains `rule_id`
    pub metadata: HashMap<String, String>,
}

impl DocumentChunk {
    /// Stable identifying key for this chunk
    pub fn rule_id(&self) -> &str {
        self.metadata
            .get("rule_id")
            .map(String::as_str)
            .unwrap_or(FIELD_MISSING)
    }

    /// Layer field, or the missing sentinel
    pub fn layer(&self) -> &str {
        self.metadata
            .get("layer")
            .map(String::as_str)
            .unwrap_or(FIELD_MISSING)
    }

    /// Value field, or the missing sentinel
    pub fn value(&self) -> &str {
        self.metadata
            .get("value")
            .map(String::as_str)
            .unwrap_or(FIELD_MISSING)
    }
}

/// Extracts chunks from delimiter-separated rule decks
pub struct ChunkExtractor {
    rule_id_re: Regex,
    layer_re: Regex,
    value_re: Regex,
    description_re: Regex,
}

impl ChunkExtractor {
    /// Compile the field patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            rule_id_re: Regex::new(r"^([A-Z0-9.]+)\s*-")?,
            layer_re: Regex::new(r"Layer:\s*(.+)")?,
            value_re: Regex::new(r"Value:\s*(.+)")?,
            description_re: Regex::new(r"Description:\s*(.+)")?,
        })
    }

    /// Split a document into chunks, in document order
    ///
    /// Empty sections and header sections are discarded; sections with
    /// no identifier are silently skipped.
    pub fn extract(&self, content: &str) -> Vec<DocumentChunk> {
        content
            .split(SECTION_DELIMITER)
            .filter_map(|section| {
                let section = section.trim();
                if section.is_empty() || section.starts_with(HEADER_MARKER) {
                    return None;
                }
                self.parse_section(section)
            })
            .collect()
    }

    /// Parse one section into a chunk, or None when no identifier matches
    fn parse_section(&self, section: &str) -> Option<DocumentChunk> {
        let rule_id = self
            .rule_id_re
            .captures(section)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())?;

        let field = |re: &Regex| -> String {
            re.captures(section)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| FIELD_MISSING.to_string())
        };

        let mut metadata = HashMap::new();
        metadata.insert("rule_id".to_string(), rule_id);
        metadata.insert("layer".to_string(), field(&self.layer_re));
        metadata.insert("value".to_string(), field(&self.value_re));
        metadata.insert("description".to_string(), field(&self.description_re));
        metadata.insert("source".to_string(), CORPUS_SOURCE.to_string());

        Some(DocumentChunk {
            text: section.to_string(),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ChunkExtractor {
        ChunkExtractor::new().unwrap()
    }

    #[test]
    fn test_extract_well_formed_section() {
        let deck = "M1.W.1 - Minimum Width\n\
                    Layer: Metal1\n\
                    Value: 18nm\n\
                    Description: All Metal1 shapes must have minimum width of 18nm.";

        let chunks = extractor().extract(deck);
        assert_eq!(chunks.len(), 1);

        let chunk = &chunks[0];
        assert_eq!(chunk.rule_id(), "M1.W.1");
        assert_eq!(chunk.layer(), "Metal1");
        assert_eq!(chunk.value(), "18nm");
        assert_eq!(chunk.metadata.get("source").unwrap(), CORPUS_SOURCE);
        assert!(chunk.text.contains("minimum width of 18nm"));
    }

    #[test]
    fn test_missing_optional_fields_use_sentinel() {
        let deck = "PO.S.1 - Minimum Spacing";
        let chunks = extractor().extract(deck);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].layer(), FIELD_MISSING);
        assert_eq!(chunks[0].value(), FIELD_MISSING);
    }

    #[test]
    fn test_malformed_section_skipped() {
        let deck = "M1.W.1 - Minimum Width\nLayer: Metal1\nValue: 18nm\n\
                    ---\n\
                    just some prose without an identifier line";

        let chunks = extractor().extract(deck);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].rule_id(), "M1.W.1");
    }

    #[test]
    fn test_headers_and_empty_sections_discarded() {
        let deck = "=== ASAP7 Design Rule Manual ===\n\
                    ---\n\
                    \n\
                    ---\n\
                    M2.S.1 - Minimum Spacing\nLayer: Metal2\nValue: 18nm";

        let chunks = extractor().extract(deck);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].rule_id(), "M2.S.1");
    }

    #[test]
    fn test_document_order_preserved() {
        let deck = "M1.W.1 - Minimum Width\nLayer: Metal1\n\
                    ---\n\
                    M1.S.1 - Minimum Spacing\nLayer: Metal1\n\
                    ---\n\
                    M2.W.1 - Minimum Width\nLayer: Metal2";

        let ids: Vec<String> = extractor()
            .extract(deck)
            .iter()
            .map(|c| c.rule_id().to_string())
            .collect();
        assert_eq!(ids, vec!["M1.W.1", "M1.S.1", "M2.W.1"]);
    }

    #[test]
    fn test_chunk_text_is_trimmed_section() {
        let deck = "\n\n  M3.W.1 - Minimum Width\nLayer: Metal3\n\n";
        let chunks = extractor().extract(deck);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.starts_with("M3.W.1"));
        assert!(!chunks[0].text.ends_with('\n'));
    }

    #[test]
    fn test_builtin_deck_extracts_every_rule() {
        let chunks = extractor().extract(BUILTIN_RULES);
        assert_eq!(chunks.len(), 17);

        let ids: Vec<&str> = chunks.iter().map(|c| c.rule_id()).collect();
        assert!(ids.contains(&"M1.W.1"));
        assert!(ids.contains(&"M1.S.2"));
        assert!(ids.contains(&"PO.EX.1"));
        assert!(ids.contains(&"V0.S.1"));

        for chunk in &chunks {
            assert_ne!(chunk.layer(), FIELD_MISSING, "{} has no layer", chunk.rule_id());
            assert_ne!(chunk.value(), FIELD_MISSING, "{} has no value", chunk.rule_id());
        }
    }
}
