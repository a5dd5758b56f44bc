//! Query analysis
//!
//! Runs the same normalize/tokenize/expand/extract pipeline as the catalog
//! indexer over a raw query string. The result is ephemeral and depends only
//! on (query, dictionary version), so callers may cache it freely.

use serde::Serialize;
use std::collections::HashSet;

use crate::dictionary::CompiledDictionary;

/// A query string's precomputed, catalog-independent search representation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryAnalysis {
    pub normalized_description: String,
    pub normalized_part_number: String,
    pub raw_tokens: Vec<String>,
    pub expanded_tokens: HashSet<String>,
    pub dimensions: HashSet<String>,
}

impl QueryAnalysis {
    pub fn is_empty(&self) -> bool {
        self.raw_tokens.is_empty()
            && self.expanded_tokens.is_empty()
            && self.dimensions.is_empty()
            && self.normalized_description.is_empty()
            && self.normalized_part_number.is_empty()
    }
}

/// Analyze a raw query. A blank query yields an all-empty analysis, not an
/// error.
pub fn analyze_query(dictionary: &CompiledDictionary, query: &str) -> QueryAnalysis {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return QueryAnalysis::default();
    }

    let normalized_description = dictionary.normalize_description(trimmed);
    let raw_tokens = dictionary.tokenize(&normalized_description);
    let expanded_tokens = dictionary.expand_tokens(&raw_tokens);
    let dimensions = dictionary.extractor.extract(trimmed);

    QueryAnalysis {
        normalized_part_number: dictionary.normalize_part_number(trimmed),
        normalized_description,
        raw_tokens,
        expanded_tokens,
        dimensions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_query() {
        let dict = CompiledDictionary::builtin();
        let analysis = analyze_query(&dict, "ss bolt 3/8");

        assert_eq!(analysis.normalized_description, "SS BOLT 3/8");
        assert_eq!(analysis.raw_tokens, vec!["SS", "BOLT", "3", "8"]);
        assert!(analysis.expanded_tokens.contains("SS"));
        assert!(analysis.expanded_tokens.contains("STAINLESS"));
        assert!(analysis.dimensions.contains("3/8IN"));
        assert!(analysis.dimensions.contains(".375IN"));
    }

    #[test]
    fn test_blank_query_is_empty_analysis() {
        let dict = CompiledDictionary::builtin();
        assert!(analyze_query(&dict, "").is_empty());
        assert!(analyze_query(&dict, "   \t ").is_empty());
    }

    #[test]
    fn test_stopwords_removed_from_query() {
        let dict = CompiledDictionary::builtin();
        let analysis = analyze_query(&dict, "bolt for the flange");
        assert_eq!(analysis.raw_tokens, vec!["BOLT", "FLANGE"]);
    }
}
