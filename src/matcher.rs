//! Matching and scoring
//!
//! Compares a query analysis against every indexed item, weights the match
//! evidence into an integer relevance score, drops non-matches, and orders
//! the rest deterministically. A pure map-filter-sort pipeline with no state
//! between calls.

use rayon::prelude::*;
use serde::Serialize;

use crate::indexer::{CatalogItem, IndexedItem};
use crate::query::QueryAnalysis;

pub const TOKEN_WEIGHT: u32 = 2;
pub const DIMENSION_WEIGHT: u32 = 3;
pub const PART_NUMBER_WEIGHT: u32 = 5;
pub const DESCRIPTION_WEIGHT: u32 = 2;

/// A ranked match for one catalog item.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub item: CatalogItem,
    pub score: u32,
    pub matched_tokens: Vec<String>,
    pub matched_dimensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_category: Option<String>,
    pub part_number_matched: bool,
    pub description_matched: bool,
}

/// Score one item against the query. Returns None when nothing matched.
pub fn score_item(query: &QueryAnalysis, indexed: &IndexedItem) -> Option<SearchHit> {
    let mut matched_tokens: Vec<String> = indexed
        .expanded_tokens
        .intersection(&query.expanded_tokens)
        .cloned()
        .collect();
    matched_tokens.sort();

    let mut matched_dimensions: Vec<String> = indexed
        .dimensions
        .intersection(&query.dimensions)
        .cloned()
        .collect();
    matched_dimensions.sort();

    let part_number_matched = !query.normalized_part_number.is_empty()
        && indexed
            .normalized_part_number
            .contains(&query.normalized_part_number);

    let description_matched =
        description_contains(&query.normalized_description, &indexed.normalized_description);

    let score = TOKEN_WEIGHT * matched_tokens.len() as u32
        + DIMENSION_WEIGHT * matched_dimensions.len() as u32
        + if part_number_matched { PART_NUMBER_WEIGHT } else { 0 }
        + if description_matched { DESCRIPTION_WEIGHT } else { 0 };

    if score == 0 {
        return None;
    }

    let matched_category = indexed.category_hint.as_ref().and_then(|hint| {
        let upper = hint.to_uppercase();
        if !upper.is_empty()
            && (query.expanded_tokens.contains(&upper)
                || query.normalized_description.contains(&upper))
        {
            Some(hint.clone())
        } else {
            None
        }
    });

    Some(SearchHit {
        item: indexed.item.clone(),
        score,
        matched_tokens,
        matched_dimensions,
        matched_category,
        part_number_matched,
        description_matched,
    })
}

/// The query's normalized form matches a description when it is longer than
/// two characters and every one of its words occurs somewhere in the item's
/// normalized description. Whole-form containment is the one-word case.
fn description_contains(query_form: &str, item_description: &str) -> bool {
    if query_form.len() <= 2 || item_description.is_empty() {
        return false;
    }
    query_form
        .split_whitespace()
        .all(|word| item_description.contains(word))
}

/// Score every item, drop non-matches, and sort by descending score with
/// ascending raw part number as the tie-break. Total and deterministic.
pub fn match_items(query: &QueryAnalysis, items: &[IndexedItem]) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = items
        .par_iter()
        .filter_map(|indexed| score_item(query, indexed))
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.item.part_number.cmp(&b.item.part_number))
    });
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::CompiledDictionary;
    use crate::indexer::index_item;
    use crate::query::analyze_query;

    fn indexed(dict: &CompiledDictionary, part_number: &str, description: &str) -> IndexedItem {
        index_item(
            dict,
            &CatalogItem {
                part_number: part_number.to_string(),
                description: description.to_string(),
                category: None,
            },
        )
    }

    #[test]
    fn test_score_weights() {
        let dict = CompiledDictionary::builtin();
        let item = indexed(&dict, "100-SS", "STAINLESS STEEL BOLT");
        let query = analyze_query(&dict, "ss bolt");
        let hit = score_item(&query, &item).unwrap();

        // Matched tokens: SS, STAINLESS, BOLT plus SS's other table mates
        // present in the item text (STL via STN STL).
        assert!(hit.matched_tokens.contains(&"SS".to_string()));
        assert!(hit.matched_tokens.contains(&"STAINLESS".to_string()));
        assert!(hit.description_matched);
        assert!(!hit.part_number_matched);
        let expected = TOKEN_WEIGHT * hit.matched_tokens.len() as u32 + DESCRIPTION_WEIGHT;
        assert_eq!(hit.score, expected);
    }

    #[test]
    fn test_part_number_substring_match() {
        let dict = CompiledDictionary::builtin();
        let item = indexed(&dict, "100-SS", "STAINLESS STEEL BOLT");

        let query = analyze_query(&dict, "100");
        let hit = score_item(&query, &item).unwrap();
        assert!(hit.part_number_matched);
        assert!(hit.score >= PART_NUMBER_WEIGHT);
    }

    #[test]
    fn test_no_evidence_is_no_hit() {
        let dict = CompiledDictionary::builtin();
        let item = indexed(&dict, "100-SS", "STAINLESS STEEL BOLT");
        let query = analyze_query(&dict, "rubber grommet");
        assert!(score_item(&query, &item).is_none());
    }

    #[test]
    fn test_short_description_form_never_matches() {
        let dict = CompiledDictionary::builtin();
        let item = indexed(&dict, "AB-1", "AB BRACKET");
        let query = analyze_query(&dict, "ab");
        if let Some(hit) = score_item(&query, &item) {
            assert!(!hit.description_matched);
        }
    }

    #[test]
    fn test_score_monotonicity() {
        let dict = CompiledDictionary::builtin();
        // Same query; each item adds one more piece of evidence.
        let query = analyze_query(&dict, "ss bolt 3/8");

        let base = score_item(&query, &indexed(&dict, "X-1", "SS WIDGET")).unwrap();
        let more_tokens = score_item(&query, &indexed(&dict, "X-2", "SS BOLT WIDGET")).unwrap();
        let with_dimension =
            score_item(&query, &indexed(&dict, "X-3", "SS BOLT WIDGET 3/8")).unwrap();

        assert!(more_tokens.score > base.score);
        assert!(with_dimension.score > more_tokens.score);
    }

    #[test]
    fn test_tie_break_is_ascending_part_number() {
        let dict = CompiledDictionary::builtin();
        let items = vec![
            indexed(&dict, "B-100", "hex bolt"),
            indexed(&dict, "A-100", "hex bolt"),
        ];
        let query = analyze_query(&dict, "hex bolt");
        let hits = match_items(&query, &items);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits[0].item.part_number, "A-100");
        assert_eq!(hits[1].item.part_number, "B-100");
    }

    #[test]
    fn test_matched_category_requires_query_evidence() {
        let dict = CompiledDictionary::builtin();
        let item = indexed(&dict, "V-20", "bronze gate valve");

        let with_evidence = analyze_query(&dict, "valve bronze");
        let hit = score_item(&with_evidence, &item).unwrap();
        assert_eq!(hit.matched_category.as_deref(), Some("VALVE"));

        let without_evidence = analyze_query(&dict, "bronze");
        let hit = score_item(&without_evidence, &item).unwrap();
        assert!(hit.matched_category.is_none());
    }
}
