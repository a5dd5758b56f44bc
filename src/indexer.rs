//! Catalog indexing
//!
//! Precomputes each catalog item's search representation (expanded token
//! set, dimension set, normalized forms, category hint) so per-query work is
//! amortized across the catalog's lifetime. Rebuilding is a pure function of
//! (catalog snapshot, dictionary); the index is replaced wholesale on any
//! change, never patched.

use anyhow::Context;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::dictionary::{CategoryRule, CompiledDictionary};

/// One item of the catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub part_number: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A catalog item's precomputed, query-independent search representation.
#[derive(Debug, Clone)]
pub struct IndexedItem {
    pub item: CatalogItem,
    pub expanded_tokens: HashSet<String>,
    pub dimensions: HashSet<String>,
    pub normalized_part_number: String,
    pub normalized_description: String,
    pub category_hint: Option<String>,
}

/// Index-build statistics.
#[derive(Debug, Default, Clone, Serialize)]
pub struct IndexStats {
    pub items: usize,
    pub empty_descriptions: usize,
    pub distinct_tokens: usize,
    pub distinct_dimensions: usize,
    pub categorized: usize,
}

impl IndexStats {
    pub fn collect(items: &[IndexedItem]) -> Self {
        let mut tokens: HashSet<&str> = HashSet::new();
        let mut dimensions: HashSet<&str> = HashSet::new();
        let mut stats = Self {
            items: items.len(),
            ..Self::default()
        };
        for indexed in items {
            tokens.extend(indexed.expanded_tokens.iter().map(String::as_str));
            dimensions.extend(indexed.dimensions.iter().map(String::as_str));
            if indexed.item.description.trim().is_empty() {
                stats.empty_descriptions += 1;
            }
            if indexed.category_hint.is_some() {
                stats.categorized += 1;
            }
        }
        stats.distinct_tokens = tokens.len();
        stats.distinct_dimensions = dimensions.len();
        stats
    }
}

/// Derive one item's search representation.
pub fn index_item(dictionary: &CompiledDictionary, item: &CatalogItem) -> IndexedItem {
    let blob = format!("{} {}", item.part_number, item.description);
    let tokens = dictionary.tokenize(&dictionary.normalize_description(&blob));
    let expanded_tokens = dictionary.expand_tokens(&tokens);
    let dimensions = dictionary.extractor.extract(&blob);
    let normalized_description = dictionary.normalize_description(&item.description);

    let category_hint = item
        .category
        .clone()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| infer_category(&dictionary.categories, &normalized_description));

    IndexedItem {
        normalized_part_number: dictionary.normalize_part_number(&item.part_number),
        normalized_description,
        expanded_tokens,
        dimensions,
        category_hint,
        item: item.clone(),
    }
}

/// Index a whole catalog snapshot. Items are independent, so derivation fans
/// out across the rayon pool; output order follows the snapshot.
pub fn index_catalog(dictionary: &CompiledDictionary, items: &[CatalogItem]) -> Vec<IndexedItem> {
    let indexed: Vec<IndexedItem> = items
        .par_iter()
        .map(|item| {
            if item.description.trim().is_empty() {
                tracing::warn!("Item '{}' has an empty description", item.part_number);
            }
            index_item(dictionary, item)
        })
        .collect();

    tracing::info!("Indexed {} catalog items", indexed.len());
    indexed
}

/// First rule whose keyword occurs in the normalized description wins.
fn infer_category(rules: &[CategoryRule], normalized_description: &str) -> Option<String> {
    if normalized_description.is_empty() {
        return None;
    }
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| normalized_description.contains(keyword))
        })
        .map(|rule| rule.label.clone())
}

/// Load a catalog snapshot from a JSON file.
pub fn load_catalog(path: &Path) -> anyhow::Result<Vec<CatalogItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog at {:?}", path))?;
    let items: Vec<CatalogItem> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse catalog at {:?}", path))?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dictionary() -> CompiledDictionary {
        CompiledDictionary::builtin()
    }

    fn item(part_number: &str, description: &str) -> CatalogItem {
        CatalogItem {
            part_number: part_number.to_string(),
            description: description.to_string(),
            category: None,
        }
    }

    #[test]
    fn test_index_item_expands_tokens() {
        let dict = dictionary();
        let indexed = index_item(&dict, &item("100-SS", "STAINLESS STEEL BOLT"));

        assert!(indexed.expanded_tokens.contains("SS"));
        assert!(indexed.expanded_tokens.contains("STAINLESS"));
        assert!(indexed.expanded_tokens.contains("BOLT"));
        assert!(indexed.expanded_tokens.contains("100"));
        assert_eq!(indexed.normalized_part_number, "100-SS");
        assert_eq!(indexed.normalized_description, "STAINLESS STEEL BOLT");
    }

    #[test]
    fn test_index_item_extracts_dimensions() {
        let dict = dictionary();
        let indexed = index_item(&dict, &item("HB-375", "3/8-16 hex bolt 1.5\" long"));

        assert!(indexed.dimensions.contains("3/8-16"));
        assert!(indexed.dimensions.contains(".375-16"));
        assert!(indexed.dimensions.contains("1.5IN"));
    }

    #[test]
    fn test_explicit_category_beats_inference() {
        let dict = dictionary();
        let mut explicit = item("V-1", "gate valve bronze");
        explicit.category = Some("Plumbing".to_string());
        assert_eq!(
            index_item(&dict, &explicit).category_hint.as_deref(),
            Some("Plumbing")
        );

        let inferred = index_item(&dict, &item("V-1", "gate valve bronze"));
        assert_eq!(inferred.category_hint.as_deref(), Some("VALVE"));
    }

    #[test]
    fn test_category_rules_first_match_wins() {
        let dict = dictionary();
        // Both FASTENER (BOLT) and STOCK (PLATE) keywords occur; FASTENER is
        // listed first.
        let indexed = index_item(&dict, &item("X", "bolt for plate"));
        assert_eq!(indexed.category_hint.as_deref(), Some("FASTENER"));
    }

    #[test]
    fn test_no_category_match_leaves_hint_unset() {
        let dict = dictionary();
        let indexed = index_item(&dict, &item("Z-9", "mystery widget"));
        assert!(indexed.category_hint.is_none());

        let empty = index_item(&dict, &item("Z-10", ""));
        assert!(empty.category_hint.is_none());
    }

    #[test]
    fn test_index_catalog_preserves_order() {
        let dict = dictionary();
        let items = vec![item("B-2", "hex nut"), item("A-1", "hex bolt")];
        let indexed = index_catalog(&dict, &items);
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed[0].item.part_number, "B-2");
        assert_eq!(indexed[1].item.part_number, "A-1");
    }

    #[test]
    fn test_stats() {
        let dict = dictionary();
        let items = vec![item("A-1", "hex bolt"), item("B-2", "")];
        let indexed = index_catalog(&dict, &items);
        let stats = IndexStats::collect(&indexed);
        assert_eq!(stats.items, 2);
        assert_eq!(stats.empty_descriptions, 1);
        assert_eq!(stats.categorized, 1);
        assert!(stats.distinct_tokens > 0);
    }

    #[test]
    fn test_load_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                { "part_number": "A-1", "description": "hex bolt" },
                { "part_number": "B-2", "description": "flat washer", "category": "Hardware" }
            ]"#,
        )
        .unwrap();
        let items = load_catalog(file.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].category.as_deref(), Some("Hardware"));

        assert!(load_catalog(Path::new("/nonexistent/catalog.json")).is_err());
    }
}
