//! Search engine facade
//!
//! Ties a compiled dictionary and an indexed catalog together behind one
//! value. The engine is the unit of replacement: a dictionary or catalog
//! change builds a whole new engine and the caller swaps it in, so readers
//! on other threads always observe one consistent version.

use std::sync::Arc;

use crate::dictionary::CompiledDictionary;
use crate::indexer::{index_catalog, CatalogItem, IndexStats, IndexedItem};
use crate::matcher::{match_items, SearchHit};
use crate::query::{analyze_query, QueryAnalysis};

pub struct SearchEngine {
    dictionary: Arc<CompiledDictionary>,
    items: Vec<IndexedItem>,
    stats: IndexStats,
}

impl SearchEngine {
    /// Index a catalog snapshot against a dictionary.
    pub fn build(dictionary: Arc<CompiledDictionary>, catalog: &[CatalogItem]) -> Self {
        let items = index_catalog(&dictionary, catalog);
        let stats = IndexStats::collect(&items);
        tracing::info!(
            "Search engine ready: {} items, dictionary '{}'",
            items.len(),
            dictionary.version
        );
        Self {
            dictionary,
            items,
            stats,
        }
    }

    /// Rank the catalog against a query. Non-matches are filtered; ties are
    /// ordered by ascending part number. Callers cap the hit count.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let analysis = analyze_query(&self.dictionary, query);
        match_items(&analysis, &self.items)
    }

    /// Expose the query-side pipeline for inspection.
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        analyze_query(&self.dictionary, query)
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn dictionary(&self) -> &Arc<CompiledDictionary> {
        &self.dictionary
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
