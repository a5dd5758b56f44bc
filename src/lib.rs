//! Partscout Core - dictionary-driven parts catalog search
//!
//! Ranks inventory catalog items against free-text queries written in
//! industry shorthand (abbreviations, material grades, finishes, thread
//! callouts, dimensional notations), driven by a configurable synonym
//! dictionary instead of a full-text search service.

pub mod dictionary;
pub mod dimension;
pub mod engine;
pub mod equivalence;
pub mod indexer;
pub mod matcher;
pub mod query;
pub mod text;

pub use dictionary::{CompiledDictionary, DictionaryDocument, DictionaryError};
pub use dimension::{DimensionExtractor, TemplateSpec};
pub use engine::SearchEngine;
pub use equivalence::EquivalenceGraph;
pub use indexer::{index_catalog, load_catalog, CatalogItem, IndexStats, IndexedItem};
pub use matcher::{match_items, SearchHit};
pub use query::{analyze_query, QueryAnalysis};
