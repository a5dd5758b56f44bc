//! Dictionary model: loading, validation, compilation
//!
//! The dictionary arrives as a JSON document and is compiled once into an
//! immutable [`CompiledDictionary`]: synonym tables become the equivalence
//! graph, pattern templates become the dimension extractor, rule sets are
//! validated up front. Schema problems are fatal here, before any query can
//! be served; individual bad entries only degrade with a warning.

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::dimension::{DimensionExtractor, TemplateSpec};
use crate::equivalence::EquivalenceGraph;
use crate::text::{self, DescriptionRules, PartNumberRules};

/// Synonym tables every dictionary must define.
pub const REQUIRED_TABLES: &[&str] = &["abbreviations", "materials", "finishes", "threads", "units"];

/// Fastener/industrial dictionary shipped with the binary.
const BUILTIN_DICTIONARY: &str = include_str!("dictionary.json");

/// Fatal dictionary-load failures. Any of these prevents the engine from
/// becoming ready.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("invalid dictionary document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required synonym table '{0}'")]
    MissingTable(&'static str),

    #[error("template '{template}': pattern `{pattern}` failed to compile: {source}")]
    BadPattern {
        template: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("template '{template}': output references unknown capture slot '{slot}'")]
    UnknownSlot { template: String, slot: String },

    #[error("template '{template}' must define at least one pattern and one output")]
    EmptyTemplate { template: String },
}

/// One category-inference rule: the label applied when any keyword occurs in
/// a normalized description. Rules apply in document order, first match wins.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Raw dictionary document as deserialized from JSON. Synonym values stay
/// loosely typed so one malformed entry degrades softly instead of failing
/// the whole document.
#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryDocument {
    #[serde(default = "default_version")]
    pub version: String,
    pub synonyms: HashMap<String, HashMap<String, Value>>,
    #[serde(default)]
    pub stopwords: Vec<String>,
    #[serde(default)]
    pub description_rules: DescriptionRules,
    #[serde(default)]
    pub part_number_rules: PartNumberRules,
    #[serde(default)]
    pub dimension_templates: Vec<TemplateSpec>,
    #[serde(default)]
    pub categories: Vec<CategoryRule>,
}

fn default_version() -> String {
    "unversioned".to_string()
}

/// Validated, immutable dictionary. Built once; a new dictionary version is a
/// whole new value swapped in behind an `Arc`, never a patch of this one.
#[derive(Debug)]
pub struct CompiledDictionary {
    pub version: String,
    pub description_rules: DescriptionRules,
    pub part_number_rules: PartNumberRules,
    pub stopwords: HashSet<String>,
    pub graph: EquivalenceGraph,
    pub extractor: DimensionExtractor,
    pub categories: Vec<CategoryRule>,
    table_count: usize,
}

impl CompiledDictionary {
    /// Validate and compile a raw document.
    pub fn compile(doc: DictionaryDocument) -> Result<Self, DictionaryError> {
        for &required in REQUIRED_TABLES {
            if !doc.synonyms.contains_key(required) {
                return Err(DictionaryError::MissingTable(required));
            }
        }

        let mut graph = EquivalenceGraph::new();
        for (table, entries) in &doc.synonyms {
            for (key, value) in entries {
                graph.add_entry(table, key, value);
            }
        }

        let extractor = DimensionExtractor::compile(&doc.dimension_templates)?;

        let stopwords: HashSet<String> =
            doc.stopwords.iter().map(|s| s.to_uppercase()).collect();

        let categories = doc
            .categories
            .into_iter()
            .filter_map(|rule| {
                let keywords: Vec<String> = rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_uppercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                if rule.label.trim().is_empty() || keywords.is_empty() {
                    tracing::warn!("Skipping category rule '{}' with no usable keywords", rule.label);
                    return None;
                }
                Some(CategoryRule {
                    label: rule.label,
                    keywords,
                })
            })
            .collect();

        let compiled = Self {
            version: doc.version,
            description_rules: doc.description_rules,
            part_number_rules: doc.part_number_rules,
            stopwords,
            graph,
            extractor,
            categories,
            table_count: doc.synonyms.len(),
        };

        tracing::info!(
            "Compiled dictionary '{}': {} tables, {} equivalent tokens, {} templates",
            compiled.version,
            compiled.table_count,
            compiled.graph.token_count(),
            compiled.extractor.template_count()
        );

        Ok(compiled)
    }

    /// Parse and compile a JSON document.
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let doc: DictionaryDocument = serde_json::from_str(json)?;
        Self::compile(doc)
    }

    /// Load and compile a dictionary file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary at {:?}", path))?;
        let compiled = Self::from_json(&raw)
            .with_context(|| format!("Dictionary at {:?} failed validation", path))?;
        Ok(compiled)
    }

    /// The dictionary embedded in the binary.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_DICTIONARY).expect("builtin dictionary is valid")
    }

    pub fn normalize_description(&self, text: &str) -> String {
        text::normalize_description(text, &self.description_rules)
    }

    pub fn normalize_part_number(&self, text: &str) -> String {
        text::normalize_part_number(text, &self.part_number_rules)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text::tokenize(text, &self.stopwords)
    }

    /// Expand tokens one hop through the equivalence graph: each token maps
    /// to itself plus its direct neighbors.
    pub fn expand_tokens(&self, tokens: &[String]) -> HashSet<String> {
        let mut expanded = HashSet::with_capacity(tokens.len() * 2);
        for token in tokens {
            if let Some(neighbors) = self.graph.neighbors(token) {
                expanded.extend(neighbors.iter().cloned());
            }
            expanded.insert(token.clone());
        }
        expanded
    }

    pub fn table_count(&self) -> usize {
        self.table_count
    }
}
