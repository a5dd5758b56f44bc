//! Token equivalence graph
//!
//! Derived from the dictionary's synonym tables: every table entry
//! contributes a clique over the canonical tokens of its key and values.
//! Adjacency is symmetric, irreflexive, and strictly one-hop. Entries are
//! never transitively closed into each other, so two tokens that only share
//! a neighbor through different entries stay unconnected.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Symmetric adjacency over canonical (upper-cased, alphanumeric) tokens.
#[derive(Debug, Default, Clone)]
pub struct EquivalenceGraph {
    edges: HashMap<String, HashSet<String>>,
}

impl EquivalenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one synonym-table entry. Tokens are derived from the key and from
    /// every string value; all pairs become bidirectional edges. Malformed
    /// entries (empty key, non-string value) are skipped with a warning.
    pub fn add_entry(&mut self, table: &str, key: &str, value: &Value) {
        if key.trim().is_empty() {
            tracing::warn!("Skipping synonym entry with empty key in table '{}'", table);
            return;
        }

        let mut tokens: HashSet<String> = canonical_tokens(key).collect();
        match value {
            Value::String(s) => tokens.extend(canonical_tokens(s)),
            Value::Array(values) => {
                for v in values {
                    match v {
                        Value::String(s) => tokens.extend(canonical_tokens(s)),
                        _ => tracing::warn!(
                            "Skipping non-string synonym value for '{}' in table '{}'",
                            key,
                            table
                        ),
                    }
                }
            }
            _ => {
                tracing::warn!(
                    "Skipping synonym entry '{}' in table '{}': value is not a string or list",
                    key,
                    table
                );
                return;
            }
        }

        if tokens.len() < 2 {
            return;
        }

        let tokens: Vec<String> = tokens.into_iter().collect();
        for a in &tokens {
            for b in &tokens {
                if a != b {
                    self.edges
                        .entry(a.clone())
                        .or_default()
                        .insert(b.clone());
                }
            }
        }
    }

    /// Direct neighbors of a canonical token, if it appears in any entry.
    pub fn neighbors(&self, token: &str) -> Option<&HashSet<String>> {
        self.edges.get(token)
    }

    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        self.edges
            .get(a)
            .map_or(false, |neighbors| neighbors.contains(b))
    }

    /// Number of tokens with at least one edge.
    pub fn token_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|n| n.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Canonical tokens of a dictionary string: split on non-alphanumeric
/// boundaries, upper-cased, empties dropped.
pub(crate) fn canonical_tokens(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.to_uppercase())
}
