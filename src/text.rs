//! Text normalization and tokenization
//!
//! Pure helpers driven entirely by the dictionary's rule sets. Both
//! normalizers are idempotent under a fixed rule set, so re-normalizing
//! already-indexed text is always safe.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rules for normalizing free-text descriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionRules {
    /// Ordered (from, to) replacements applied before stripping
    #[serde(default)]
    pub replacements: Vec<(String, String)>,
    /// Punctuation kept in addition to alphanumerics and whitespace
    #[serde(default)]
    pub allowed_punctuation: String,
    #[serde(default = "default_true")]
    pub collapse_whitespace: bool,
    #[serde(default = "default_true")]
    pub uppercase: bool,
}

impl Default for DescriptionRules {
    fn default() -> Self {
        Self {
            replacements: Vec::new(),
            allowed_punctuation: String::new(),
            collapse_whitespace: true,
            uppercase: true,
        }
    }
}

/// Rules for normalizing part numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartNumberRules {
    /// Characters deleted outright
    #[serde(default)]
    pub strip: String,
    /// Characters collapsed (runs included) into a single separator
    #[serde(default)]
    pub collapse: String,
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default = "default_true")]
    pub strip_leading_zeros: bool,
    #[serde(default = "default_true")]
    pub uppercase: bool,
}

impl Default for PartNumberRules {
    fn default() -> Self {
        Self {
            strip: String::new(),
            collapse: String::new(),
            separator: default_separator(),
            strip_leading_zeros: true,
            uppercase: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_separator() -> char {
    '-'
}

/// Normalize a description: ordered replacements, strip disallowed
/// characters, collapse whitespace, upper-case, trim.
pub fn normalize_description(text: &str, rules: &DescriptionRules) -> String {
    let mut replaced = text.to_string();
    for (from, to) in &rules.replacements {
        if !from.is_empty() {
            replaced = replaced.replace(from.as_str(), to);
        }
    }

    let mut kept = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c.is_alphanumeric() || c.is_whitespace() || rules.allowed_punctuation.contains(c) {
            kept.push(c);
        }
    }

    let mut result = if rules.collapse_whitespace {
        kept.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        kept
    };
    if rules.uppercase {
        result = result.to_uppercase();
    }
    result.trim().to_string()
}

/// Normalize a part number: delete strip characters, collapse collapse
/// characters (and existing separators) to a single separator, strip leading
/// zeros from digit runs, upper-case, trim.
pub fn normalize_part_number(text: &str, rules: &PartNumberRules) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut pending_separator = false;
    for c in text.chars() {
        if rules.strip.contains(c) {
            continue;
        }
        // The separator itself collapses too, which keeps the function
        // idempotent when its output is fed back in.
        if rules.collapse.contains(c) || c == rules.separator {
            pending_separator = true;
            continue;
        }
        if pending_separator {
            if !collapsed.is_empty() {
                collapsed.push(rules.separator);
            }
            pending_separator = false;
        }
        collapsed.push(c);
    }

    let stripped = if rules.strip_leading_zeros {
        strip_leading_zeros(&collapsed)
    } else {
        collapsed
    };

    let result = if rules.uppercase {
        stripped.to_uppercase()
    } else {
        stripped
    };
    result.trim().to_string()
}

/// Drop leading zeros from each digit run ("A-007" becomes "A-7").
/// A run of only zeros is left alone so "000" stays distinguishable.
fn strip_leading_zeros(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        let at_run_start = i == 0 || !chars[i - 1].is_ascii_digit();
        if chars[i] == '0' && at_run_start {
            let mut j = i;
            while j < chars.len() && chars[j] == '0' {
                j += 1;
            }
            if j < chars.len() && chars[j].is_ascii_digit() {
                i = j;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Split normalized text on non-alphanumeric runs, drop empties and
/// stopwords, upper-case, preserve order. Empty input yields an empty vec.
pub fn tokenize(text: &str, stopwords: &HashSet<String>) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.to_uppercase())
        .filter(|token| !stopwords.contains(token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc_rules() -> DescriptionRules {
        DescriptionRules {
            replacements: vec![("×".to_string(), "X".to_string())],
            allowed_punctuation: "-./\"".to_string(),
            collapse_whitespace: true,
            uppercase: true,
        }
    }

    fn pn_rules() -> PartNumberRules {
        PartNumberRules {
            strip: " ".to_string(),
            collapse: "./".to_string(),
            separator: '-',
            strip_leading_zeros: true,
            uppercase: true,
        }
    }

    #[test]
    fn test_normalize_description() {
        let rules = desc_rules();
        assert_eq!(
            normalize_description("  1/2\" hex bolt,  zinc ", &rules),
            "1/2\" HEX BOLT ZINC"
        );
        assert_eq!(normalize_description("3×8 plate", &rules), "3X8 PLATE");
        assert_eq!(normalize_description("", &rules), "");
    }

    #[test]
    fn test_normalize_description_idempotent() {
        let rules = desc_rules();
        for input in ["  Stainless, Steel!! bolt  ", "1/2\" × 3\" BAR", "", "plain"] {
            let once = normalize_description(input, &rules);
            assert_eq!(normalize_description(&once, &rules), once);
        }
    }

    #[test]
    fn test_normalize_part_number() {
        let rules = pn_rules();
        assert_eq!(normalize_part_number("100.ss", &rules), "100-SS");
        assert_eq!(normalize_part_number("A//B..C", &rules), "A-B-C");
        assert_eq!(normalize_part_number(" 12 34 ", &rules), "1234");
        assert_eq!(normalize_part_number("/A-100/", &rules), "A-100");
    }

    #[test]
    fn test_normalize_part_number_leading_zeros() {
        let rules = pn_rules();
        assert_eq!(normalize_part_number("A-007", &rules), "A-7");
        assert_eq!(normalize_part_number("0012-B", &rules), "12-B");
        assert_eq!(normalize_part_number("100", &rules), "100");
        assert_eq!(normalize_part_number("000", &rules), "000");
    }

    #[test]
    fn test_normalize_part_number_idempotent() {
        let rules = pn_rules();
        for input in ["100.ss", "A-007", "  x/y/z  ", ""] {
            let once = normalize_part_number(input, &rules);
            assert_eq!(normalize_part_number(&once, &rules), once);
        }
    }

    #[test]
    fn test_tokenize() {
        let stopwords: HashSet<String> = ["THE".to_string(), "FOR".to_string()].into();
        assert_eq!(
            tokenize("bolt for the 1/2\" flange", &stopwords),
            vec!["BOLT", "1", "2", "FLANGE"]
        );
        assert!(tokenize("", &stopwords).is_empty());
        assert!(tokenize("   ", &stopwords).is_empty());
    }
}
