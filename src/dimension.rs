//! Dimensional pattern recognition
//!
//! Compiles the dictionary's pattern templates into regexes plus pre-parsed
//! render plans, then extracts canonical dimension tokens from raw text.
//! Capture slots are resolved to group indices at load time; a typo in an
//! output template is a load failure, not a silent per-query miss.

use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dictionary::DictionaryError;

/// One pattern template from the dictionary document: named patterns with
/// capture slots plus the canonical output templates rendered from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    pub patterns: Vec<String>,
    pub outputs: Vec<String>,
}

/// Reserved output slot that renders the decimal value of a fractional
/// capture set (`whole`?, `num`, `den`) or a decimal capture set
/// (`int`?, `frac`). Both spellings of one measurement collide on the same
/// canonical token this way.
const DECIMAL_SLOT: &str = "decimal";

/// Maximum fraction digits in a rendered decimal token.
const DECIMAL_PRECISION: usize = 4;

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Group(usize),
    Decimal,
}

#[derive(Debug, Clone, Copy)]
enum DecimalSource {
    Fraction {
        whole: Option<usize>,
        num: usize,
        den: usize,
    },
    Decimal {
        int: Option<usize>,
        frac: usize,
    },
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    regex: Regex,
    plans: Vec<Vec<Segment>>,
    decimal: Option<DecimalSource>,
}

#[derive(Debug, Clone)]
struct CompiledTemplate {
    name: String,
    patterns: Vec<CompiledPattern>,
}

/// Extractor holding every compiled template, in document order.
#[derive(Debug, Clone, Default)]
pub struct DimensionExtractor {
    templates: Vec<CompiledTemplate>,
}

impl DimensionExtractor {
    /// Compile all templates. Any uncompilable pattern or unknown output
    /// slot is fatal.
    pub fn compile(specs: &[TemplateSpec]) -> Result<Self, DictionaryError> {
        let mut templates = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.patterns.is_empty() || spec.outputs.is_empty() {
                return Err(DictionaryError::EmptyTemplate {
                    template: spec.name.clone(),
                });
            }

            let mut patterns = Vec::with_capacity(spec.patterns.len());
            for pattern in &spec.patterns {
                // Templates scan raw, un-normalized text, so matching must
                // not depend on the casing an operator happened to type.
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| DictionaryError::BadPattern {
                        template: spec.name.clone(),
                        pattern: pattern.clone(),
                        source,
                    })?;

                let decimal = decimal_source(&regex);
                let plans = spec
                    .outputs
                    .iter()
                    .map(|output| parse_plan(&spec.name, output, &regex, decimal.is_some()))
                    .collect::<Result<Vec<_>, _>>()?;

                patterns.push(CompiledPattern {
                    regex,
                    plans,
                    decimal,
                });
            }

            templates.push(CompiledTemplate {
                name: spec.name.clone(),
                patterns,
            });
        }
        Ok(Self { templates })
    }

    /// Scan raw text with every template and collect canonical dimension
    /// tokens. Overlapping matches across templates are all retained.
    pub fn extract(&self, text: &str) -> HashSet<String> {
        let mut out = HashSet::new();
        for template in &self.templates {
            for pattern in &template.patterns {
                for caps in pattern.regex.captures_iter(text) {
                    for plan in &pattern.plans {
                        if let Some(token) = render(plan, &caps, pattern.decimal) {
                            out.insert(token);
                        }
                    }
                }
            }
        }
        out
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name.as_str())
    }
}

/// Resolve a capture group name to its index.
fn group_index(regex: &Regex, name: &str) -> Option<usize> {
    regex
        .capture_names()
        .position(|n| n == Some(name))
}

/// Work out how this pattern can render the derived decimal slot, if at all.
fn decimal_source(regex: &Regex) -> Option<DecimalSource> {
    if let (Some(num), Some(den)) = (group_index(regex, "num"), group_index(regex, "den")) {
        return Some(DecimalSource::Fraction {
            whole: group_index(regex, "whole"),
            num,
            den,
        });
    }
    group_index(regex, "frac").map(|frac| DecimalSource::Decimal {
        int: group_index(regex, "int"),
        frac,
    })
}

/// Pre-parse an output template into literal and slot segments, resolving
/// slot names against this pattern's capture groups.
fn parse_plan(
    template: &str,
    output: &str,
    regex: &Regex,
    has_decimal: bool,
) -> Result<Vec<Segment>, DictionaryError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = output.chars();

    while let Some(c) = chars.next() {
        if c != '{' {
            literal.push(c);
            continue;
        }
        let mut slot = String::new();
        let mut closed = false;
        for s in chars.by_ref() {
            if s == '}' {
                closed = true;
                break;
            }
            slot.push(s);
        }
        if !closed {
            // Unterminated brace is taken literally.
            literal.push('{');
            literal.push_str(&slot);
            continue;
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        if slot == DECIMAL_SLOT {
            if !has_decimal {
                return Err(DictionaryError::UnknownSlot {
                    template: template.to_string(),
                    slot,
                });
            }
            segments.push(Segment::Decimal);
        } else {
            let index =
                group_index(regex, &slot).ok_or_else(|| DictionaryError::UnknownSlot {
                    template: template.to_string(),
                    slot: slot.clone(),
                })?;
            segments.push(Segment::Group(index));
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Render one plan against one match. Returns None when the token would be
/// empty or the decimal value cannot be computed (zero denominator).
fn render(plan: &[Segment], caps: &Captures<'_>, decimal: Option<DecimalSource>) -> Option<String> {
    let mut raw = String::new();
    for segment in plan {
        match segment {
            Segment::Literal(text) => raw.push_str(text),
            Segment::Group(index) => {
                if let Some(m) = caps.get(*index) {
                    raw.push_str(m.as_str());
                }
            }
            Segment::Decimal => {
                let value = decimal_value(decimal?, caps)?;
                raw.push_str(&format_decimal(value));
            }
        }
    }

    let token = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn decimal_value(source: DecimalSource, caps: &Captures<'_>) -> Option<f64> {
    match source {
        DecimalSource::Fraction { whole, num, den } => {
            let num: f64 = caps.get(num)?.as_str().parse().ok()?;
            let den: f64 = caps.get(den)?.as_str().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            let whole: f64 = whole
                .and_then(|i| caps.get(i))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0);
            Some(whole + num / den)
        }
        DecimalSource::Decimal { int, frac } => {
            let int = int
                .and_then(|i| caps.get(i))
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("0");
            let frac = caps.get(frac)?.as_str();
            format!("{}.{}", int, frac).parse().ok()
        }
    }
}

/// Canonical decimal rendering: trailing zeros trimmed, a zero integer part
/// rendered as a bare leading dot, so "3/8" and ".375" agree.
fn format_decimal(value: f64) -> String {
    let mut s = format!("{:.*}", DECIMAL_PRECISION, value);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if let Some(rest) = s.strip_prefix("0.") {
        s = format!(".{}", rest);
    }
    s
}
