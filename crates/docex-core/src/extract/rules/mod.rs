//! Ordered pattern rules shared by the field extractors.
//!
//! A field is described as a [`Cascade`]: an ordered list of [`Rule`]s
//! tried in priority order. The first rule that yields a usable match
//! wins. Within one rule, a [`Selection`] decides which of its matches is
//! taken: the first occurrence, or the last one for fields such as totals
//! that are conventionally printed at the end of a document.

pub mod patterns;

pub use patterns::*;

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Which occurrence of a rule's matches is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    First,
    Last,
}

/// A single named detection rule: a pattern plus the capture group that
/// holds the value (group 0 is the whole match).
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    name: &'static str,
    pattern: &'static Regex,
    group: usize,
}

/// A value found by a rule, with its byte span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    pub rule: &'static str,
    pub value: &'t str,
    pub start: usize,
    pub end: usize,
}

impl Rule {
    pub fn new(name: &'static str, pattern: &'static Regex, group: usize) -> Self {
        Self { name, pattern, group }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All matches of this rule, in document order.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<RuleMatch<'t>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(self.group))
            .map(|m| RuleMatch {
                rule: self.name,
                value: m.as_str(),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }

    /// The match chosen by `selection`, if the rule matches at all.
    pub fn find<'t>(&self, text: &'t str, selection: Selection) -> Option<RuleMatch<'t>> {
        match selection {
            Selection::First => self
                .pattern
                .captures(text)
                .and_then(|caps| caps.get(self.group))
                .map(|m| RuleMatch {
                    rule: self.name,
                    value: m.as_str(),
                    start: m.start(),
                    end: m.end(),
                }),
            Selection::Last => self.find_all(text).pop(),
        }
    }
}

/// Ordered list of rules for one field.
#[derive(Debug, Clone)]
pub struct Cascade {
    rules: Vec<Rule>,
    selection: Selection,
}

impl Cascade {
    pub fn new(rules: Vec<Rule>, selection: Selection) -> Self {
        Self { rules, selection }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The selected match of the first rule that matches.
    pub fn find<'t>(&self, text: &'t str) -> Option<RuleMatch<'t>> {
        self.find_map(text, |m| Some(*m))
    }

    /// Like [`Cascade::find`], but a rule only wins when `convert` accepts
    /// its selected match; otherwise the next rule is tried.
    pub fn find_map<'t, T>(
        &self,
        text: &'t str,
        convert: impl Fn(&RuleMatch<'t>) -> Option<T>,
    ) -> Option<T> {
        self.rules
            .iter()
            .filter_map(|rule| rule.find(text, self.selection))
            .find_map(|m| convert(&m))
    }
}

impl FieldExtractor for Cascade {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.find(text).map(|m| m.value.to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.rules
            .iter()
            .flat_map(|rule| rule.find_all(text))
            .map(|m| m.value.to_string())
            .collect()
    }
}
