//! Keyword auto-categorization
//!
//! Each category has a list of keywords. A description scores the summed
//! length of every keyword it contains (case-insensitive); the best score
//! wins, ties going to the alphabetically first category.

use std::collections::BTreeMap;

use tracing::debug;

/// Fallback category when nothing matches
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Keyword rules for picking a category from a description
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    rules: BTreeMap<String, Vec<String>>,
}

impl Categorizer {
    pub fn new(rules: &BTreeMap<String, Vec<String>>) -> Self {
        let rules = rules
            .iter()
            .map(|(category, words)| {
                let words = words
                    .iter()
                    .map(|w| w.trim().to_uppercase())
                    .filter(|w| !w.is_empty())
                    .collect();
                (category.clone(), words)
            })
            .collect();
        Self { rules }
    }

    /// Best matching category, if any keyword matches
    pub fn categorize(&self, description: &str) -> Option<&str> {
        let haystack = description.to_uppercase();
        if haystack.trim().is_empty() {
            return None;
        }

        let mut best: Option<(&str, usize)> = None;
        for (category, words) in &self.rules {
            let score: usize = words
                .iter()
                .filter(|w| haystack.contains(w.as_str()))
                .map(|w| w.len())
                .sum();
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((category.as_str(), score));
            }
        }

        if let Some((category, score)) = best {
            debug!(description, category, score, "auto-categorized");
        }
        best.map(|(category, _)| category)
    }

    /// Best matching category, or [`UNCATEGORIZED`]
    pub fn categorize_or_default(&self, description: &str) -> String {
        self.categorize(description)
            .unwrap_or(UNCATEGORIZED)
            .to_string()
    }

    /// Add a keyword to a category; returns false if it was already present
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> bool {
        let keyword = keyword.trim().to_uppercase();
        if keyword.is_empty() {
            return false;
        }
        let words = self.rules.entry(category.to_string()).or_default();
        if words.contains(&keyword) {
            return false;
        }
        words.push(keyword);
        true
    }
}
