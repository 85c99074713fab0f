//! Alias extraction from text-match fragments.
//!
//! An alias is a bracketed require form such as `[reagent.core :as r]`: the
//! namespace prefix, anything up to the next `]`, and the `]` itself.
//! Whitespace inside a match is collapsed so that formatting differences do
//! not split the tally.

use std::collections::HashMap;

use regex::Regex;

use crate::models::ResultItem;

/// Alias counts, remembering the order in which aliases were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTally {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl AliasTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, alias: String) {
        match self.index.get(&alias) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(alias.clone(), self.entries.len());
                self.entries.push((alias, 1));
            }
        }
    }

    pub fn get(&self, alias: &str) -> u64 {
        self.index
            .get(alias)
            .map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of matches across all aliases.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(alias, count)| (alias.as_str(), *count))
    }

    /// Entries by descending count; ties keep first-seen order.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

/// Compiled alias pattern for one namespace prefix.
#[derive(Debug, Clone)]
pub struct AliasCounter {
    pattern: Regex,
}

impl AliasCounter {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"{}[^\]]*\]", regex::escape(prefix)))?;
        Ok(Self { pattern })
    }

    /// Normalized aliases found in one fragment, in order of appearance.
    pub fn find_in<'a>(&'a self, fragment: &'a str) -> impl Iterator<Item = String> + 'a {
        self.pattern
            .find_iter(fragment)
            .map(|m| normalize_whitespace(m.as_str()))
    }

    pub fn count(&self, items: &[ResultItem]) -> AliasTally {
        let mut tally = AliasTally::new();
        for item in items {
            for text_match in &item.text_matches {
                for alias in self.find_in(&text_match.fragment) {
                    tally.add(alias);
                }
            }
        }
        tally
    }
}

/// Tally every `prefix ... ]` occurrence in the fragments of `items`.
pub fn count_aliases(items: &[ResultItem], prefix: &str) -> Result<AliasTally, regex::Error> {
    Ok(AliasCounter::new(prefix)?.count(items))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "[reagent.core";

    fn tally_of(fragments: &[&str]) -> AliasTally {
        let items = vec![ResultItem::from_fragments(fragments.iter().copied())];
        count_aliases(&items, PREFIX).unwrap()
    }

    #[test]
    fn collapses_inner_whitespace() {
        let tally = tally_of(&["use [reagent.core   :as r]  and [reagent.core :as rc]"]);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.get("[reagent.core :as r]"), 1);
        assert_eq!(tally.get("[reagent.core :as rc]"), 1);
    }

    #[test]
    fn newlines_and_tabs_are_whitespace() {
        let tally = tally_of(&["(:require [reagent.core\n\t:as\n r])"]);
        assert_eq!(tally.get("[reagent.core :as r]"), 1);
    }

    #[test]
    fn prefix_is_matched_literally() {
        // The dot must not act as a wildcard.
        let tally = tally_of(&["[reagentXcore :as r] [reagent.core]"]);
        assert_eq!(tally.len(), 1);
        assert_eq!(tally.get("[reagent.core]"), 1);
    }

    #[test]
    fn unterminated_alias_is_ignored() {
        let tally = tally_of(&["[reagent.core :as r", "no aliases here", ""]);
        assert!(tally.is_empty());
    }

    #[test]
    fn counts_across_items_and_fragments() {
        let items = vec![
            ResultItem::from_fragments(["[reagent.core :as r]", "[reagent.core :as r]"]),
            ResultItem::default(),
            ResultItem::from_fragments(["[reagent.core :as reagent :refer [atom]]"]),
        ];
        let tally = count_aliases(&items, PREFIX).unwrap();
        assert_eq!(tally.get("[reagent.core :as r]"), 2);
        // The match ends at the first closing bracket.
        assert_eq!(tally.get("[reagent.core :as reagent :refer [atom]"), 1);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn counting_is_idempotent() {
        let items = vec![ResultItem::from_fragments([
            "[reagent.core :as r] [reagent.core :as r]",
            "[reagent.core :as rg]",
        ])];
        let counter = AliasCounter::new(PREFIX).unwrap();
        assert_eq!(counter.count(&items), counter.count(&items));
    }

    #[test]
    fn sorted_is_descending_and_stable() {
        let tally = tally_of(&[
            "[reagent.core :as a] [reagent.core :as b] [reagent.core :as c]",
            "[reagent.core :as c] [reagent.core :as b]",
        ]);
        assert_eq!(
            tally.sorted(),
            vec![
                ("[reagent.core :as b]", 2),
                ("[reagent.core :as c]", 2),
                ("[reagent.core :as a]", 1),
            ]
        );
    }
}
