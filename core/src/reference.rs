//! Documentation reference index.
//!
//! Built once from the preloaded documentation blob. A
//! case-folded `BTreeMap` range-scan stands in for the "trie"
//! names — sorted-key prefix scanning gives the same prefix-query behavior
//! without a hand-rolled trie node graph.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One documentation entry, matching the preloaded blob shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    pub canonical_name: Option<String>,
}

/// A small, fixed synonym table used to widen tag-overlap matching.
const SYNONYMS: &[(&str, &str)] = &[
    ("array", "list"),
    ("list", "array"),
    ("indicator", "study"),
    ("study", "indicator"),
    ("strategy", "backtest"),
    ("backtest", "strategy"),
];

fn expand_synonyms(term: &str) -> Vec<&'static str> {
    SYNONYMS
        .iter()
        .filter(|(k, _)| *k == term)
        .map(|(_, v)| *v)
        .collect()
}

const DEFAULT_MAX_RESULTS: usize = 20;

pub struct ReferenceIndex {
    entries: Vec<Entry>,
    /// Case-folded title -> indices into `entries`, ordered for prefix scans.
    by_title_prefix: BTreeMap<String, Vec<usize>>,
    by_canonical_name: HashMap<String, usize>,
    by_tag: HashMap<String, Vec<usize>>,
}

impl ReferenceIndex {
    /// Build the index from the preloaded documentation JSON object keyed by
    /// entry id. Entry ids themselves are not retained — only
    /// the entries' own fields participate in lookup.
    pub fn from_json(blob: &str) -> CoreResult<Self> {
        let raw: HashMap<String, Entry> = serde_json::from_str(blob)
            .map_err(|e| CoreError::ReferenceIndex("<blob>".to_string(), e.to_string()))?;
        let mut entries: Vec<Entry> = raw.into_values().collect();
        entries.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let mut by_title_prefix: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_canonical_name = HashMap::new();
        let mut by_tag: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            by_title_prefix
                .entry(entry.title.to_lowercase())
                .or_default()
                .push(i);
            if let Some(canonical) = &entry.canonical_name {
                by_canonical_name.insert(canonical.to_lowercase(), i);
            }
            for tag in &entry.tags {
                by_tag.entry(tag.to_lowercase()).or_default().push(i);
            }
        }

        ReferenceIndex {
            entries,
            by_title_prefix,
            by_canonical_name,
            by_tag,
        }
    }

    /// `lookup(query, version)` -> entries ordered by relevance.
    pub fn lookup(&self, query: &str, _version: &str) -> Vec<&Entry> {
        self.lookup_with_limit(query, DEFAULT_MAX_RESULTS)
    }

    pub fn lookup_with_limit(&self, query: &str, max_results: usize) -> Vec<&Entry> {
        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        let mut scores: HashMap<usize, i64> = HashMap::new();

        for (i, entry) in self.entries.iter().enumerate() {
            let title_lower = entry.title.to_lowercase();
            let mut score = 0i64;

            if title_lower == query_lower {
                score += 100;
            } else if let Some(canonical) = &entry.canonical_name {
                if canonical.to_lowercase() == query_lower {
                    score += 100;
                }
            }

            if title_lower.starts_with(&query_lower) && title_lower != query_lower {
                score += 40;
            }

            let tags_lower: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();
            for term in &terms {
                if tags_lower.iter().any(|t| t == term) {
                    score += 10;
                }
                for synonym in expand_synonyms(term) {
                    if tags_lower.iter().any(|t| t == synonym) {
                        score += 5;
                    }
                }
            }

            if score > 0 {
                scores.insert(i, score);
            }
        }

        let mut ranked: Vec<(usize, i64)> = scores.into_iter().collect();
        ranked.sort_by(|(i_a, s_a), (i_b, s_b)| {
            s_b.cmp(s_a).then_with(|| self.entries[*i_a].title.cmp(&self.entries[*i_b].title))
        });
        ranked.truncate(max_results);
        ranked.into_iter().map(|(i, _)| &self.entries[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose case-folded title starts with `prefix`, used for
    /// cheap autocomplete-style callers beyond `lookup`'s scored ranking.
    pub fn titles_with_prefix(&self, prefix: &str) -> Vec<&Entry> {
        let prefix_lower = prefix.to_lowercase();
        self.by_title_prefix
            .range(prefix_lower.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix_lower))
            .flat_map(|(_, idxs)| idxs.iter().map(|&i| &self.entries[i]))
            .collect()
    }

    pub fn by_canonical_name(&self, name: &str) -> Option<&Entry> {
        self.by_canonical_name
            .get(&name.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Entry> {
        self.by_tag
            .get(&tag.to_lowercase())
            .map(|idxs| idxs.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entry> {
        vec![
            Entry {
                title: "ta.macd".to_string(),
                entry_type: "function".to_string(),
                content: "MACD indicator".to_string(),
                tags: vec!["indicator".to_string(), "momentum".to_string()],
                examples: vec![],
                canonical_name: Some("ta.macd".to_string()),
            },
            Entry {
                title: "array.new_float".to_string(),
                entry_type: "function".to_string(),
                content: "Creates a float array".to_string(),
                tags: vec!["array".to_string(), "collection".to_string()],
                examples: vec![],
                canonical_name: Some("array.new_float".to_string()),
            },
            Entry {
                title: "array.new_int".to_string(),
                entry_type: "function".to_string(),
                content: "Creates an int array".to_string(),
                tags: vec!["array".to_string(), "collection".to_string()],
                examples: vec![],
                canonical_name: Some("array.new_int".to_string()),
            },
        ]
    }

    #[test]
    fn exact_title_match_outranks_partial() {
        let idx = ReferenceIndex::from_entries(sample());
        let results = idx.lookup("ta.macd", "v6");
        assert_eq!(results[0].title, "ta.macd");
    }

    #[test]
    fn ties_broken_alphabetically() {
        let idx = ReferenceIndex::from_entries(sample());
        let results = idx.lookup("array", "v6");
        assert_eq!(results[0].title, "array.new_float");
        assert_eq!(results[1].title, "array.new_int");
    }

    #[test]
    fn synonym_expansion_finds_tagged_entries() {
        let idx = ReferenceIndex::from_entries(sample());
        let results = idx.lookup("study", "v6");
        assert!(results.iter().any(|e| e.title == "ta.macd"));
    }

    #[test]
    fn no_match_returns_empty() {
        let idx = ReferenceIndex::from_entries(sample());
        assert!(idx.lookup("zzz_nonexistent", "v6").is_empty());
    }

    #[test]
    fn max_results_truncates() {
        let idx = ReferenceIndex::from_entries(sample());
        let results = idx.lookup_with_limit("array", 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn canonical_name_lookup_is_direct() {
        let idx = ReferenceIndex::from_entries(sample());
        assert!(idx.by_canonical_name("ta.macd").is_some());
    }
}
