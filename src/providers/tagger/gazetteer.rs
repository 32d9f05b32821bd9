//! Dictionary-backed tagger.
//!
//! Tags whole-word, case-sensitive occurrences of known organization and person
//! names. Useful when the set of accounts is known up front, and as a
//! deterministic tagger for offline runs.

use std::collections::HashMap;

use regex::Regex;

use super::{SpanCategory, TaggedSpan, Tagger, TaggerResult};

/// Tags occurrences of names from fixed lists.
#[derive(Debug, Clone)]
pub struct GazetteerTagger {
    /// Alternation of every name, longest first. `None` when no names are known.
    pattern: Option<Regex>,
    categories: HashMap<String, SpanCategory>,
}

impl GazetteerTagger {
    /// Builds a tagger from organization and person name lists.
    ///
    /// A name present in both lists is tagged as an organization. Blank names
    /// are ignored.
    pub fn new<O, P>(organizations: O, people: P) -> TaggerResult<Self>
    where
        O: IntoIterator,
        O::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut categories = HashMap::new();
        for name in people {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                categories.insert(name.to_string(), SpanCategory::Person);
            }
        }
        for name in organizations {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                categories.insert(name.to_string(), SpanCategory::Organization);
            }
        }

        let pattern = if categories.is_empty() {
            None
        } else {
            let mut names: Vec<&str> = categories.keys().map(String::as_str).collect();
            names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            let alternation = names
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"\b(?:{})\b", alternation))?)
        };

        Ok(Self {
            pattern,
            categories,
        })
    }

    /// Number of known names.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns whether no names are known.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Tagger for GazetteerTagger {
    fn tag(&self, text: &str) -> TaggerResult<Vec<TaggedSpan>> {
        let Some(pattern) = &self.pattern else {
            return Ok(Vec::new());
        };

        Ok(pattern
            .find_iter(text)
            .filter_map(|m| {
                self.categories
                    .get(m.as_str())
                    .map(|category| TaggedSpan::new(m.as_str(), *category).at(m.start()))
            })
            .collect())
    }
}
