//! Rule-based tagger for text with no known-name list.
//!
//! Best effort only: capitalized phrases ending in a corporate suffix are
//! organizations, names after an honorific are people.

use regex::Regex;

use super::{TaggedSpan, Tagger, TaggerResult};

const ORGANIZATION_PATTERN: &str = r"\b((?:[A-Z][A-Za-z0-9&'-]*\s+){1,4}(?:Inc|Corp|Corporation|Co|LLC|Ltd|GmbH|AG|Labs|Technologies|Systems|Group|Holdings|Bank))\b";

const PERSON_PATTERN: &str = r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)";

/// Suffix and honorific heuristics.
#[derive(Debug, Clone)]
pub struct HeuristicTagger {
    organization: Regex,
    person: Regex,
}

impl HeuristicTagger {
    /// Compiles the built-in rules.
    pub fn new() -> TaggerResult<Self> {
        Ok(Self {
            organization: Regex::new(ORGANIZATION_PATTERN)?,
            person: Regex::new(PERSON_PATTERN)?,
        })
    }
}

impl Tagger for HeuristicTagger {
    fn tag(&self, text: &str) -> TaggerResult<Vec<TaggedSpan>> {
        let mut spans: Vec<TaggedSpan> = Vec::new();

        for caps in self.organization.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                spans.push(TaggedSpan::organization(m.as_str()).at(m.start()));
            }
        }
        for caps in self.person.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                spans.push(TaggedSpan::person(m.as_str()).at(m.start()));
            }
        }

        spans.sort_by_key(|span| span.start);
        Ok(spans)
    }
}
