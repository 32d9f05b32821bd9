//! Entity extraction from calendar events and sent mail.
//!
//! Every record is reduced to one text blob and scanned three ways:
//! - the injected [`Tagger`] for organizations and people
//! - substring search for the topic vocabulary
//! - the project patterns for initiative names
//!
//! Sent mail additionally contributes recipient domains as organizations.

use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use crate::config::AnalysisSettings;
use crate::domain::{EntityKind, EntityTally, EventRecord, MessageRecord};
use crate::providers::tagger::{SpanCategory, Tagger, TaggerError};

/// Increment for person spans, recipient domains and project matches.
const UNIT_WEIGHT: u32 = 1;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The tagger failed on a record. The whole run is aborted.
    #[error("tagger failed: {0}")]
    Tagger(#[from] TaggerError),

    /// A configured project pattern does not compile.
    #[error("invalid project pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Turns records into entity tallies.
pub struct EntityExtractor {
    tagger: Arc<dyn Tagger>,
    topic_keywords: Vec<String>,
    project_patterns: Vec<Regex>,
    settings: AnalysisSettings,
}

impl EntityExtractor {
    /// Creates an extractor. Fails if a project pattern does not compile.
    pub fn new(tagger: Arc<dyn Tagger>, settings: &AnalysisSettings) -> Result<Self> {
        let project_patterns = settings
            .project_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| AnalysisError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut topic_keywords: Vec<String> = settings
            .topic_keywords
            .iter()
            .map(|keyword| keyword.to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        topic_keywords.sort();
        topic_keywords.dedup();

        Ok(Self {
            tagger,
            topic_keywords,
            project_patterns,
            settings: settings.clone(),
        })
    }

    /// Tallies entities across calendar events.
    pub fn extract_from_calendar(&self, events: &[EventRecord]) -> Result<EntityTally> {
        let mut tally = EntityTally::new();
        for event in events {
            self.scan_text(&event.text(), self.settings.weights.calendar, &mut tally)?;
        }
        tracing::debug!(
            events = events.len(),
            organizations = tally.organizations.len(),
            topics = tally.topics.len(),
            projects = tally.projects.len(),
            "calendar entities extracted"
        );
        Ok(tally)
    }

    /// Tallies entities across sent messages, including recipient domains.
    pub fn extract_from_emails(&self, messages: &[MessageRecord]) -> Result<EntityTally> {
        let mut tally = EntityTally::new();
        for message in messages {
            self.scan_text(&message.text(), self.settings.weights.mail, &mut tally)?;
            self.scan_recipients(message, &mut tally);
        }
        tracing::debug!(
            messages = messages.len(),
            organizations = tally.organizations.len(),
            topics = tally.topics.len(),
            projects = tally.projects.len(),
            "mail entities extracted"
        );
        Ok(tally)
    }

    /// Runs the tagger, topic and project scans over one blob.
    fn scan_text(&self, text: &str, weight: u32, tally: &mut EntityTally) -> Result<()> {
        for span in self.tagger.tag(text)? {
            let (kind, amount) = match span.category {
                SpanCategory::Organization => (EntityKind::Organizations, weight),
                SpanCategory::Person => (EntityKind::People, UNIT_WEIGHT),
                SpanCategory::Other => continue,
            };
            let name = self.settings.normalization.apply(&span.text);
            if !name.is_empty() {
                tally.get_mut(kind).add(name, amount);
            }
        }

        let lowered = text.to_lowercase();
        for keyword in &self.topic_keywords {
            if lowered.contains(keyword.as_str()) {
                tally.topics.add(keyword.as_str(), weight);
            }
        }

        for name in self.project_names(text) {
            tally.projects.add(name, UNIT_WEIGHT);
        }

        Ok(())
    }

    /// Returns the project names matched by every pattern, in pattern then text order.
    ///
    /// Each match's capture groups are joined with a space and trimmed; groups
    /// that did not participate contribute an empty string.
    pub fn project_names(&self, text: &str) -> Vec<String> {
        let mut names = Vec::new();
        for pattern in &self.project_patterns {
            for caps in pattern.captures_iter(text) {
                let joined = caps
                    .iter()
                    .skip(1)
                    .map(|group| group.map_or("", |m| m.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ");
                let name = joined.trim();
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Counts each recipient's domain as an organization unless excluded.
    fn scan_recipients(&self, message: &MessageRecord, tally: &mut EntityTally) {
        for recipient in message.recipients() {
            let Some(label) = recipient.domain_label() else {
                continue;
            };
            if label.is_empty() || self.settings.is_excluded_domain(label) {
                continue;
            }
            let name = capitalize(label);
            tally
                .organizations
                .add(self.settings.normalization.apply(&name), UNIT_WEIGHT);
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Normalization;
    use crate::providers::tagger::{MockTagger, TaggedSpan};
    use pretty_assertions::assert_eq;

    fn silent_tagger() -> Arc<dyn Tagger> {
        let mut tagger = MockTagger::new();
        tagger.expect_tag().returning(|_| Ok(Vec::new()));
        Arc::new(tagger)
    }

    fn extractor(tagger: Arc<dyn Tagger>) -> EntityExtractor {
        EntityExtractor::new(tagger, &AnalysisSettings::default()).unwrap()
    }

    #[test]
    fn tagged_organizations_are_weighted_by_source() {
        let mut tagger = MockTagger::new();
        tagger.expect_tag().returning(|text| {
            Ok(if text.contains("Acme") {
                vec![TaggedSpan::organization("Acme"), TaggedSpan::person("Jane Doe")]
            } else {
                Vec::new()
            })
        });
        let extractor = extractor(Arc::new(tagger));

        let calendar = extractor
            .extract_from_calendar(&[EventRecord::new("Acme sync", "")])
            .unwrap();
        assert_eq!(calendar.organizations.get("Acme"), 1);
        assert_eq!(calendar.people.get("Jane Doe"), 1);

        let mail = extractor
            .extract_from_emails(&[MessageRecord::new("Acme sync", "")])
            .unwrap();
        assert_eq!(mail.organizations.get("Acme"), 2);
        assert_eq!(mail.people.get("Jane Doe"), 1);
    }

    #[test]
    fn other_spans_are_ignored() {
        let mut tagger = MockTagger::new();
        tagger
            .expect_tag()
            .returning(|_| Ok(vec![TaggedSpan::other("Tuesday")]));
        let tally = extractor(Arc::new(tagger))
            .extract_from_calendar(&[EventRecord::new("Tuesday", "")])
            .unwrap();
        assert!(tally.organizations.is_empty());
        assert!(tally.people.is_empty());
    }

    #[test]
    fn topics_count_once_per_record() {
        let extractor = extractor(silent_tagger());
        let events = [EventRecord::new("GPU cluster review", "gpu gpu GPU")];

        let tally = extractor.extract_from_calendar(&events).unwrap();
        assert_eq!(tally.topics.get("gpu"), 1);
        assert_eq!(tally.topics.get("cluster"), 1);

        let messages = [MessageRecord::new("GPU cluster review", "gpu gpu")];
        let tally = extractor.extract_from_emails(&messages).unwrap();
        assert_eq!(tally.topics.get("gpu"), 2);
    }

    #[test]
    fn topics_match_substrings() {
        let tally = extractor(silent_tagger())
            .extract_from_calendar(&[EventRecord::new("Email campaign", "")])
            .unwrap();
        // "ai" inside "email" and "campaign"
        assert_eq!(tally.topics.get("ai"), 1);
    }

    #[test]
    fn trailing_pattern_names_the_project() {
        let extractor = extractor(silent_tagger());
        assert_eq!(extractor.project_names("Acme POC kickoff "), vec!["Acme"]);
    }

    #[test]
    fn leading_pattern_joins_groups() {
        let extractor = extractor(silent_tagger());
        let names = extractor.project_names("Kicking off the pilot for Globex today");

        assert!(names.contains(&"pilot Globex today".to_string()));
    }

    #[test]
    fn leading_pattern_needs_separator_when_preposition_absent() {
        let extractor = extractor(silent_tagger());
        let names = extractor.project_names("poc  Initech");
        assert!(names.contains(&"poc Initech".to_string()));
    }

    #[test]
    fn project_hits_are_not_source_weighted() {
        let tally = extractor(silent_tagger())
            .extract_from_emails(&[MessageRecord::new("Acme POC", "")])
            .unwrap();
        assert_eq!(tally.projects.get("Acme"), 1);
    }

    #[test]
    fn recipient_domains_become_organizations() {
        let mut settings = AnalysisSettings::default();
        settings.own_domain = Some("initech".to_string());
        let extractor = EntityExtractor::new(silent_tagger(), &settings).unwrap();

        let message = MessageRecord::new("", "")
            .with_to("x@acme.com")
            .with_to("y@ACME.com")
            .with_cc("me@initech.com")
            .with_cc("friend@gmail.com")
            .with_cc("not-an-address")
            .with_cc("broken@");

        let tally = extractor.extract_from_emails(&[message]).unwrap();
        assert_eq!(tally.organizations.get("Acme"), 2);
        assert!(!tally.organizations.contains("Initech"));
        assert!(!tally.organizations.contains("Gmail"));
        assert_eq!(tally.organizations.len(), 1);
    }

    #[test]
    fn recipient_exclusion_follows_settings() {
        let settings = AnalysisSettings {
            excluded_domains: vec!["Globex".to_string()],
            own_domain: Some("INITECH".to_string()),
            ..AnalysisSettings::default()
        };
        let extractor = EntityExtractor::new(silent_tagger(), &settings).unwrap();

        let message = MessageRecord::new("", "")
            .with_to("a@GLOBEX.io")
            .with_to("b@initech.com")
            .with_to("c@gmail.com");

        let tally = extractor.extract_from_emails(&[message]).unwrap();
        for label in ["GLOBEX", "initech", "gmail"] {
            assert_eq!(
                settings.is_excluded_domain(label),
                !tally.organizations.contains(&capitalize(label))
            );
        }
        assert!(tally.organizations.contains("Gmail"));
        assert_eq!(tally.organizations.len(), 1);
    }

    #[test]
    fn case_fold_normalization_merges_spellings() {
        let mut tagger = MockTagger::new();
        tagger.expect_tag().returning(|text| {
            Ok(vec![TaggedSpan::organization(if text.starts_with("a") {
                "acme "
            } else {
                "Acme"
            })])
        });
        let settings = AnalysisSettings {
            normalization: Normalization::CaseFoldTrim,
            ..AnalysisSettings::default()
        };
        let extractor = EntityExtractor::new(Arc::new(tagger), &settings).unwrap();

        let tally = extractor
            .extract_from_calendar(&[EventRecord::new("a", ""), EventRecord::new("A", "")])
            .unwrap();
        assert_eq!(tally.organizations.get("acme"), 2);
    }

    #[test]
    fn tagger_failure_aborts_extraction() {
        let mut tagger = MockTagger::new();
        tagger
            .expect_tag()
            .returning(|_| Err(TaggerError::Failed("bad input".to_string())));
        let result = extractor(Arc::new(tagger)).extract_from_calendar(&[EventRecord::default()]);
        assert!(matches!(result, Err(AnalysisError::Tagger(_))));
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let settings = AnalysisSettings {
            project_patterns: vec!["(unclosed".to_string()],
            ..AnalysisSettings::default()
        };
        let result = EntityExtractor::new(silent_tagger(), &settings);
        assert!(matches!(result, Err(AnalysisError::Pattern { .. })));
    }

    #[test]
    fn empty_records_contribute_nothing_but_the_tagger_call() {
        let tally = extractor(silent_tagger())
            .extract_from_emails(&[MessageRecord::default()])
            .unwrap();
        assert!(tally.is_empty());
    }

    #[test]
    fn capitalize_matches_title_case_of_one_word() {
        assert_eq!(capitalize("acme"), "Acme");
        assert_eq!(capitalize("ACME"), "Acme");
        assert_eq!(capitalize(""), "");
    }
}
