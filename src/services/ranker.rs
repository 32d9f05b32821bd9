//! Ranking of organizations with supporting context.
//!
//! The most frequent organizations are looked up by name in the most recent
//! records. Only organizations with at least one context snippet are kept, so
//! every ranked item can be backed by text the user wrote or attended.

use crate::config::AnalysisSettings;
use crate::domain::{EntityTally, EventRecord, MessageRecord, TopItem};

/// Prefix of snippets taken from meeting subjects.
pub const MEETING_PREFIX: &str = "Meeting: ";

/// Selects and annotates the top organizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRanker {
    candidate_pool: usize,
    context_window: usize,
    max_snippets: usize,
    max_snippets_per_message: usize,
    top_n: usize,
}

impl ContextRanker {
    /// Creates a ranker from the analysis settings.
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            candidate_pool: settings.candidate_pool,
            context_window: settings.context_window,
            max_snippets: settings.max_snippets,
            max_snippets_per_message: settings.max_snippets_per_message,
            top_n: settings.top_n,
        }
    }

    /// Ranks organizations by combined frequency and attaches context.
    ///
    /// Candidates are the `candidate_pool` most frequent organizations (ties by
    /// name). Candidates without context are dropped, and the rest are cut to
    /// `top_n`, frequency descending.
    pub fn select_top_items(
        &self,
        combined: &EntityTally,
        events: &[EventRecord],
        messages: &[MessageRecord],
    ) -> Vec<TopItem> {
        let candidates = combined.organizations.most_common(self.candidate_pool);
        let candidate_count = candidates.len();

        let mut items: Vec<TopItem> = candidates
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .filter_map(|(name, count)| {
                let context = self.find_context(name, events, messages);
                (!context.is_empty()).then(|| TopItem::customer(name, count, context))
            })
            .collect();

        tracing::debug!(
            candidates = candidate_count,
            with_context = items.len(),
            "organizations ranked"
        );

        items.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        items.truncate(self.top_n);
        items
    }

    /// Collects snippets mentioning `entity` from the most recent records.
    ///
    /// Matching is a case-insensitive substring test. Meeting subjects come
    /// first, then sentences from message previews.
    pub fn find_context(
        &self,
        entity: &str,
        events: &[EventRecord],
        messages: &[MessageRecord],
    ) -> Vec<String> {
        let needle = entity.to_lowercase();
        let mut context = Vec::new();

        for event in events.iter().take(self.context_window) {
            if event.subject.to_lowercase().contains(&needle) {
                context.push(format!("{}{}", MEETING_PREFIX, event.subject));
            }
        }

        for message in messages.iter().take(self.context_window) {
            let mentioned = message.subject.to_lowercase().contains(&needle)
                || message.body_preview.to_lowercase().contains(&needle);
            if !mentioned {
                continue;
            }
            context.extend(
                message
                    .body_preview
                    .split('.')
                    .filter(|sentence| sentence.to_lowercase().contains(&needle))
                    .map(|sentence| sentence.trim().to_string())
                    .take(self.max_snippets_per_message),
            );
        }

        context.truncate(self.max_snippets);
        context
    }
}

impl Default for ContextRanker {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}
