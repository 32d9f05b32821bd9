//! The analysis pipeline: extract, combine, rank.

use std::sync::Arc;

use super::aggregator::combine;
use super::extractor::{EntityExtractor, Result};
use super::ranker::ContextRanker;
use crate::config::AnalysisSettings;
use crate::domain::{AnalysisResult, EventRecord, MessageRecord};
use crate::providers::tagger::Tagger;

/// Runs the full analysis over a batch of records.
///
/// Holds no state between runs; the tagger is loaded by the caller and reused.
pub struct AnalysisService {
    extractor: EntityExtractor,
    ranker: ContextRanker,
}

impl AnalysisService {
    /// Creates the service. Fails if a configured project pattern is invalid.
    pub fn new(tagger: Arc<dyn Tagger>, settings: &AnalysisSettings) -> Result<Self> {
        Ok(Self {
            extractor: EntityExtractor::new(tagger, settings)?,
            ranker: ContextRanker::new(settings),
        })
    }

    /// Returns the extractor.
    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Returns the ranker.
    pub fn ranker(&self) -> &ContextRanker {
        &self.ranker
    }

    /// Analyzes calendar events and sent messages, both newest first.
    ///
    /// Any tagger error aborts the run; no partial result is returned.
    pub fn analyze(
        &self,
        events: &[EventRecord],
        messages: &[MessageRecord],
    ) -> Result<AnalysisResult> {
        tracing::info!(
            events = events.len(),
            messages = messages.len(),
            "analyzing records"
        );

        let calendar = self.extractor.extract_from_calendar(events)?;
        let mail = self.extractor.extract_from_emails(messages)?;
        let entities = combine(calendar, mail);
        let top_items = self.ranker.select_top_items(&entities, events, messages);

        tracing::info!(
            organizations = entities.organizations.len(),
            top_items = top_items.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            top_items,
            calendar_count: events.len(),
            email_count: messages.len(),
            entities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::tagger::{MockTagger, TaggedSpan, TaggerError};
    use crate::services::AnalysisError;
    use pretty_assertions::assert_eq;

    fn acme_tagger() -> Arc<dyn Tagger> {
        let mut tagger = MockTagger::new();
        tagger.expect_tag().returning(|text| {
            Ok(if text.contains("Acme") {
                vec![TaggedSpan::organization("Acme")]
            } else {
                Vec::new()
            })
        });
        Arc::new(tagger)
    }

    fn scenario() -> (Vec<EventRecord>, Vec<MessageRecord>) {
        (
            vec![EventRecord::new("Acme POC kickoff", "")],
            vec![MessageRecord::new(
                "Follow up with Acme",
                "Acme is moving fast on the pilot. Thanks.",
            )
            .with_to("x@acme.com")],
        )
    }

    #[test]
    fn acme_scenario() {
        let service = AnalysisService::new(acme_tagger(), &AnalysisSettings::default()).unwrap();
        let (events, messages) = scenario();

        let result = service.analyze(&events, &messages).unwrap();

        assert_eq!(result.entities.organizations.get("Acme"), 4);
        assert_eq!(result.entities.topics.get("poc"), 1);
        assert_eq!(result.entities.topics.get("pilot"), 2);
        assert_eq!(result.entities.projects.get("Acme"), 1);
        assert_eq!(result.calendar_count, 1);
        assert_eq!(result.email_count, 1);

        assert_eq!(result.top_items.len(), 1);
        let acme = &result.top_items[0];
        assert_eq!(acme.name, "Acme");
        assert_eq!(acme.frequency, 4);
        assert_eq!(
            acme.context,
            vec![
                "Meeting: Acme POC kickoff".to_string(),
                "Acme is moving fast on the pilot".to_string(),
            ]
        );
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let service = AnalysisService::new(acme_tagger(), &AnalysisSettings::default()).unwrap();
        let result = service.analyze(&[], &[]).unwrap();

        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let service = AnalysisService::new(acme_tagger(), &AnalysisSettings::default()).unwrap();
        let (events, messages) = scenario();

        let first = service.analyze(&events, &messages).unwrap();
        let second = service.analyze(&events, &messages).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tagger_failure_fails_the_run() {
        let mut tagger = MockTagger::new();
        tagger.expect_tag().returning(|text| {
            if text.contains("corrupt") {
                Err(TaggerError::Failed("cannot tag".to_string()))
            } else {
                Ok(Vec::new())
            }
        });
        let service =
            AnalysisService::new(Arc::new(tagger), &AnalysisSettings::default()).unwrap();

        let messages = [
            MessageRecord::new("fine", ""),
            MessageRecord::new("corrupt", ""),
        ];
        let result = service.analyze(&[], &messages);
        assert!(matches!(result, Err(AnalysisError::Tagger(_))));
    }
}
