//! End-to-end digest: read records, analyze them, render a draft.
//!
//! The only service that performs I/O. Failures from any stage are returned
//! unchanged; retries belong to the caller.

use std::sync::Arc;

use thiserror::Error;

use super::analysis_service::AnalysisService;
use super::draft_service::DraftRenderer;
use super::extractor::AnalysisError;
use crate::config::Settings;
use crate::domain::{AnalysisResult, Draft, Recipient};
use crate::providers::source::{RecordSource, SourceError, Window};
use crate::providers::tagger::Tagger;

/// Errors that can occur while producing a digest.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Result type for digest operations.
pub type Result<T> = std::result::Result<T, DigestError>;

/// Output of one digest run.
#[derive(Debug, Clone)]
pub struct Digest {
    /// The analysis the draft was rendered from.
    pub analysis: AnalysisResult,
    /// The rendered draft.
    pub draft: Draft,
}

/// Orchestrates a source, the analysis pipeline and the draft renderer.
pub struct DigestService {
    source: Arc<dyn RecordSource>,
    tagger: Arc<dyn Tagger>,
    settings: Settings,
    analysis: AnalysisService,
    renderer: DraftRenderer,
}

impl DigestService {
    /// Creates the service. Fails if the analysis settings are invalid.
    pub fn new(
        source: Arc<dyn RecordSource>,
        tagger: Arc<dyn Tagger>,
        settings: Settings,
    ) -> Result<Self> {
        let analysis = AnalysisService::new(Arc::clone(&tagger), &settings.analysis)?;
        let renderer = DraftRenderer::new(settings.draft.clone());
        Ok(Self {
            source,
            tagger,
            settings,
            analysis,
            renderer,
        })
    }

    /// Reads the last `days_back` days of records and produces a digest.
    pub async fn run(&self) -> Result<Digest> {
        let days_back = self.settings.sources.days_back;
        let window = Window::last_days(days_back);

        tracing::info!(source = self.source.name(), days_back, "reading records");
        let events = self.source.calendar_events(&window).await?;
        let messages = self.source.sent_messages(&window).await?;

        let analysis = match self.own_domain_service().await? {
            Some(service) => service.analyze(&events, &messages)?,
            None => self.analysis.analyze(&events, &messages)?,
        };
        let draft = self.renderer.render(&analysis, days_back);

        Ok(Digest { analysis, draft })
    }

    /// Builds a service that also excludes the account's own domain, when the
    /// settings do not name one and the source knows the user's address.
    async fn own_domain_service(&self) -> Result<Option<AnalysisService>> {
        if self.settings.analysis.own_domain.is_some() {
            return Ok(None);
        }

        let address = match self.source.user_address().await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(error = %e, "could not read the user's address");
                None
            }
        };
        let Some(label) = address
            .as_deref()
            .and_then(|a| Recipient::new(a).domain_label().map(str::to_string))
            .filter(|label| !label.is_empty())
        else {
            return Ok(None);
        };

        tracing::debug!(own_domain = %label, "excluding own domain");
        let mut analysis = self.settings.analysis.clone();
        analysis.own_domain = Some(label);
        Ok(Some(AnalysisService::new(
            Arc::clone(&self.tagger),
            &analysis,
        )?))
    }
}
