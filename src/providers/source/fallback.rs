//! Source that falls back to a second source when the first one fails.

use std::sync::Arc;

use async_trait::async_trait;

use super::{RecordSource, Result, Window};
use crate::domain::{EventRecord, MessageRecord};

/// Tries `primary`, then `secondary` on error.
///
/// Each call falls back independently, so calendar and mail may come from
/// different sources in one run.
pub struct FallbackSource {
    primary: Arc<dyn RecordSource>,
    secondary: Arc<dyn RecordSource>,
}

impl FallbackSource {
    pub fn new(primary: Arc<dyn RecordSource>, secondary: Arc<dyn RecordSource>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl RecordSource for FallbackSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn calendar_events(&self, window: &Window) -> Result<Vec<EventRecord>> {
        match self.primary.calendar_events(window).await {
            Ok(events) => Ok(events),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %e,
                    "calendar read failed, falling back"
                );
                self.secondary.calendar_events(window).await
            }
        }
    }

    async fn sent_messages(&self, window: &Window) -> Result<Vec<MessageRecord>> {
        match self.primary.sent_messages(window).await {
            Ok(messages) => Ok(messages),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %e,
                    "sent mail read failed, falling back"
                );
                self.secondary.sent_messages(window).await
            }
        }
    }

    async fn user_address(&self) -> Result<Option<String>> {
        match self.primary.user_address().await {
            Ok(Some(address)) => Ok(Some(address)),
            Ok(None) | Err(_) => self.secondary.user_address().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::source::SourceError;

    struct Failing;

    #[async_trait]
    impl RecordSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn calendar_events(&self, _window: &Window) -> Result<Vec<EventRecord>> {
            Err(SourceError::Connection("offline".to_string()))
        }

        async fn sent_messages(&self, _window: &Window) -> Result<Vec<MessageRecord>> {
            Err(SourceError::Connection("offline".to_string()))
        }
    }

    struct Fixed;

    #[async_trait]
    impl RecordSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn calendar_events(&self, _window: &Window) -> Result<Vec<EventRecord>> {
            Ok(vec![EventRecord::new("Acme sync", "")])
        }

        async fn sent_messages(&self, _window: &Window) -> Result<Vec<MessageRecord>> {
            Ok(vec![MessageRecord::new("Acme", "")])
        }

        async fn user_address(&self) -> Result<Option<String>> {
            Ok(Some("me@initech.com".to_string()))
        }
    }

    #[tokio::test]
    async fn falls_back_on_primary_error() {
        let source = FallbackSource::new(Arc::new(Failing), Arc::new(Fixed));
        let window = Window::last_days(30);

        assert_eq!(source.calendar_events(&window).await.unwrap().len(), 1);
        assert_eq!(source.sent_messages(&window).await.unwrap().len(), 1);
        assert_eq!(
            source.user_address().await.unwrap().as_deref(),
            Some("me@initech.com")
        );
    }

    #[tokio::test]
    async fn surfaces_secondary_error() {
        let source = FallbackSource::new(Arc::new(Failing), Arc::new(Failing));
        let err = source
            .calendar_events(&Window::last_days(30))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Connection(_)));
    }
}
