//! Offline source backed by Graph-shaped JSON exports.
//!
//! Each file holds either a Graph collection response (`{"value": [...]}`) or a
//! bare array of the same objects. Records are returned in file order and are
//! assumed to be already windowed and sorted newest first.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::graph::{GraphEvent, GraphMessage, Page};
use super::{RecordSource, Result, SourceError, Window};
use crate::domain::{EventRecord, MessageRecord};

#[derive(Deserialize)]
#[serde(untagged)]
enum Export<T> {
    Page(Page<T>),
    List(Vec<T>),
}

impl<T> Export<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Export::Page(page) => page.value,
            Export::List(items) => items,
        }
    }
}

/// Reads records from exported JSON files. A missing path means no records.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    calendar_path: Option<PathBuf>,
    mail_path: Option<PathBuf>,
}

impl JsonFileSource {
    /// Creates a source from optional calendar and mail export paths.
    pub fn new(calendar_path: Option<PathBuf>, mail_path: Option<PathBuf>) -> Self {
        Self {
            calendar_path,
            mail_path,
        }
    }
}

async fn read_export<T>(path: &Path) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let raw = tokio::fs::read_to_string(path).await?;
    let export: Export<T> = serde_json::from_str(&raw)
        .map_err(|e| SourceError::Parse(format!("{}: {}", path.display(), e)))?;
    Ok(export.into_items())
}

#[async_trait]
impl RecordSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn calendar_events(&self, _window: &Window) -> Result<Vec<EventRecord>> {
        let Some(path) = &self.calendar_path else {
            return Ok(Vec::new());
        };
        let events: Vec<GraphEvent> = read_export(path).await?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    async fn sent_messages(&self, _window: &Window) -> Result<Vec<MessageRecord>> {
        let Some(path) = &self.mail_path else {
            return Ok(Vec::new());
        };
        let messages: Vec<GraphMessage> = read_export(path).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Recipient;

    #[tokio::test]
    async fn reads_page_and_bare_array_exports() {
        let dir = tempfile::tempdir().unwrap();
        let calendar = dir.path().join("calendar.json");
        let mail = dir.path().join("mail.json");
        std::fs::write(
            &calendar,
            r#"{"value": [{"subject": "Acme POC kickoff", "body": {"content": ""}}]}"#,
        )
        .unwrap();
        std::fs::write(
            &mail,
            r#"[{"subject": "Follow up", "bodyPreview": "Hi.", "toRecipients": [{"emailAddress": {"address": "x@acme.com"}}]}]"#,
        )
        .unwrap();

        let source = JsonFileSource::new(Some(calendar), Some(mail));
        let window = Window::last_days(30);

        let events = source.calendar_events(&window).await.unwrap();
        assert_eq!(events, vec![EventRecord::new("Acme POC kickoff", "")]);

        let messages = source.sent_messages(&window).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, vec![Recipient::new("x@acme.com")]);
    }

    #[tokio::test]
    async fn missing_paths_yield_no_records() {
        let source = JsonFileSource::default();
        let window = Window::last_days(7);
        assert!(source.calendar_events(&window).await.unwrap().is_empty());
        assert!(source.sent_messages(&window).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_export_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let mail = dir.path().join("mail.json");
        std::fs::write(&mail, "{\"value\": 3}").unwrap();

        let source = JsonFileSource::new(None, Some(mail));
        let err = source.sent_messages(&Window::last_days(7)).await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
