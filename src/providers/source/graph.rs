//! Microsoft Graph API source.
//!
//! Reads the signed-in user's calendar view and sent items through the Graph
//! REST API with a bearer token. Acquiring the token (OAuth device flow or
//! similar) is the caller's job; see [`crate::storage::KeychainAccess`] for
//! where the CLI keeps it.
//!
//! # API Usage
//!
//! - `GET /me` for the user's address
//! - `GET /me/calendarview` for events in the window
//! - `GET /me/mailFolders/SentItems/messages` for sent mail
//!
//! List endpoints are paged; every `@odata.nextLink` is followed until the
//! last page.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use serde::Deserialize;
use url::Url;

use super::{RecordSource, Result, SourceError, Window};
use crate::domain::{EventRecord, MessageRecord, Recipient};

const EVENT_FIELDS: &str = "subject,start,end,attendees,organizer,body";
const MESSAGE_FIELDS: &str = "subject,sentDateTime,toRecipients,ccRecipients,body,bodyPreview";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
pub(super) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Graph item body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GraphBody {
    content_type: Option<String>,
    content: Option<String>,
}

impl GraphBody {
    /// Returns the body as plain text, stripping markup from HTML bodies.
    fn into_text(self) -> String {
        let content = self.content.unwrap_or_default();
        let is_html = self
            .content_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("html"));
        if is_html {
            strip_html(&content)
        } else {
            content
        }
    }
}

/// Graph calendar event.
#[derive(Debug, Deserialize)]
pub(super) struct GraphEvent {
    subject: Option<String>,
    body: Option<GraphBody>,
}

impl From<GraphEvent> for EventRecord {
    fn from(event: GraphEvent) -> Self {
        EventRecord {
            subject: event.subject.unwrap_or_default(),
            body_text: event.body.map(GraphBody::into_text).unwrap_or_default(),
        }
    }
}

/// Graph email address.
#[derive(Debug, Deserialize)]
pub(super) struct GraphEmailAddress {
    address: Option<String>,
}

/// Graph recipient wrapper.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GraphRecipient {
    email_address: Option<GraphEmailAddress>,
}

impl From<GraphRecipient> for Recipient {
    fn from(recipient: GraphRecipient) -> Self {
        Recipient::new(
            recipient
                .email_address
                .and_then(|e| e.address)
                .unwrap_or_default(),
        )
    }
}

/// Graph message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GraphMessage {
    subject: Option<String>,
    body_preview: Option<String>,
    #[serde(default)]
    to_recipients: Vec<GraphRecipient>,
    #[serde(default)]
    cc_recipients: Vec<GraphRecipient>,
}

impl From<GraphMessage> for MessageRecord {
    fn from(message: GraphMessage) -> Self {
        MessageRecord {
            subject: message.subject.unwrap_or_default(),
            body_preview: message.body_preview.unwrap_or_default(),
            to: message.to_recipients.into_iter().map(Into::into).collect(),
            cc: message.cc_recipients.into_iter().map(Into::into).collect(),
        }
    }
}

/// Graph user profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    mail: Option<String>,
    user_principal_name: Option<String>,
}

/// Microsoft Graph record source.
pub struct GraphSource {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    page_size: u32,
}

impl GraphSource {
    /// Creates a source for the given API base URL and bearer token.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            page_size: 999,
        }
    }

    /// Sets the page size requested per call.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Builds the calendar view URL for a window.
    pub fn calendar_url(&self, window: &Window) -> Result<Url> {
        let start = window.start.format(DATE_FORMAT).to_string();
        let end = window.end.format(DATE_FORMAT).to_string();
        let top = self.page_size.to_string();
        self.url(
            "/me/calendarview",
            &[
                ("startDateTime", start.as_str()),
                ("endDateTime", end.as_str()),
                ("$top", top.as_str()),
                ("$select", EVENT_FIELDS),
                ("$orderby", "start/dateTime desc"),
            ],
        )
    }

    /// Builds the sent items URL for a window.
    pub fn sent_messages_url(&self, window: &Window) -> Result<Url> {
        let filter = format!("sentDateTime ge {}", window.start.format(DATE_FORMAT));
        let top = self.page_size.to_string();
        self.url(
            "/me/mailFolders/SentItems/messages",
            &[
                ("$filter", filter.as_str()),
                ("$top", top.as_str()),
                ("$select", MESSAGE_FIELDS),
                ("$orderby", "sentDateTime desc"),
            ],
        )
    }

    fn url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, endpoint);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|e| SourceError::Internal(format!("invalid URL: {}", e)))
    }

    /// Builds authorization headers for API requests.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.access_token))
                .map_err(|e| SourceError::Authentication(format!("invalid token: {}", e)))?,
        );
        Ok(headers)
    }

    /// Makes an authenticated GET request and decodes the JSON response.
    async fn get<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), retry_after, body));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }

    /// Fetches every page of a collection, starting at `first`.
    async fn get_all<T: for<'de> Deserialize<'de>>(&self, first: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let page: Page<T> = self.get(url).await?;
            pages += 1;
            items.extend(page.value);
            next = page
                .next_link
                .map(|link| Url::parse(&link))
                .transpose()
                .map_err(|e| SourceError::Parse(format!("invalid nextLink: {}", e)))?;
        }

        tracing::debug!(pages, items = items.len(), "Graph collection fetched");
        Ok(items)
    }
}

#[async_trait]
impl RecordSource for GraphSource {
    fn name(&self) -> &str {
        "graph"
    }

    async fn calendar_events(&self, window: &Window) -> Result<Vec<EventRecord>> {
        let events: Vec<GraphEvent> = self.get_all(self.calendar_url(window)?).await?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    async fn sent_messages(&self, window: &Window) -> Result<Vec<MessageRecord>> {
        let messages: Vec<GraphMessage> = self.get_all(self.sent_messages_url(window)?).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn user_address(&self) -> Result<Option<String>> {
        let user: GraphUser = self.get(self.url("/me", &[])?).await?;
        Ok(user.mail.or(user.user_principal_name))
    }
}

/// Maps a non-success HTTP status to a source error.
fn status_error(status: u16, retry_after_secs: Option<u64>, body: String) -> SourceError {
    match status {
        401 | 403 => SourceError::Authentication(body),
        404 => SourceError::NotFound(body),
        429 => SourceError::RateLimited { retry_after_secs },
        _ => SourceError::Api {
            status,
            message: body,
        },
    }
}

fn markup_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<style.*?</style>|<script.*?</script>|<[^>]*>").unwrap())
}

/// Reduces an HTML body to whitespace-collapsed text.
fn strip_html(html: &str) -> String {
    markup_pattern()
        .replace_all(html, " ")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
