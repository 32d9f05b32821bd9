//! Record source trait definition.
//!
//! A [`RecordSource`] supplies the calendar events and sent messages of an
//! analysis window. Sources return records newest first; the analysis caps
//! its context search by position, so ordering matters.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{EventRecord, MessageRecord};

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while reading records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Missing, expired or rejected credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// The remote API returned an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A response or file could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The backing store does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The time range records are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl Window {
    /// The `days` days ending now.
    pub fn last_days(days: u32) -> Self {
        Self::ending_at(Utc::now(), days)
    }

    /// The `days` days ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }

    /// Returns whether `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Supplies calendar events and sent messages.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Calendar events in the window, newest first.
    async fn calendar_events(&self, window: &Window) -> Result<Vec<EventRecord>>;

    /// Sent messages in the window, newest first.
    async fn sent_messages(&self, window: &Window) -> Result<Vec<MessageRecord>>;

    /// The account's own email address, when the source knows it.
    async fn user_address(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
