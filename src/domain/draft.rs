//! Rendered status-update draft.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A status-update email draft ready for review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Details about the run that produced the draft.
    pub metadata: DraftMetadata,
}

/// Provenance of a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftMetadata {
    /// When the draft was rendered.
    pub generated_at: DateTime<Utc>,
    /// Calendar events the analysis read.
    pub calendar_events_analyzed: usize,
    /// Sent emails the analysis read.
    pub emails_analyzed: usize,
    /// Number of ranked items in the draft.
    pub items_count: usize,
}
