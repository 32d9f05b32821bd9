//! Rendering of analysis results into a status-update draft.

use chrono::Utc;

use super::ranker::MEETING_PREFIX;
use crate::config::DraftSettings;
use crate::domain::{AnalysisResult, Draft, DraftMetadata, TopItem};

const RULE_WIDTH: usize = 80;

/// Turns an [`AnalysisResult`] into subject and body text.
#[derive(Debug, Clone, Default)]
pub struct DraftRenderer {
    settings: DraftSettings,
}

impl DraftRenderer {
    pub fn new(settings: DraftSettings) -> Self {
        Self { settings }
    }

    /// Renders a draft covering the last `days_back` days.
    pub fn render(&self, result: &AnalysisResult, days_back: u32) -> Draft {
        Draft {
            subject: self.subject(&result.top_items),
            body: self.body(result, days_back),
            metadata: DraftMetadata {
                generated_at: Utc::now(),
                calendar_events_analyzed: result.calendar_count,
                emails_analyzed: result.email_count,
                items_count: result.top_items.len(),
            },
        }
    }

    /// Subject line naming the leading items.
    fn subject(&self, items: &[TopItem]) -> String {
        let mut names: Vec<&str> = Vec::new();
        for item in items.iter().take(self.settings.subject_names) {
            if !item.name.is_empty() && !names.contains(&item.name.as_str()) {
                names.push(&item.name);
            }
        }

        if names.is_empty() {
            format!(
                "{} - {}",
                self.settings.subject_prefix, self.settings.fallback_subject
            )
        } else {
            format!("{} - {}", self.settings.subject_prefix, names.join(" | "))
        }
    }

    fn body(&self, result: &AnalysisResult, days_back: u32) -> String {
        let mut lines = vec![self.settings.header.clone(), String::new()];

        for item in &result.top_items {
            lines.push(format!("{} -", item.name));

            if item.context.is_empty() {
                lines.push(format!(
                    "  Active engagement with {} interactions this month",
                    item.frequency
                ));
                lines.push("  [Add specific details about current activities and status]".to_string());
            }

            for snippet in item.context.iter().take(self.settings.context_lines) {
                let clean = snippet.replace("\r\n", " ").replace('\n', " ");
                let clean = clean.trim();
                if clean.is_empty() {
                    continue;
                }
                match clean.strip_prefix(MEETING_PREFIX.trim_end()) {
                    Some(meeting) => lines.push(format!(
                        "  Ongoing discussions and meetings: {}",
                        meeting.trim()
                    )),
                    None => lines.push(format!("  {}", clean)),
                }
            }

            lines.push(String::new());
        }

        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(format!(
            "Generated from {} calendar events and {} sent emails from the past {} days.",
            result.calendar_count, result.email_count, days_back
        ));
        lines.push(String::new());
        lines.push(
            "Note: Please review and add specific details, metrics, and action items for each entry."
                .to_string(),
        );

        lines.join("\n")
    }

    /// Formats a draft for the terminal.
    pub fn format_for_display(draft: &Draft) -> String {
        format!(
            "Subject: {}\n\n{}\n\n{}",
            draft.subject,
            "=".repeat(RULE_WIDTH),
            draft.body
        )
    }

    /// Formats a draft for saving, with a provenance trailer.
    pub fn format_for_file(draft: &Draft) -> String {
        let rule = "=".repeat(70);
        format!(
            "Subject: {subject}\n\n{rule}\n\n{body}\n\n{rule}\n\
             Generated: {generated}\n\
             Calendar events analyzed: {events}\n\
             Emails analyzed: {emails}\n\
             Top items identified: {items}\n",
            subject = draft.subject,
            rule = rule,
            body = draft.body,
            generated = draft.metadata.generated_at.to_rfc3339(),
            events = draft.metadata.calendar_events_analyzed,
            emails = draft.metadata.emails_analyzed,
            items = draft.metadata.items_count,
        )
    }
}
