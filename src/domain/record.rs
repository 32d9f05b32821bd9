//! Input records supplied by the calendar and mail collaborators.
//!
//! Records are plain, read-only data. Missing text fields are represented as
//! empty strings so that every record can be analyzed without special cases.

use serde::{Deserialize, Serialize};

/// A calendar event in the analysis window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Meeting subject line.
    #[serde(default)]
    pub subject: String,
    /// Plain text of the event body (agenda, notes).
    #[serde(default)]
    pub body_text: String,
}

impl EventRecord {
    /// Creates an event with a subject and body.
    pub fn new(subject: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body_text: body_text.into(),
        }
    }

    /// Returns the text blob analyzed for this event: subject, a space, then body.
    pub fn text(&self) -> String {
        format!("{} {}", self.subject, self.body_text)
    }
}

/// A recipient of a sent message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Email address, possibly empty when the source could not resolve it.
    #[serde(default)]
    pub address: String,
}

impl Recipient {
    /// Creates a recipient from an address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Returns the first label of the address domain (`acme` for `x@acme.com`),
    /// or `None` when the address has no `@`.
    pub fn domain_label(&self) -> Option<&str> {
        let domain = self.address.split('@').nth(1)?;
        domain.split('.').next()
    }
}

/// A message from the sent-items folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message subject line.
    #[serde(default)]
    pub subject: String,
    /// Short plain-text preview of the body.
    #[serde(default)]
    pub body_preview: String,
    /// Primary recipients.
    #[serde(default)]
    pub to: Vec<Recipient>,
    /// Carbon copy recipients.
    #[serde(default)]
    pub cc: Vec<Recipient>,
}

impl MessageRecord {
    /// Creates a message with no recipients.
    pub fn new(subject: impl Into<String>, body_preview: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body_preview: body_preview.into(),
            to: Vec::new(),
            cc: Vec::new(),
        }
    }

    /// Adds a primary recipient.
    pub fn with_to(mut self, address: impl Into<String>) -> Self {
        self.to.push(Recipient::new(address));
        self
    }

    /// Adds a carbon copy recipient.
    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(Recipient::new(address));
        self
    }

    /// Returns the text blob analyzed for this message: subject, a space, then preview.
    pub fn text(&self) -> String {
        format!("{} {}", self.subject, self.body_preview)
    }

    /// Iterates over `to` then `cc` recipients.
    pub fn recipients(&self) -> impl Iterator<Item = &Recipient> {
        self.to.iter().chain(self.cc.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_text_joins_subject_and_body() {
        let event = EventRecord::new("Acme sync", "Agenda: rollout");
        assert_eq!(event.text(), "Acme sync Agenda: rollout");
    }

    #[test]
    fn empty_event_text_is_a_single_space() {
        assert_eq!(EventRecord::default().text(), " ");
    }

    #[test]
    fn domain_label_takes_first_label_after_at() {
        assert_eq!(Recipient::new("x@acme.com").domain_label(), Some("acme"));
        assert_eq!(
            Recipient::new("jo@eu.globex.co.uk").domain_label(),
            Some("eu")
        );
        assert_eq!(Recipient::new("localpart@host").domain_label(), Some("host"));
        assert_eq!(Recipient::new("no-at-sign").domain_label(), None);
    }

    #[test]
    fn recipients_chain_to_then_cc() {
        let message = MessageRecord::new("s", "p")
            .with_cc("c@cc.com")
            .with_to("t@to.com");
        let addresses: Vec<_> = message.recipients().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["t@to.com", "c@cc.com"]);
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let message: MessageRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(message.subject, "");
        assert_eq!(message.body_preview, "");
        assert!(message.to.is_empty());
    }
}
