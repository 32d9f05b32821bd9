//! Entity tagger trait and supporting types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while tagging text.
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("tagging failed: {0}")]
    Failed(String),

    #[error("invalid tagger pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type for tagger operations.
pub type TaggerResult<T> = Result<T, TaggerError>;

/// Coarse semantic category of a tagged span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanCategory {
    /// A company, agency or institution.
    Organization,
    /// A person's name.
    Person,
    /// Anything else the tagger recognizes.
    Other,
}

/// A span of text labelled with a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSpan {
    /// The span text, verbatim.
    pub text: String,
    /// The span category.
    pub category: SpanCategory,
    /// Byte offset of the span in the tagged text, when the tagger knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
}

impl TaggedSpan {
    pub fn new(text: impl Into<String>, category: SpanCategory) -> Self {
        Self {
            text: text.into(),
            category,
            start: None,
        }
    }

    pub fn organization(text: impl Into<String>) -> Self {
        Self::new(text, SpanCategory::Organization)
    }

    pub fn person(text: impl Into<String>) -> Self {
        Self::new(text, SpanCategory::Person)
    }

    pub fn other(text: impl Into<String>) -> Self {
        Self::new(text, SpanCategory::Other)
    }

    /// Sets the byte offset of the span.
    pub fn at(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    /// Whether both spans cover the same text at the same known offset.
    fn same_mention(&self, other: &TaggedSpan) -> bool {
        self.start.is_some() && self.start == other.start && self.text == other.text
    }
}

/// Labels spans of free text with a coarse semantic category.
///
/// Implementations are loaded once by the caller and shared across runs.
/// An error aborts the whole analysis run that requested the tagging.
#[cfg_attr(test, mockall::automock)]
pub trait Tagger: Send + Sync {
    /// Tags every recognized span in `text`, in text order.
    fn tag(&self, text: &str) -> TaggerResult<Vec<TaggedSpan>>;
}

impl<T: Tagger + ?Sized> Tagger for Arc<T> {
    fn tag(&self, text: &str) -> TaggerResult<Vec<TaggedSpan>> {
        (**self).tag(text)
    }
}

impl<T: Tagger + ?Sized> Tagger for Box<T> {
    fn tag(&self, text: &str) -> TaggerResult<Vec<TaggedSpan>> {
        (**self).tag(text)
    }
}

/// Runs several taggers over the same text and concatenates their spans.
///
/// A span at the same offset and with the same text as an earlier span is one
/// mention and is dropped, whichever tagger produced it.
#[derive(Default)]
pub struct CompositeTagger {
    taggers: Vec<Box<dyn Tagger>>,
}

impl CompositeTagger {
    /// Creates an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tagger.
    pub fn with(mut self, tagger: impl Tagger + 'static) -> Self {
        self.taggers.push(Box::new(tagger));
        self
    }

    /// Number of taggers in the composite.
    pub fn len(&self) -> usize {
        self.taggers.len()
    }

    /// Returns whether the composite has no taggers.
    pub fn is_empty(&self) -> bool {
        self.taggers.is_empty()
    }
}

impl Tagger for CompositeTagger {
    fn tag(&self, text: &str) -> TaggerResult<Vec<TaggedSpan>> {
        let mut spans: Vec<TaggedSpan> = Vec::new();
        for tagger in &self.taggers {
            for span in tagger.tag(text)? {
                if !spans.iter().any(|seen| seen.same_mention(&span)) {
                    spans.push(span);
                }
            }
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_concatenates_in_order() {
        let mut first = MockTagger::new();
        first
            .expect_tag()
            .returning(|_| Ok(vec![TaggedSpan::organization("Acme")]));
        let mut second = MockTagger::new();
        second
            .expect_tag()
            .returning(|_| Ok(vec![TaggedSpan::person("Jane Doe")]));

        let composite = CompositeTagger::new().with(first).with(second);
        let spans = composite.tag("Jane Doe from Acme").unwrap();

        assert_eq!(
            spans,
            vec![TaggedSpan::organization("Acme"), TaggedSpan::person("Jane Doe")]
        );
    }

    #[test]
    fn composite_drops_repeated_mentions() {
        let mut first = MockTagger::new();
        first
            .expect_tag()
            .returning(|_| Ok(vec![TaggedSpan::organization("Globex Corp").at(0)]));
        let mut second = MockTagger::new();
        second.expect_tag().returning(|_| {
            Ok(vec![
                TaggedSpan::organization("Globex Corp").at(0),
                TaggedSpan::organization("Globex").at(0),
                TaggedSpan::organization("Globex Corp").at(20),
            ])
        });

        let composite = CompositeTagger::new().with(first).with(second);
        let spans = composite.tag("Globex Corp sync on Globex Corp").unwrap();

        assert_eq!(
            spans,
            vec![
                TaggedSpan::organization("Globex Corp").at(0),
                TaggedSpan::organization("Globex").at(0),
                TaggedSpan::organization("Globex Corp").at(20),
            ]
        );
    }

    #[test]
    fn spans_without_offsets_are_kept() {
        let mut first = MockTagger::new();
        first
            .expect_tag()
            .returning(|_| Ok(vec![TaggedSpan::organization("Acme")]));
        let mut second = MockTagger::new();
        second
            .expect_tag()
            .returning(|_| Ok(vec![TaggedSpan::organization("Acme")]));

        let composite = CompositeTagger::new().with(first).with(second);
        assert_eq!(composite.tag("Acme").unwrap().len(), 2);
    }

    #[test]
    fn composite_propagates_failure() {
        let mut failing = MockTagger::new();
        failing
            .expect_tag()
            .returning(|_| Err(TaggerError::Failed("model unavailable".to_string())));

        let composite = CompositeTagger::new().with(failing);
        assert!(matches!(
            composite.tag("anything"),
            Err(TaggerError::Failed(_))
        ));
    }

    #[test]
    fn empty_composite_tags_nothing() {
        let composite = CompositeTagger::new();
        assert!(composite.is_empty());
        assert!(composite.tag("Acme").unwrap().is_empty());
    }
}
