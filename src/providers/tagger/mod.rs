//! Named-entity tagger implementations.
//!
//! The analysis pipeline depends only on the [`Tagger`] trait, so any
//! implementation that can label organizations and people can be plugged in.
//!
//! # Provided Taggers
//!
//! - [`GazetteerTagger`]: known-name lists, whole-word matches
//! - [`HeuristicTagger`]: corporate-suffix and honorific rules
//! - [`CompositeTagger`]: merges the spans of several taggers, one per mention

mod gazetteer;
mod heuristic;
mod traits;

pub use gazetteer::GazetteerTagger;
pub use heuristic::HeuristicTagger;
pub use traits::{
    CompositeTagger, SpanCategory, TaggedSpan, Tagger, TaggerError, TaggerResult,
};

#[cfg(test)]
pub use traits::MockTagger;

use crate::config::TaggerSettings;

/// Builds the tagger described by the settings.
pub fn from_settings(settings: &TaggerSettings) -> TaggerResult<CompositeTagger> {
    let mut tagger = CompositeTagger::new().with(GazetteerTagger::new(
        &settings.organizations,
        &settings.people,
    )?);
    if settings.heuristics {
        tagger = tagger.with(HeuristicTagger::new()?);
    }
    Ok(tagger)
}
