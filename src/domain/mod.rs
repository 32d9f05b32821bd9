//! Domain layer types for topfive.
//!
//! This module contains the plain data types that flow through the analysis
//! pipeline: input records, entity tallies, ranked results and drafts.

mod draft;
mod record;
mod report;
mod tally;

pub use draft::{Draft, DraftMetadata};
pub use record::{EventRecord, MessageRecord, Recipient};
pub use report::{AnalysisResult, ItemType, TopItem};
pub use tally::{EntityKind, EntityTally, Tally};
