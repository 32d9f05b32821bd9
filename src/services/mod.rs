//! Business services layer.
//!
//! This module contains the analysis pipeline and the services that feed it
//! and consume its output.
//!
//! # Architecture
//!
//! ```text
//!  RecordSource ──> EntityExtractor ──> combine ──> ContextRanker ──> DraftRenderer
//!   (providers)      (per source)      (sum)       (top items)        (subject/body)
//! ```
//!
//! # Services Overview
//!
//! - [`AnalysisService`]: pure, synchronous extract → combine → rank pipeline
//! - [`DraftRenderer`]: turns an [`AnalysisResult`](crate::domain::AnalysisResult) into a draft
//! - [`DigestService`]: reads a source, analyzes and renders in one call

mod aggregator;
mod analysis_service;
mod digest_service;
mod draft_service;
mod extractor;
mod ranker;

pub use aggregator::combine;
pub use analysis_service::AnalysisService;
pub use digest_service::{Digest, DigestError, DigestService};
pub use draft_service::DraftRenderer;
pub use extractor::{AnalysisError, EntityExtractor};
pub use ranker::{ContextRanker, MEETING_PREFIX};
