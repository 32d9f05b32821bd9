//! Calendar and sent-mail sources.
//!
//! Sources are the collaborators that supply records to the analysis. Each
//! implements [`RecordSource`].
//!
//! # Supported Sources
//!
//! - **Graph**: Microsoft Graph REST API with a bearer token
//! - **Outlook local**: Outlook for Mac's profile database, read-only
//! - **JSON file**: Graph-shaped exports for offline runs
//! - **Fallback**: tries one source, then another

mod fallback;
mod graph;
mod json_file;
mod outlook;
mod traits;

pub use fallback::FallbackSource;
pub use graph::GraphSource;
pub use json_file::JsonFileSource;
pub use outlook::OutlookLocalSource;
pub use traits::{RecordSource, Result, SourceError, Window};
