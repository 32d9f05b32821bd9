//! Credential and draft storage.
//!
//! - OS keychain integration for the Graph access token
//! - Draft text files in the configured output directory

mod draft_store;
mod keychain;

pub use draft_store::{DraftStore, DraftStoreError};
pub use keychain::{KeychainAccess, KeychainError};
