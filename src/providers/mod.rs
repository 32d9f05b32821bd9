//! External collaborator implementations.
//!
//! This module contains the traits and implementations the analysis depends on:
//!
//! - [`tagger`] - Named-entity taggers (gazetteer, heuristics)
//! - [`source`] - Calendar and sent-mail sources (Graph API, Outlook local, JSON)

pub mod source;
pub mod tagger;
