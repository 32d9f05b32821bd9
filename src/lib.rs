//! topfive - Drafts a "top accounts" status update from recent activity
//!
//! This crate reads a window of calendar events and sent mail, extracts the
//! organizations, topics, initiatives and people they mention, ranks the
//! organizations by weighted frequency and renders a status-update draft.

pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod storage;

pub use domain::{AnalysisResult, Draft, EventRecord, MessageRecord, TopItem};
pub use services::{AnalysisService, DigestService, DraftRenderer};
