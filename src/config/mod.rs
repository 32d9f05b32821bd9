//! Configuration and settings management.
//!
//! This module provides application settings types and persistence.
//! Settings are stored in the user's config directory as JSON.

mod settings;

pub use settings::{
    AnalysisSettings, DraftSettings, Normalization, Settings, SettingsError, SourceSettings,
    SourceWeights, TaggerSettings, PROJECT_PATTERN_LEADING, PROJECT_PATTERN_TRAILING,
};
