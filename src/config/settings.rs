//! Application settings and configuration types.
//!
//! Settings are persisted to `~/.config/topfive/settings.json` (or the platform
//! equivalent) and loaded at startup. A missing file means defaults.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Case-insensitive project-type token, optional preposition, then a name.
pub const PROJECT_PATTERN_LEADING: &str =
    r"(?i)(poc|pov|pilot|proof of (?:concept|value))\s+(?:for|with|at)?\s+([A-Z][a-zA-Z\s]+)";

/// Case-insensitive name followed by a project-type token.
pub const PROJECT_PATTERN_TRAILING: &str = r"(?i)([A-Z][a-zA-Z\s]+)\s+(?:poc|pov|pilot)";

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("serialize error: {0}")]
    Serialize(serde_json::Error),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Entity extraction and ranking parameters.
    pub analysis: AnalysisSettings,
    /// Data source configuration.
    pub sources: SourceSettings,
    /// Draft rendering configuration.
    pub draft: DraftSettings,
    /// Built-in tagger configuration.
    pub tagger: TaggerSettings,
}

impl Settings {
    /// Returns the default settings file location.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let dirs = ProjectDirs::from("", "", "topfive").ok_or(SettingsError::NoConfigDir)?;
        Ok(dirs.config_dir().join("settings.json"))
    }

    /// Loads settings from `path`, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes settings to `path` as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Entity extraction and ranking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Lower-case topic vocabulary, matched as substrings.
    pub topic_keywords: Vec<String>,
    /// Recipient domain labels never counted as organizations.
    pub excluded_domains: Vec<String>,
    /// The account's own domain label, excluded alongside `excluded_domains`.
    pub own_domain: Option<String>,
    /// Per-source increments for tagged organizations and topics.
    pub weights: SourceWeights,
    /// Organizations considered before context filtering.
    pub candidate_pool: usize,
    /// Records scanned per source during context search.
    pub context_window: usize,
    /// Maximum snippets attached to an item.
    pub max_snippets: usize,
    /// Maximum snippets taken from a single message.
    pub max_snippets_per_message: usize,
    /// Final number of ranked items.
    pub top_n: usize,
    /// Regular expressions whose capture groups name a project.
    pub project_patterns: Vec<String>,
    /// How organization and person names are keyed.
    pub normalization: Normalization,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            topic_keywords: [
                "poc",
                "pov",
                "proof of concept",
                "proof of value",
                "pilot",
                "kubernetes",
                "k8s",
                "gpu",
                "inference",
                "training",
                "ml",
                "ai",
                "deployment",
                "integration",
                "testing",
                "validation",
                "demo",
                "ebc",
                "technical review",
                "architecture",
                "platform",
                "scheduler",
                "workload",
                "cluster",
                "node",
                "container",
                "docker",
                "ray",
                "distributed",
                "optimization",
                "efficiency",
                "performance",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            excluded_domains: ["gmail", "outlook", "hotmail"]
                .into_iter()
                .map(String::from)
                .collect(),
            own_domain: None,
            weights: SourceWeights::default(),
            candidate_pool: 10,
            context_window: 50,
            max_snippets: 5,
            max_snippets_per_message: 1,
            top_n: 7,
            project_patterns: vec![
                PROJECT_PATTERN_LEADING.to_string(),
                PROJECT_PATTERN_TRAILING.to_string(),
            ],
            normalization: Normalization::Raw,
        }
    }
}

impl AnalysisSettings {
    /// Returns whether a recipient domain label is excluded from organization counts.
    pub fn is_excluded_domain(&self, label: &str) -> bool {
        self.excluded_domains
            .iter()
            .chain(self.own_domain.iter())
            .any(|excluded| excluded.eq_ignore_ascii_case(label))
    }
}

/// Increments applied to tagged organizations and topic hits, by source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    /// Calendar event weight.
    pub calendar: u32,
    /// Sent mail weight.
    pub mail: u32,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            calendar: 1,
            mail: 2,
        }
    }
}

/// How entity names are turned into tally keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Use the text verbatim.
    #[default]
    Raw,
    /// Trim surrounding whitespace and lower-case.
    CaseFoldTrim,
}

impl Normalization {
    /// Applies the normalization to an entity name.
    pub fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            Normalization::Raw => Cow::Borrowed(name),
            Normalization::CaseFoldTrim => Cow::Owned(name.trim().to_lowercase()),
        }
    }
}

/// Data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Length of the analysis window in days.
    pub days_back: u32,
    /// Microsoft Graph API base URL.
    pub graph_base_url: String,
    /// Page size requested from the Graph API.
    pub page_size: u32,
    /// Outlook for Mac profile name.
    pub outlook_profile: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            days_back: 30,
            graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
            page_size: 999,
            outlook_profile: "Main Profile".to_string(),
        }
    }
}

/// Draft rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftSettings {
    /// Text before the item names in the subject line.
    pub subject_prefix: String,
    /// Subject suffix used when there are no items.
    pub fallback_subject: String,
    /// First line of the body.
    pub header: String,
    /// Item names listed in the subject.
    pub subject_names: usize,
    /// Context lines rendered per item.
    pub context_lines: usize,
    /// Directory where drafts are saved.
    pub output_dir: PathBuf,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            subject_prefix: "Top 5 Things".to_string(),
            fallback_subject: "Monthly Update".to_string(),
            header: "Industry Business Development / Account Updates".to_string(),
            subject_names: 3,
            context_lines: 3,
            output_dir: PathBuf::from("./output"),
        }
    }
}

/// Built-in tagger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerSettings {
    /// Known organization names.
    pub organizations: Vec<String>,
    /// Known person names.
    pub people: Vec<String>,
    /// Whether to add the suffix/honorific heuristics.
    pub heuristics: bool,
}

impl Default for TaggerSettings {
    fn default() -> Self {
        Self {
            organizations: Vec::new(),
            people: Vec::new(),
            heuristics: true,
        }
    }
}
