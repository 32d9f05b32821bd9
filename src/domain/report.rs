//! Analysis output types.

use serde::{Deserialize, Serialize};

use super::EntityTally;

/// Classification of a ranked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// An external organization the user is actively engaged with.
    #[default]
    Customer,
}

/// A ranked organization with the text evidence that mentions it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopItem {
    /// Organization name as it appears in the tally.
    pub name: String,
    /// Item classification.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Combined weighted frequency. Always positive.
    pub frequency: u32,
    /// Context snippets, meeting snippets first.
    pub context: Vec<String>,
}

impl TopItem {
    /// Creates a customer item.
    pub fn customer(name: impl Into<String>, frequency: u32, context: Vec<String>) -> Self {
        Self {
            name: name.into(),
            item_type: ItemType::Customer,
            frequency,
            context,
        }
    }
}

/// The complete result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Ranked items, frequency descending.
    pub top_items: Vec<TopItem>,
    /// Number of calendar events supplied.
    pub calendar_count: usize,
    /// Number of sent messages supplied.
    pub email_count: usize,
    /// Combined entity tables.
    pub entities: EntityTally,
}
