//! Entity frequency tables.
//!
//! A [`Tally`] maps an entity name to a count. [`EntityTally`] groups the four
//! tables produced by one analysis run. Both are created fresh per run and
//! only ever grow while it is in progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The four entity categories tracked during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Companies and other organizations (candidate customers).
    Organizations,
    /// Keyword topics from the configured vocabulary.
    Topics,
    /// Initiative names matched by the project patterns.
    Projects,
    /// People named in the text.
    People,
}

impl EntityKind {
    /// All categories, in table order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Organizations,
        EntityKind::Topics,
        EntityKind::Projects,
        EntityKind::People,
    ];
}

/// Frequency table for one entity category.
///
/// Keys are kept sorted so iteration, serialization and equality never depend
/// on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, u32>);

impl Tally {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments `name` by `amount`.
    pub fn add(&mut self, name: impl Into<String>, amount: u32) {
        *self.0.entry(name.into()).or_insert(0) += amount;
    }

    /// Returns the count for `name`, zero when absent.
    pub fn get(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Returns whether `name` has been counted.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of distinct entities.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Adds every count of `other` into this table.
    pub fn absorb(&mut self, other: Tally) {
        for (name, count) in other.0 {
            self.add(name, count);
        }
    }

    /// Returns the `limit` highest entries, count descending then name ascending.
    pub fn most_common(&self, limit: usize) -> Vec<(&str, u32)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Tally {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for (name, count) in iter {
            tally.add(name, count);
        }
        tally
    }
}

/// The four frequency tables of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTally {
    /// Organization counts.
    pub organizations: Tally,
    /// Topic keyword counts.
    pub topics: Tally,
    /// Project/initiative counts.
    pub projects: Tally,
    /// Person counts.
    pub people: Tally,
}

impl EntityTally {
    /// Creates an empty set of tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for a category.
    pub fn get(&self, kind: EntityKind) -> &Tally {
        match kind {
            EntityKind::Organizations => &self.organizations,
            EntityKind::Topics => &self.topics,
            EntityKind::Projects => &self.projects,
            EntityKind::People => &self.people,
        }
    }

    /// Returns the mutable table for a category.
    pub fn get_mut(&mut self, kind: EntityKind) -> &mut Tally {
        match kind {
            EntityKind::Organizations => &mut self.organizations,
            EntityKind::Topics => &mut self.topics,
            EntityKind::Projects => &mut self.projects,
            EntityKind::People => &mut self.people,
        }
    }

    /// Consumes the tables and returns them in [`EntityKind::ALL`] order.
    pub fn into_tables(self) -> [(EntityKind, Tally); 4] {
        [
            (EntityKind::Organizations, self.organizations),
            (EntityKind::Topics, self.topics),
            (EntityKind::Projects, self.projects),
            (EntityKind::People, self.people),
        ]
    }

    /// Returns whether all four tables are empty.
    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|kind| self.get(*kind).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates() {
        let mut tally = Tally::new();
        tally.add("Acme", 1);
        tally.add("Acme", 2);
        assert_eq!(tally.get("Acme"), 3);
        assert_eq!(tally.get("Globex"), 0);
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn most_common_breaks_ties_by_name() {
        let tally: Tally = [("Initech", 2), ("Acme", 2), ("Globex", 5), ("Hooli", 1)]
            .into_iter()
            .collect();

        let top = tally.most_common(3);
        assert_eq!(top, vec![("Globex", 5), ("Acme", 2), ("Initech", 2)]);
    }

    #[test]
    fn absorb_sums_overlapping_keys() {
        let mut left: Tally = [("Acme", 1), ("Globex", 2)].into_iter().collect();
        let right: Tally = [("Acme", 3), ("Hooli", 4)].into_iter().collect();
        left.absorb(right);

        assert_eq!(left.get("Acme"), 4);
        assert_eq!(left.get("Globex"), 2);
        assert_eq!(left.get("Hooli"), 4);
    }

    #[test]
    fn entity_tally_accessors_address_the_same_table() {
        let mut tally = EntityTally::new();
        tally.get_mut(EntityKind::Topics).add("gpu", 2);
        assert_eq!(tally.topics.get("gpu"), 2);
        assert!(tally.get(EntityKind::People).is_empty());
        assert!(!tally.is_empty());
    }

    #[test]
    fn tally_serializes_as_plain_map() {
        let tally: Tally = [("b", 1), ("a", 2)].into_iter().collect();
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"a":2,"b":1}"#);
    }
}
