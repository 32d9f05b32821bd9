//! Merging of per-source entity tallies.

use crate::domain::EntityTally;

/// Sums two tallies category by category.
///
/// An entity present on one side only keeps its count. Source weights are
/// applied during extraction, so this is a plain sum.
pub fn combine(calendar: EntityTally, mail: EntityTally) -> EntityTally {
    let mut combined = calendar;
    for (kind, table) in mail.into_tables() {
        combined.get_mut(kind).absorb(table);
    }
    combined
}
