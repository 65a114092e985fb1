//! Daily reset of weekly routine entries.
//!
//! A completion mark from a previous week must not still read as "done" the
//! next time its day comes around. The check compares calendar dates, not
//! days of the week: completing an entry today keeps it completed for every
//! read made today.

use chrono::NaiveDate;

use crate::model::{RoutineEntry, RoutineUpdate};

/// Order a day's entries and reset the stale ones.
///
/// Entries are ordered by time label ascending (lexicographic), id ascending
/// on ties. Any entry with `completed = true` whose `last_completed` is not
/// `today` comes back un-completed with the date cleared, and one reset
/// update is emitted for it. The caller must apply the updates to the store
/// for the invariant to hold on direct reads.
///
/// `today` is injected rather than read from a wall clock.
pub fn resolve_day(
    mut entries: Vec<RoutineEntry>,
    today: NaiveDate,
) -> (Vec<RoutineEntry>, Vec<RoutineUpdate>) {
    entries.sort_by(|a, b| a.time_label.cmp(&b.time_label).then(a.id.cmp(&b.id)));

    let today = today.format("%Y-%m-%d").to_string();
    let mut updates = Vec::new();

    for entry in &mut entries {
        if entry.completed && entry.last_completed != today {
            entry.completed = false;
            entry.last_completed.clear();
            updates.push(RoutineUpdate::reset(entry.id));
        }
    }

    (entries, updates)
}
