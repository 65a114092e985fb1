//! Task filtering and ordering.
//!
//! Pure over the task list handed in; fetching rows is the store's job and
//! rendering them is the caller's.

use crate::levels::Level;
use crate::model::Task;

/// Row ordering for task queries.
///
/// Level sorts break ties by id descending, so the newest task wins within a
/// level. `Date` is id descending alone: ids are assigned monotonically, so
/// this is insertion order, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    ImportanceDesc,
    ImportanceAsc,
    EffortAsc,
    EffortDesc,
    #[default]
    Date,
}

impl SortMode {
    /// Parse a sort key coming from the presentation layer.
    ///
    /// Unknown keys fall back to `Date` instead of failing; the query must
    /// stay answerable even when a caller sends a stale key.
    pub fn from_key(key: &str) -> SortMode {
        match key {
            "importance_desc" => SortMode::ImportanceDesc,
            "importance_asc" => SortMode::ImportanceAsc,
            "effort_asc" => SortMode::EffortAsc,
            "effort_desc" => SortMode::EffortDesc,
            _ => SortMode::Date,
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            SortMode::ImportanceDesc => "importance_desc",
            SortMode::ImportanceAsc => "importance_asc",
            SortMode::EffortAsc => "effort_asc",
            SortMode::EffortDesc => "effort_desc",
            SortMode::Date => "date",
        }
    }
}

/// Filter and ordering options for one folder's tasks.
///
/// All supplied filters AND together. An empty list or unset flag imposes no
/// constraint; the list filters are set-membership tests.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub done: Option<bool>,
    pub tags: Vec<String>,
    pub importance: Vec<Level>,
    pub effort: Vec<Level>,
    pub sort: SortMode,
}

impl TaskQuery {
    fn matches(&self, task: &Task) -> bool {
        if let Some(done) = self.done {
            if task.done != done {
                return false;
            }
        }
        if !self.tags.is_empty() {
            match task.tag.as_deref() {
                Some(tag) if self.tags.iter().any(|t| t == tag) => {}
                _ => return false,
            }
        }
        if !self.importance.is_empty() && !self.importance.contains(&task.importance) {
            return false;
        }
        if !self.effort.is_empty() && !self.effort.contains(&task.effort) {
            return false;
        }
        true
    }
}

/// Filter and order a folder's tasks.
///
/// No side effects; an empty input or no match yields an empty vec.
pub fn apply(tasks: Vec<Task>, query: &TaskQuery) -> Vec<Task> {
    let mut tasks: Vec<Task> = tasks.into_iter().filter(|t| query.matches(t)).collect();
    sort(&mut tasks, query.sort);
    tasks
}

fn sort(tasks: &mut [Task], mode: SortMode) {
    match mode {
        SortMode::ImportanceDesc => {
            tasks.sort_by(|a, b| b.importance.cmp(&a.importance).then(b.id.cmp(&a.id)))
        }
        SortMode::ImportanceAsc => {
            tasks.sort_by(|a, b| a.importance.cmp(&b.importance).then(b.id.cmp(&a.id)))
        }
        SortMode::EffortAsc => {
            tasks.sort_by(|a, b| a.effort.cmp(&b.effort).then(b.id.cmp(&a.id)))
        }
        SortMode::EffortDesc => {
            tasks.sort_by(|a, b| b.effort.cmp(&a.effort).then(b.id.cmp(&a.id)))
        }
        SortMode::Date => tasks.sort_by(|a, b| b.id.cmp(&a.id)),
    }
}
