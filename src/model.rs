use serde::{Deserialize, Serialize};

use crate::levels::Level;
use crate::week::Weekday;

// Identifiers are assigned monotonically by the backing store, so id order
// doubles as insertion order.
pub type FolderId = i64;
pub type TaskId = i64;
pub type NoteId = i64;
pub type RoutineId = i64;

/// What a folder holds: tasks or notes, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    Todo,
    Note,
}

impl FolderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FolderKind::Todo => "todo",
            FolderKind::Note => "note",
        }
    }

    pub fn from_str(s: &str) -> Option<FolderKind> {
        match s {
            "todo" => Some(FolderKind::Todo),
            "note" => Some(FolderKind::Note),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub kind: FolderKind,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub folder_id: FolderId,
    pub text: String,
    pub done: bool,
    pub importance: Level,
    pub effort: Level,
    /// Creation stamp, already display-formatted (`%d %b, %H:%M`).
    pub created: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub folder_id: FolderId,
    pub title: String,
    pub content: String,
    /// Creation date, `%Y-%m-%d`.
    pub created: String,
}

/// A named, colored label. Task tags and folder tags live in independent
/// namespaces; the name is the unique key within its namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagNamespace {
    Task,
    Folder,
}

impl TagNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            TagNamespace::Task => "task",
            TagNamespace::Folder => "folder",
        }
    }
}

/// A recurring weekly task.
///
/// Invariant: `completed` is only ever true together with a non-empty
/// `last_completed`; the daily reset rule restores it when the stored date
/// goes stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineEntry {
    pub id: RoutineId,
    pub day: Weekday,
    /// Free-text time label, e.g. "08:30"; ordering is lexicographic.
    pub time_label: String,
    pub text: String,
    pub completed: bool,
    /// `%Y-%m-%d` of the last completion, empty if never completed or reset.
    #[serde(default)]
    pub last_completed: String,
}

/// Persistence write emitted by the reset rule for one stale entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineUpdate {
    pub id: RoutineId,
    pub completed: bool,
    pub last_completed: String,
}

impl RoutineUpdate {
    /// The reset write: un-complete and clear the completion date.
    pub fn reset(id: RoutineId) -> Self {
        Self {
            id,
            completed: false,
            last_completed: String::new(),
        }
    }
}
