pub mod json;
pub mod migrations;
pub mod sqlite;

pub use json::JsonStore;
pub use sqlite::SqliteStore;

use crate::levels::{Level, LevelColors, Scale};
use crate::model::{
    Folder, FolderId, FolderKind, Note, NoteId, RoutineEntry, RoutineId, RoutineUpdate, Tag,
    TagNamespace, Task, TaskId,
};
use crate::settings::{AppSettings, BackendKind};
use crate::shared::errors::StorageResult;
use crate::shared::paths::ensure_dir;
use crate::week::Weekday;

/// Capability interface over the backing store.
///
/// Both backends implement the same surface, so the query engine and the
/// reset rule are written once against this trait instead of per backend.
/// Reads of empty or missing sets return empty collections; mutations on a
/// missing id fail with `StorageError::NotFound`.
pub trait Store {
    // Folders
    fn list_folders(&self, kind: FolderKind) -> StorageResult<Vec<Folder>>;
    fn insert_folder(
        &self,
        name: &str,
        kind: FolderKind,
        tag: Option<&str>,
    ) -> StorageResult<FolderId>;
    fn update_folder(&self, id: FolderId, name: &str, tag: Option<&str>) -> StorageResult<()>;
    /// Deletes the folder and all tasks and notes it owns.
    fn delete_folder(&self, id: FolderId) -> StorageResult<()>;

    // Tasks
    fn fetch_tasks(&self, folder_id: FolderId) -> StorageResult<Vec<Task>>;
    fn insert_task(
        &self,
        folder_id: FolderId,
        text: &str,
        importance: Level,
        effort: Level,
        created: &str,
        tag: Option<&str>,
    ) -> StorageResult<TaskId>;
    fn update_task(
        &self,
        id: TaskId,
        text: &str,
        importance: Level,
        effort: Level,
        tag: Option<&str>,
    ) -> StorageResult<()>;
    fn set_task_done(&self, id: TaskId, done: bool) -> StorageResult<()>;
    fn delete_task(&self, id: TaskId) -> StorageResult<()>;

    // Notes
    fn fetch_notes(&self, folder_id: FolderId) -> StorageResult<Vec<Note>>;
    fn insert_note(
        &self,
        folder_id: FolderId,
        title: &str,
        content: &str,
        created: &str,
    ) -> StorageResult<NoteId>;
    fn update_note(&self, id: NoteId, title: &str, content: &str) -> StorageResult<()>;
    fn delete_note(&self, id: NoteId) -> StorageResult<()>;

    // Routines
    fn fetch_routines(&self, day: Weekday) -> StorageResult<Vec<RoutineEntry>>;
    fn insert_routine(
        &self,
        day: Weekday,
        time_label: &str,
        text: &str,
    ) -> StorageResult<RoutineId>;
    fn set_routine_state(
        &self,
        id: RoutineId,
        completed: bool,
        last_completed: &str,
    ) -> StorageResult<()>;
    /// Applies reset writes emitted by the reset rule. Entries deleted since
    /// the fetch are skipped silently; the goal is only that no stale
    /// completion survives.
    fn apply_routine_updates(&self, updates: &[RoutineUpdate]) -> StorageResult<()>;
    fn delete_routine(&self, id: RoutineId) -> StorageResult<()>;

    // Tags
    fn list_tags(&self, namespace: TagNamespace) -> StorageResult<Vec<Tag>>;
    fn tag_color(&self, namespace: TagNamespace, name: &str) -> StorageResult<Option<String>>;
    /// Inserts or recolors a tag. With `keep_existing` an existing tag's
    /// color is left untouched (the auto-provisioning path); without it the
    /// color is overwritten (the settings path).
    fn upsert_tag(
        &self,
        namespace: TagNamespace,
        name: &str,
        color: &str,
        keep_existing: bool,
    ) -> StorageResult<()>;
    fn delete_tag(&self, namespace: TagNamespace, name: &str) -> StorageResult<()>;

    // Level colors
    fn level_colors(&self) -> StorageResult<LevelColors>;
    fn set_level_color(&self, scale: Scale, level: Level, color: &str) -> StorageResult<()>;
}

/// Open the backend selected in settings.
pub fn open(settings: &AppSettings) -> StorageResult<Box<dyn Store>> {
    let data_dir = settings.resolved_data_dir();
    ensure_dir(&data_dir)?;

    match settings.backend {
        BackendKind::Sqlite => Ok(Box::new(SqliteStore::open(data_dir.join("lifedeck.db"))?)),
        BackendKind::Json => Ok(Box::new(JsonStore::open(data_dir.join("tables"))?)),
    }
}
