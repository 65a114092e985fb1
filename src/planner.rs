use chrono::{Local, NaiveDate};
use rand::Rng;

use crate::levels::{Level, LevelColors, Scale};
use crate::model::{
    Folder, FolderId, FolderKind, Note, NoteId, RoutineEntry, RoutineId, Tag, TagNamespace, Task,
    TaskId,
};
use crate::query::{self, TaskQuery};
use crate::routine;
use crate::settings::AppSettings;
use crate::shared::errors::StorageResult;
use crate::storage::{self, Store};
use crate::week::Weekday;

/// Palette a freshly auto-provisioned tag draws its color from.
pub const TAG_PALETTE: [&str; 10] = [
    "#E74C3C", "#8E44AD", "#3498DB", "#1ABC9C", "#F1C40F", "#E67E22", "#7F8C8D", "#2ECC71",
    "#34495E", "#D35400",
];

/// Color rendered for a task tag that is missing from its namespace.
pub const DEFAULT_TASK_TAG_COLOR: &str = "#9B59B6";
/// Color rendered for a folder tag that is missing from its namespace.
pub const DEFAULT_FOLDER_TAG_COLOR: &str = "#34495E";

/// Service tying the pure core (query engine, reset rule) to a backing
/// store. Holds no session state of its own: filter selections, the active
/// folder and "today" all arrive as parameters.
pub struct Planner {
    store: Box<dyn Store>,
}

impl Planner {
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Open the backend selected in settings.
    pub fn open(settings: &AppSettings) -> StorageResult<Self> {
        Ok(Self {
            store: storage::open(settings)?,
        })
    }

    /// Direct access to the backing store, for callers that need raw rows.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    // ========================================================================
    // Folders
    // ========================================================================

    pub fn folders(&self, kind: FolderKind) -> StorageResult<Vec<Folder>> {
        self.store.list_folders(kind)
    }

    pub fn add_folder(
        &self,
        name: &str,
        kind: FolderKind,
        tag: Option<&str>,
    ) -> StorageResult<FolderId> {
        let tag = self.provision_tag(TagNamespace::Folder, tag)?;
        let id = self.store.insert_folder(name, kind, tag.as_deref())?;
        tracing::info!(target: "planner", "Folder created: {} ({})", id, name);
        Ok(id)
    }

    pub fn update_folder(&self, id: FolderId, name: &str, tag: Option<&str>) -> StorageResult<()> {
        let tag = self.provision_tag(TagNamespace::Folder, tag)?;
        self.store.update_folder(id, name, tag.as_deref())
    }

    /// Deletes the folder together with every task and note it owns.
    pub fn delete_folder(&self, id: FolderId) -> StorageResult<()> {
        self.store.delete_folder(id)?;
        tracing::info!(target: "planner", "Folder deleted: {}", id);
        Ok(())
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    /// Fetch a folder's tasks and run them through the query engine.
    ///
    /// An unknown folder yields an empty list, not an error.
    pub fn query_tasks(&self, folder_id: FolderId, query: &TaskQuery) -> StorageResult<Vec<Task>> {
        let tasks = self.store.fetch_tasks(folder_id)?;
        Ok(query::apply(tasks, query))
    }

    pub fn add_task(
        &self,
        folder_id: FolderId,
        text: &str,
        importance: Level,
        effort: Level,
        tag: Option<&str>,
    ) -> StorageResult<TaskId> {
        let tag = self.provision_tag(TagNamespace::Task, tag)?;
        let created = Local::now().format("%d %b, %H:%M").to_string();
        self.store
            .insert_task(folder_id, text, importance, effort, &created, tag.as_deref())
    }

    pub fn update_task(
        &self,
        id: TaskId,
        text: &str,
        importance: Level,
        effort: Level,
        tag: Option<&str>,
    ) -> StorageResult<()> {
        let tag = self.provision_tag(TagNamespace::Task, tag)?;
        self.store
            .update_task(id, text, importance, effort, tag.as_deref())
    }

    pub fn set_task_done(&self, id: TaskId, done: bool) -> StorageResult<()> {
        self.store.set_task_done(id, done)
    }

    pub fn delete_task(&self, id: TaskId) -> StorageResult<()> {
        self.store.delete_task(id)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub fn notes(&self, folder_id: FolderId) -> StorageResult<Vec<Note>> {
        self.store.fetch_notes(folder_id)
    }

    pub fn add_note(&self, folder_id: FolderId, title: &str, content: &str) -> StorageResult<NoteId> {
        let created = Local::now().format("%Y-%m-%d").to_string();
        self.store.insert_note(folder_id, title, content, &created)
    }

    pub fn update_note(&self, id: NoteId, title: &str, content: &str) -> StorageResult<()> {
        self.store.update_note(id, title, content)
    }

    pub fn delete_note(&self, id: NoteId) -> StorageResult<()> {
        self.store.delete_note(id)
    }

    // ========================================================================
    // Weekly routines
    // ========================================================================

    /// A day's routine entries, ordered by time label, with stale
    /// completions reset.
    ///
    /// The resets the rule emits are persisted before returning, so a direct
    /// read from storage afterwards sees no entry of this day completed with
    /// an old date. `today` is injected by the caller.
    pub fn day_routines(&self, day: Weekday, today: NaiveDate) -> StorageResult<Vec<RoutineEntry>> {
        let entries = self.store.fetch_routines(day)?;
        let (view, updates) = routine::resolve_day(entries, today);
        if !updates.is_empty() {
            tracing::debug!(
                target: "planner",
                "Resetting {} stale routine entries for {}",
                updates.len(),
                day.label()
            );
            self.store.apply_routine_updates(&updates)?;
        }
        Ok(view)
    }

    pub fn add_routine(
        &self,
        day: Weekday,
        time_label: &str,
        text: &str,
    ) -> StorageResult<RoutineId> {
        self.store.insert_routine(day, time_label, text)
    }

    /// Set a routine entry's completion state. Completing stamps
    /// `last_completed` with `today`; un-completing clears it.
    pub fn toggle_routine(
        &self,
        id: RoutineId,
        completed: bool,
        today: NaiveDate,
    ) -> StorageResult<()> {
        let last_completed = if completed {
            today.format("%Y-%m-%d").to_string()
        } else {
            String::new()
        };
        self.store.set_routine_state(id, completed, &last_completed)
    }

    pub fn delete_routine(&self, id: RoutineId) -> StorageResult<()> {
        self.store.delete_routine(id)
    }

    // ========================================================================
    // Tags & colors
    // ========================================================================

    pub fn tags(&self, namespace: TagNamespace) -> StorageResult<Vec<Tag>> {
        self.store.list_tags(namespace)
    }

    /// The display color for a tag, falling back to the namespace default
    /// when the tag does not exist.
    pub fn tag_color(&self, namespace: TagNamespace, name: &str) -> StorageResult<String> {
        let fallback = match namespace {
            TagNamespace::Task => DEFAULT_TASK_TAG_COLOR,
            TagNamespace::Folder => DEFAULT_FOLDER_TAG_COLOR,
        };
        Ok(self
            .store
            .tag_color(namespace, name)?
            .unwrap_or_else(|| fallback.to_string()))
    }

    /// Explicitly recolor a tag (settings path); creates it if missing.
    pub fn recolor_tag(
        &self,
        namespace: TagNamespace,
        name: &str,
        color: &str,
    ) -> StorageResult<()> {
        self.store.upsert_tag(namespace, name, color, false)
    }

    pub fn delete_tag(&self, namespace: TagNamespace, name: &str) -> StorageResult<()> {
        self.store.delete_tag(namespace, name)
    }

    pub fn level_colors(&self) -> StorageResult<LevelColors> {
        self.store.level_colors()
    }

    pub fn set_level_color(&self, scale: Scale, level: Level, color: &str) -> StorageResult<()> {
        self.store.set_level_color(scale, level, color)
    }

    /// Make sure a referenced tag exists in its namespace, creating it with
    /// a random palette color if it is new. Never recolors an existing tag.
    /// Returns the normalized tag (empty names count as no tag).
    fn provision_tag(
        &self,
        namespace: TagNamespace,
        tag: Option<&str>,
    ) -> StorageResult<Option<String>> {
        let tag = tag.filter(|t| !t.is_empty());
        if let Some(name) = tag {
            let color = TAG_PALETTE[rand::thread_rng().gen_range(0..TAG_PALETTE.len())];
            self.store.upsert_tag(namespace, name, color, true)?;
        }
        Ok(tag.map(String::from))
    }
}
