use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Store;
use crate::levels::{Level, LevelColors, Scale};
use crate::model::{
    Folder, FolderId, FolderKind, Note, NoteId, RoutineEntry, RoutineId, RoutineUpdate, Tag,
    TagNamespace, Task, TaskId,
};
use crate::shared::errors::{StorageError, StorageResult};
use crate::shared::paths::ensure_dir;
use crate::week::Weekday;

/// JSON-file backend: one pretty-printed file per table under the data
/// directory.
///
/// A missing file reads as an empty table. Ids are assigned max+1 over the
/// rows currently in the table.
pub struct JsonStore {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct LevelColorRow {
    scale: Scale,
    level: Level,
    color: String,
}

fn tag_table(namespace: TagNamespace) -> &'static str {
    match namespace {
        TagNamespace::Task => "task_tags",
        TagNamespace::Folder => "folder_tags",
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

impl JsonStore {
    /// Open the table directory, creating it if necessary.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        tracing::info!(target: "storage", "JSON tables opened at {:?}", dir);
        Ok(Self { dir })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }

    fn load<T: DeserializeOwned>(&self, table: &str) -> StorageResult<Vec<T>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save<T: Serialize>(&self, table: &str, rows: &[T]) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(rows)?;
        fs::write(self.table_path(table), content)?;
        Ok(())
    }
}

impl Store for JsonStore {
    fn list_folders(&self, kind: FolderKind) -> StorageResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .load::<Folder>("folders")?
            .into_iter()
            .filter(|f| f.kind == kind)
            .collect();
        folders.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(folders)
    }

    fn insert_folder(
        &self,
        name: &str,
        kind: FolderKind,
        tag: Option<&str>,
    ) -> StorageResult<FolderId> {
        let mut folders: Vec<Folder> = self.load("folders")?;
        let id = next_id(folders.iter().map(|f| f.id));
        folders.push(Folder {
            id,
            name: name.to_string(),
            kind,
            tag: tag.map(String::from),
        });
        self.save("folders", &folders)?;
        Ok(id)
    }

    fn update_folder(&self, id: FolderId, name: &str, tag: Option<&str>) -> StorageResult<()> {
        let mut folders: Vec<Folder> = self.load("folders")?;
        let folder = folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Folder not found: {}", id)))?;
        folder.name = name.to_string();
        folder.tag = tag.map(String::from);
        self.save("folders", &folders)
    }

    fn delete_folder(&self, id: FolderId) -> StorageResult<()> {
        let mut folders: Vec<Folder> = self.load("folders")?;
        let before = folders.len();
        folders.retain(|f| f.id != id);
        if folders.len() == before {
            return Err(StorageError::not_found(format!("Folder not found: {}", id)));
        }
        self.save("folders", &folders)?;

        // Cascade: drop owned tasks and notes with the folder.
        let mut tasks: Vec<Task> = self.load("tasks")?;
        let before = tasks.len();
        tasks.retain(|t| t.folder_id != id);
        if tasks.len() != before {
            self.save("tasks", &tasks)?;
        }

        let mut notes: Vec<Note> = self.load("notes")?;
        let before = notes.len();
        notes.retain(|n| n.folder_id != id);
        if notes.len() != before {
            self.save("notes", &notes)?;
        }

        Ok(())
    }

    fn fetch_tasks(&self, folder_id: FolderId) -> StorageResult<Vec<Task>> {
        Ok(self
            .load::<Task>("tasks")?
            .into_iter()
            .filter(|t| t.folder_id == folder_id)
            .collect())
    }

    fn insert_task(
        &self,
        folder_id: FolderId,
        text: &str,
        importance: Level,
        effort: Level,
        created: &str,
        tag: Option<&str>,
    ) -> StorageResult<TaskId> {
        let mut tasks: Vec<Task> = self.load("tasks")?;
        let id = next_id(tasks.iter().map(|t| t.id));
        tasks.push(Task {
            id,
            folder_id,
            text: text.to_string(),
            done: false,
            importance,
            effort,
            created: created.to_string(),
            tag: tag.map(String::from),
        });
        self.save("tasks", &tasks)?;
        Ok(id)
    }

    fn update_task(
        &self,
        id: TaskId,
        text: &str,
        importance: Level,
        effort: Level,
        tag: Option<&str>,
    ) -> StorageResult<()> {
        let mut tasks: Vec<Task> = self.load("tasks")?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Task not found: {}", id)))?;
        task.text = text.to_string();
        task.importance = importance;
        task.effort = effort;
        task.tag = tag.map(String::from);
        self.save("tasks", &tasks)
    }

    fn set_task_done(&self, id: TaskId, done: bool) -> StorageResult<()> {
        let mut tasks: Vec<Task> = self.load("tasks")?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Task not found: {}", id)))?;
        task.done = done;
        self.save("tasks", &tasks)
    }

    fn delete_task(&self, id: TaskId) -> StorageResult<()> {
        let mut tasks: Vec<Task> = self.load("tasks")?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(StorageError::not_found(format!("Task not found: {}", id)));
        }
        self.save("tasks", &tasks)
    }

    fn fetch_notes(&self, folder_id: FolderId) -> StorageResult<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .load::<Note>("notes")?
            .into_iter()
            .filter(|n| n.folder_id == folder_id)
            .collect();
        notes.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(notes)
    }

    fn insert_note(
        &self,
        folder_id: FolderId,
        title: &str,
        content: &str,
        created: &str,
    ) -> StorageResult<NoteId> {
        let mut notes: Vec<Note> = self.load("notes")?;
        let id = next_id(notes.iter().map(|n| n.id));
        notes.push(Note {
            id,
            folder_id,
            title: title.to_string(),
            content: content.to_string(),
            created: created.to_string(),
        });
        self.save("notes", &notes)?;
        Ok(id)
    }

    fn update_note(&self, id: NoteId, title: &str, content: &str) -> StorageResult<()> {
        let mut notes: Vec<Note> = self.load("notes")?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Note not found: {}", id)))?;
        note.title = title.to_string();
        note.content = content.to_string();
        self.save("notes", &notes)
    }

    fn delete_note(&self, id: NoteId) -> StorageResult<()> {
        let mut notes: Vec<Note> = self.load("notes")?;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(StorageError::not_found(format!("Note not found: {}", id)));
        }
        self.save("notes", &notes)
    }

    fn fetch_routines(&self, day: Weekday) -> StorageResult<Vec<RoutineEntry>> {
        Ok(self
            .load::<RoutineEntry>("routines")?
            .into_iter()
            .filter(|e| e.day == day)
            .collect())
    }

    fn insert_routine(
        &self,
        day: Weekday,
        time_label: &str,
        text: &str,
    ) -> StorageResult<RoutineId> {
        let mut entries: Vec<RoutineEntry> = self.load("routines")?;
        let id = next_id(entries.iter().map(|e| e.id));
        entries.push(RoutineEntry {
            id,
            day,
            time_label: time_label.to_string(),
            text: text.to_string(),
            completed: false,
            last_completed: String::new(),
        });
        self.save("routines", &entries)?;
        Ok(id)
    }

    fn set_routine_state(
        &self,
        id: RoutineId,
        completed: bool,
        last_completed: &str,
    ) -> StorageResult<()> {
        let mut entries: Vec<RoutineEntry> = self.load("routines")?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Routine entry not found: {}", id)))?;
        entry.completed = completed;
        entry.last_completed = last_completed.to_string();
        self.save("routines", &entries)
    }

    fn apply_routine_updates(&self, updates: &[RoutineUpdate]) -> StorageResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut entries: Vec<RoutineEntry> = self.load("routines")?;
        let mut changed = false;
        for update in updates {
            if let Some(entry) = entries.iter_mut().find(|e| e.id == update.id) {
                entry.completed = update.completed;
                entry.last_completed = update.last_completed.clone();
                changed = true;
            }
        }
        if changed {
            self.save("routines", &entries)?;
        }
        Ok(())
    }

    fn delete_routine(&self, id: RoutineId) -> StorageResult<()> {
        let mut entries: Vec<RoutineEntry> = self.load("routines")?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(StorageError::not_found(format!(
                "Routine entry not found: {}",
                id
            )));
        }
        self.save("routines", &entries)
    }

    fn list_tags(&self, namespace: TagNamespace) -> StorageResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.load(tag_table(namespace))?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    fn tag_color(&self, namespace: TagNamespace, name: &str) -> StorageResult<Option<String>> {
        let tags: Vec<Tag> = self.load(tag_table(namespace))?;
        Ok(tags.into_iter().find(|t| t.name == name).map(|t| t.color))
    }

    fn upsert_tag(
        &self,
        namespace: TagNamespace,
        name: &str,
        color: &str,
        keep_existing: bool,
    ) -> StorageResult<()> {
        let table = tag_table(namespace);
        let mut tags: Vec<Tag> = self.load(table)?;
        match tags.iter_mut().find(|t| t.name == name) {
            Some(tag) => {
                if keep_existing {
                    return Ok(());
                }
                tag.color = color.to_string();
            }
            None => tags.push(Tag {
                name: name.to_string(),
                color: color.to_string(),
            }),
        }
        self.save(table, &tags)
    }

    fn delete_tag(&self, namespace: TagNamespace, name: &str) -> StorageResult<()> {
        let table = tag_table(namespace);
        let mut tags: Vec<Tag> = self.load(table)?;
        let before = tags.len();
        tags.retain(|t| t.name != name);
        if tags.len() == before {
            return Err(StorageError::not_found(format!("Tag not found: {}", name)));
        }
        self.save(table, &tags)
    }

    fn level_colors(&self) -> StorageResult<LevelColors> {
        let mut colors = LevelColors::default();
        for row in self.load::<LevelColorRow>("level_colors")? {
            colors.set(row.scale, row.level, row.color);
        }
        Ok(colors)
    }

    fn set_level_color(&self, scale: Scale, level: Level, color: &str) -> StorageResult<()> {
        let mut rows: Vec<LevelColorRow> = self.load("level_colors")?;
        match rows
            .iter_mut()
            .find(|r| r.scale == scale && r.level == level)
        {
            Some(row) => row.color = color.to_string(),
            None => rows.push(LevelColorRow {
                scale,
                level,
                color: color.to_string(),
            }),
        }
        self.save("level_colors", &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_read_as_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("tables")).unwrap();

        assert!(store.list_folders(FolderKind::Todo).unwrap().is_empty());
        assert!(store.fetch_tasks(1).unwrap().is_empty());
        assert!(store.fetch_routines(Weekday::Monday).unwrap().is_empty());
        assert!(store.list_tags(TagNamespace::Task).unwrap().is_empty());
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let tables = dir.path().join("tables");

        let store = JsonStore::open(&tables).unwrap();
        let folder = store.insert_folder("Ev", FolderKind::Todo, None).unwrap();
        store
            .insert_task(folder, "süt al", Level::Low, Level::VeryLow, "01 Jan, 09:00", None)
            .unwrap();

        let reopened = JsonStore::open(&tables).unwrap();
        let tasks = reopened.fetch_tasks(folder).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "süt al");
    }

    #[test]
    fn test_ids_count_up_from_max() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("tables")).unwrap();

        let a = store.insert_folder("a", FolderKind::Todo, None).unwrap();
        let b = store.insert_folder("b", FolderKind::Todo, None).unwrap();
        assert_eq!(b, a + 1);
    }
}
