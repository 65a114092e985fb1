use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{migrations, Store};
use crate::levels::{Level, LevelColors, Scale};
use crate::model::{
    Folder, FolderId, FolderKind, Note, NoteId, RoutineEntry, RoutineId, RoutineUpdate, Tag,
    TagNamespace, Task, TaskId,
};
use crate::shared::errors::{StorageError, StorageResult};
use crate::week::Weekday;

/// Embedded SQLite backend.
///
/// The folder cascade is enforced by the schema (`ON DELETE CASCADE` plus
/// `PRAGMA foreign_keys = ON`), so deleting a folder row takes its tasks and
/// notes with it.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and run migrations.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let store = Self::init(Connection::open(path)?)?;
        tracing::info!(target: "storage", "SQLite database opened at {:?}", path);
        Ok(store)
    }

    /// In-memory database, mainly for tests and throwaway sessions.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn level_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Level> {
    let code: i64 = row.get(idx)?;
    Level::from_code(code as u8).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("invalid level code {}", code).into(),
        )
    })
}

fn kind_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<FolderKind> {
    let kind: String = row.get(idx)?;
    FolderKind::from_str(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid folder kind {:?}", kind).into(),
        )
    })
}

fn tag_table(namespace: TagNamespace) -> &'static str {
    match namespace {
        TagNamespace::Task => "task_tags",
        TagNamespace::Folder => "folder_tags",
    }
}

impl Store for SqliteStore {
    fn list_folders(&self, kind: FolderKind) -> StorageResult<Vec<Folder>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, kind, tag FROM folders WHERE kind = ?1 ORDER BY id DESC")?;
        let rows = stmt.query_map([kind.as_str()], |row| {
            Ok(Folder {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: kind_column(row, 2)?,
                tag: row.get(3)?,
            })
        })?;

        let mut folders = Vec::new();
        for row in rows {
            folders.push(row?);
        }
        Ok(folders)
    }

    fn insert_folder(
        &self,
        name: &str,
        kind: FolderKind,
        tag: Option<&str>,
    ) -> StorageResult<FolderId> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO folders (name, kind, tag) VALUES (?1, ?2, ?3)",
            params![name, kind.as_str(), tag],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_folder(&self, id: FolderId, name: &str, tag: Option<&str>) -> StorageResult<()> {
        let rows_affected = self.conn().execute(
            "UPDATE folders SET name = ?1, tag = ?2 WHERE id = ?3",
            params![name, tag, id],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Folder not found: {}", id)));
        }
        Ok(())
    }

    fn delete_folder(&self, id: FolderId) -> StorageResult<()> {
        let rows_affected = self
            .conn()
            .execute("DELETE FROM folders WHERE id = ?1", [id])?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Folder not found: {}", id)));
        }
        Ok(())
    }

    fn fetch_tasks(&self, folder_id: FolderId) -> StorageResult<Vec<Task>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, folder_id, text, done, importance, effort, created, tag
             FROM tasks WHERE folder_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([folder_id], |row| {
            Ok(Task {
                id: row.get(0)?,
                folder_id: row.get(1)?,
                text: row.get(2)?,
                done: row.get(3)?,
                importance: level_column(row, 4)?,
                effort: level_column(row, 5)?,
                created: row.get(6)?,
                tag: row.get(7)?,
            })
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
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
        let conn = self.conn();
        conn.execute(
            "INSERT INTO tasks (folder_id, text, done, importance, effort, created, tag)
             VALUES (?1, ?2, 0, ?3, ?4, ?5, ?6)",
            params![
                folder_id,
                text,
                importance.code(),
                effort.code(),
                created,
                tag
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_task(
        &self,
        id: TaskId,
        text: &str,
        importance: Level,
        effort: Level,
        tag: Option<&str>,
    ) -> StorageResult<()> {
        let rows_affected = self.conn().execute(
            "UPDATE tasks SET text = ?1, importance = ?2, effort = ?3, tag = ?4 WHERE id = ?5",
            params![text, importance.code(), effort.code(), tag, id],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Task not found: {}", id)));
        }
        Ok(())
    }

    fn set_task_done(&self, id: TaskId, done: bool) -> StorageResult<()> {
        let rows_affected = self.conn().execute(
            "UPDATE tasks SET done = ?1 WHERE id = ?2",
            params![done, id],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Task not found: {}", id)));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> StorageResult<()> {
        let rows_affected = self.conn().execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Task not found: {}", id)));
        }
        Ok(())
    }

    fn fetch_notes(&self, folder_id: FolderId) -> StorageResult<Vec<Note>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, folder_id, title, content, created
             FROM notes WHERE folder_id = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([folder_id], |row| {
            Ok(Note {
                id: row.get(0)?,
                folder_id: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                created: row.get(4)?,
            })
        })?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    fn insert_note(
        &self,
        folder_id: FolderId,
        title: &str,
        content: &str,
        created: &str,
    ) -> StorageResult<NoteId> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO notes (folder_id, title, content, created) VALUES (?1, ?2, ?3, ?4)",
            params![folder_id, title, content, created],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_note(&self, id: NoteId, title: &str, content: &str) -> StorageResult<()> {
        let rows_affected = self.conn().execute(
            "UPDATE notes SET title = ?1, content = ?2 WHERE id = ?3",
            params![title, content, id],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Note not found: {}", id)));
        }
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> StorageResult<()> {
        let rows_affected = self.conn().execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Note not found: {}", id)));
        }
        Ok(())
    }

    fn fetch_routines(&self, day: Weekday) -> StorageResult<Vec<RoutineEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, time_label, text, completed, last_completed
             FROM routines WHERE day = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([day.label()], |row| {
            Ok(RoutineEntry {
                id: row.get(0)?,
                day,
                time_label: row.get(1)?,
                text: row.get(2)?,
                completed: row.get(3)?,
                last_completed: row.get(4)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn insert_routine(
        &self,
        day: Weekday,
        time_label: &str,
        text: &str,
    ) -> StorageResult<RoutineId> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO routines (day, time_label, text, completed, last_completed)
             VALUES (?1, ?2, ?3, 0, '')",
            params![day.label(), time_label, text],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn set_routine_state(
        &self,
        id: RoutineId,
        completed: bool,
        last_completed: &str,
    ) -> StorageResult<()> {
        let rows_affected = self.conn().execute(
            "UPDATE routines SET completed = ?1, last_completed = ?2 WHERE id = ?3",
            params![completed, last_completed, id],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!(
                "Routine entry not found: {}",
                id
            )));
        }
        Ok(())
    }

    fn apply_routine_updates(&self, updates: &[RoutineUpdate]) -> StorageResult<()> {
        let conn = self.conn();
        for update in updates {
            conn.execute(
                "UPDATE routines SET completed = ?1, last_completed = ?2 WHERE id = ?3",
                params![update.completed, update.last_completed, update.id],
            )?;
        }
        Ok(())
    }

    fn delete_routine(&self, id: RoutineId) -> StorageResult<()> {
        let rows_affected = self
            .conn()
            .execute("DELETE FROM routines WHERE id = ?1", [id])?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!(
                "Routine entry not found: {}",
                id
            )));
        }
        Ok(())
    }

    fn list_tags(&self, namespace: TagNamespace) -> StorageResult<Vec<Tag>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT name, color FROM {} ORDER BY name ASC",
            tag_table(namespace)
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(Tag {
                name: row.get(0)?,
                color: row.get(1)?,
            })
        })?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    fn tag_color(&self, namespace: TagNamespace, name: &str) -> StorageResult<Option<String>> {
        let color = self
            .conn()
            .query_row(
                &format!("SELECT color FROM {} WHERE name = ?1", tag_table(namespace)),
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(color)
    }

    fn upsert_tag(
        &self,
        namespace: TagNamespace,
        name: &str,
        color: &str,
        keep_existing: bool,
    ) -> StorageResult<()> {
        let sql = if keep_existing {
            format!(
                "INSERT OR IGNORE INTO {} (name, color) VALUES (?1, ?2)",
                tag_table(namespace)
            )
        } else {
            format!(
                "INSERT INTO {} (name, color) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET color = excluded.color",
                tag_table(namespace)
            )
        };
        self.conn().execute(&sql, params![name, color])?;
        Ok(())
    }

    fn delete_tag(&self, namespace: TagNamespace, name: &str) -> StorageResult<()> {
        let rows_affected = self.conn().execute(
            &format!("DELETE FROM {} WHERE name = ?1", tag_table(namespace)),
            [name],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(format!("Tag not found: {}", name)));
        }
        Ok(())
    }

    fn level_colors(&self) -> StorageResult<LevelColors> {
        let conn = self.conn();
        let mut colors = LevelColors::default();

        let mut stmt = conn.prepare("SELECT scale, level, color FROM level_colors")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (scale, level, color) = row?;
            if let (Some(scale), Some(level)) = (Scale::from_str(&scale), Level::from_code(level as u8))
            {
                colors.set(scale, level, color);
            }
        }
        Ok(colors)
    }

    fn set_level_color(&self, scale: Scale, level: Level, color: &str) -> StorageResult<()> {
        self.conn().execute(
            "INSERT INTO level_colors (scale, level, color) VALUES (?1, ?2, ?3)
             ON CONFLICT(scale, level) DO UPDATE SET color = excluded.color",
            params![scale.as_str(), level.code(), color],
        )?;
        Ok(())
    }
}
