use rusqlite::Connection;

/// Run database schema migrations
pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        -- Folders hold either tasks or notes, never both
        CREATE TABLE IF NOT EXISTS folders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('todo', 'note')),
            tag TEXT
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            folder_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            done INTEGER NOT NULL DEFAULT 0,
            importance INTEGER NOT NULL CHECK (importance BETWEEN 1 AND 5),
            effort INTEGER NOT NULL CHECK (effort BETWEEN 1 AND 5),
            created TEXT NOT NULL,
            tag TEXT,
            FOREIGN KEY (folder_id) REFERENCES folders(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            folder_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created TEXT NOT NULL,
            FOREIGN KEY (folder_id) REFERENCES folders(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS routines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            day TEXT NOT NULL,
            time_label TEXT NOT NULL,
            text TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            last_completed TEXT NOT NULL DEFAULT ''
        );

        -- Tag namespaces are independent tables keyed by name
        CREATE TABLE IF NOT EXISTS task_tags (
            name TEXT PRIMARY KEY,
            color TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS folder_tags (
            name TEXT PRIMARY KEY,
            color TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS level_colors (
            scale TEXT NOT NULL CHECK (scale IN ('importance', 'effort')),
            level INTEGER NOT NULL CHECK (level BETWEEN 1 AND 5),
            color TEXT NOT NULL,
            PRIMARY KEY (scale, level)
        );

        -- Indexes for the per-folder and per-day fetch paths
        CREATE INDEX IF NOT EXISTS idx_tasks_folder ON tasks(folder_id);
        CREATE INDEX IF NOT EXISTS idx_notes_folder ON notes(folder_id);
        CREATE INDEX IF NOT EXISTS idx_routines_day ON routines(day);
        ",
    )?;

    tracing::debug!(target: "storage", "Database schema migrations completed");
    Ok(())
}
