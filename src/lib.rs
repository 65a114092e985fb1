pub mod levels;
pub mod logging;
pub mod model;
pub mod planner;
pub mod query;
pub mod routine;
pub mod settings;
pub mod shared;
pub mod storage;
pub mod week;

pub use levels::{Level, LevelColors, Scale};
pub use model::{
    Folder, FolderId, FolderKind, Note, NoteId, RoutineEntry, RoutineId, RoutineUpdate, Tag,
    TagNamespace, Task, TaskId,
};
pub use planner::Planner;
pub use query::{SortMode, TaskQuery};
pub use settings::{load_settings, save_settings, AppSettings, BackendKind};
pub use shared::errors::{StorageError, StorageResult};
pub use storage::{JsonStore, SqliteStore, Store};
pub use week::Weekday;
