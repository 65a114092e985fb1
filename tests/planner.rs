//! Integration tests for the planner service, run against both storage
//! backends through the same capability trait.

use chrono::NaiveDate;

use lifedeck::{
    FolderKind, JsonStore, Level, Planner, Scale, SortMode, SqliteStore, StorageError, Store,
    TagNamespace, TaskQuery, Weekday,
};

/// Run a test body once per backend, each on a fresh data directory.
fn with_backends(test: impl Fn(&Planner)) {
    let dir = tempfile::tempdir().unwrap();

    let sqlite = Planner::new(SqliteStore::open(dir.path().join("lifedeck.db")).unwrap());
    test(&sqlite);

    let json = Planner::new(JsonStore::open(dir.path().join("tables")).unwrap());
    test(&json);
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn add_and_query_tasks() {
    with_backends(|planner| {
        let folder = planner.add_folder("İş", FolderKind::Todo, None).unwrap();

        planner
            .add_task(folder, "raporu bitir", Level::VeryHigh, Level::High, None)
            .unwrap();
        planner
            .add_task(folder, "maili yanıtla", Level::Low, Level::VeryLow, None)
            .unwrap();
        planner
            .add_task(folder, "sunum hazırla", Level::VeryHigh, Level::Medium, None)
            .unwrap();

        let all = planner.query_tasks(folder, &TaskQuery::default()).unwrap();
        assert_eq!(all.len(), 3);
        // Date mode: newest first.
        assert_eq!(all[0].text, "sunum hazırla");
        assert_eq!(all[2].text, "raporu bitir");

        let urgent = planner
            .query_tasks(
                folder,
                &TaskQuery {
                    importance: vec![Level::VeryHigh],
                    sort: SortMode::ImportanceDesc,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(urgent.len(), 2);
        // Equal importance: id-descending tiebreak keeps the newest first.
        assert_eq!(urgent[0].text, "sunum hazırla");
        assert_eq!(urgent[1].text, "raporu bitir");
    });
}

#[test]
fn query_unknown_folder_is_empty() {
    with_backends(|planner| {
        let tasks = planner.query_tasks(999, &TaskQuery::default()).unwrap();
        assert!(tasks.is_empty());
    });
}

#[test]
fn done_filter_through_the_service() {
    with_backends(|planner| {
        let folder = planner.add_folder("Ev", FolderKind::Todo, None).unwrap();
        let first = planner
            .add_task(folder, "süt al", Level::Low, Level::VeryLow, None)
            .unwrap();
        planner
            .add_task(folder, "fatura öde", Level::Medium, Level::Low, None)
            .unwrap();

        planner.set_task_done(first, true).unwrap();

        let open = planner
            .query_tasks(
                folder,
                &TaskQuery {
                    done: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].text, "fatura öde");

        let done = planner
            .query_tasks(
                folder,
                &TaskQuery {
                    done: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].text, "süt al");
    });
}

#[test]
fn folder_deletion_cascades_to_tasks_and_notes() {
    with_backends(|planner| {
        let todo_folder = planner.add_folder("İş", FolderKind::Todo, None).unwrap();
        let note_folder = planner.add_folder("Günlük", FolderKind::Note, None).unwrap();

        planner
            .add_task(todo_folder, "raporu bitir", Level::High, Level::High, None)
            .unwrap();
        planner
            .add_task(todo_folder, "maili yanıtla", Level::Low, Level::Low, None)
            .unwrap();
        planner
            .add_note(note_folder, "Pazartesi", "toplantı notları")
            .unwrap();

        planner.delete_folder(todo_folder).unwrap();
        planner.delete_folder(note_folder).unwrap();

        // Direct store reads: the cascade must hold without the service.
        assert!(planner.store().fetch_tasks(todo_folder).unwrap().is_empty());
        assert!(planner.store().fetch_notes(note_folder).unwrap().is_empty());
        assert!(planner.folders(FolderKind::Todo).unwrap().is_empty());
        assert!(planner.folders(FolderKind::Note).unwrap().is_empty());
    });
}

#[test]
fn saving_a_task_provisions_its_tag_once() {
    with_backends(|planner| {
        let folder = planner.add_folder("İş", FolderKind::Todo, None).unwrap();

        planner
            .add_task(folder, "raporu bitir", Level::High, Level::High, Some("Work"))
            .unwrap();

        let tags = planner.tags(TagNamespace::Task).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Work");
        assert!(lifedeck::planner::TAG_PALETTE.contains(&tags[0].color.as_str()));
        let first_color = tags[0].color.clone();

        // A second save with the same tag neither duplicates nor recolors.
        planner
            .add_task(folder, "sunum hazırla", Level::Medium, Level::Low, Some("Work"))
            .unwrap();
        let tags = planner.tags(TagNamespace::Task).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].color, first_color);
    });
}

#[test]
fn folder_tags_live_in_their_own_namespace() {
    with_backends(|planner| {
        planner
            .add_folder("İş", FolderKind::Todo, Some("Work"))
            .unwrap();

        assert_eq!(planner.tags(TagNamespace::Folder).unwrap().len(), 1);
        assert!(planner.tags(TagNamespace::Task).unwrap().is_empty());
    });
}

#[test]
fn tag_color_falls_back_per_namespace() {
    with_backends(|planner| {
        assert_eq!(
            planner.tag_color(TagNamespace::Task, "yok").unwrap(),
            "#9B59B6"
        );
        assert_eq!(
            planner.tag_color(TagNamespace::Folder, "yok").unwrap(),
            "#34495E"
        );
    });
}

#[test]
fn recolor_and_delete_tags() {
    with_backends(|planner| {
        let folder = planner.add_folder("İş", FolderKind::Todo, None).unwrap();
        planner
            .add_task(folder, "raporu bitir", Level::High, Level::High, Some("Work"))
            .unwrap();

        planner
            .recolor_tag(TagNamespace::Task, "Work", "#000000")
            .unwrap();
        assert_eq!(
            planner.tag_color(TagNamespace::Task, "Work").unwrap(),
            "#000000"
        );

        planner.delete_tag(TagNamespace::Task, "Work").unwrap();
        assert!(planner.tags(TagNamespace::Task).unwrap().is_empty());

        let err = planner.delete_tag(TagNamespace::Task, "Work").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    });
}

#[test]
fn stale_routines_reset_and_persist() {
    with_backends(|planner| {
        let morning = planner
            .add_routine(Weekday::Monday, "08:00", "spor yap")
            .unwrap();
        let evening = planner
            .add_routine(Weekday::Monday, "21:00", "kitap oku")
            .unwrap();

        planner
            .toggle_routine(morning, true, date("2024-01-01"))
            .unwrap();

        // Same day: the completion mark survives repeated reads.
        let view = planner
            .day_routines(Weekday::Monday, date("2024-01-01"))
            .unwrap();
        assert!(view[0].completed);
        assert_eq!(view[0].last_completed, "2024-01-01");

        // Next day: stale mark is reset in the view...
        let view = planner
            .day_routines(Weekday::Monday, date("2024-01-02"))
            .unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|e| !e.completed));
        assert!(view.iter().all(|e| e.last_completed.is_empty()));

        // ...and in storage, without going through the rule again.
        let stored = planner.store().fetch_routines(Weekday::Monday).unwrap();
        let morning_row = stored.iter().find(|e| e.id == morning).unwrap();
        assert!(!morning_row.completed);
        assert_eq!(morning_row.last_completed, "");
        let evening_row = stored.iter().find(|e| e.id == evening).unwrap();
        assert!(!evening_row.completed);
    });
}

#[test]
fn day_routines_are_ordered_by_time_label() {
    with_backends(|planner| {
        planner
            .add_routine(Weekday::Friday, "21:00", "kitap oku")
            .unwrap();
        planner
            .add_routine(Weekday::Friday, "07:30", "spor yap")
            .unwrap();
        planner
            .add_routine(Weekday::Friday, "12:00", "yürüyüş")
            .unwrap();

        let view = planner
            .day_routines(Weekday::Friday, date("2024-01-05"))
            .unwrap();
        let times: Vec<&str> = view.iter().map(|e| e.time_label.as_str()).collect();
        assert_eq!(times, vec!["07:30", "12:00", "21:00"]);
    });
}

#[test]
fn routine_days_do_not_leak_into_each_other() {
    with_backends(|planner| {
        planner
            .add_routine(Weekday::Monday, "08:00", "spor yap")
            .unwrap();
        planner
            .add_routine(Weekday::Tuesday, "08:00", "koşu")
            .unwrap();

        let monday = planner
            .day_routines(Weekday::Monday, date("2024-01-01"))
            .unwrap();
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].text, "spor yap");
    });
}

#[test]
fn notes_crud() {
    with_backends(|planner| {
        let folder = planner.add_folder("Günlük", FolderKind::Note, None).unwrap();

        let first = planner.add_note(folder, "Pazartesi", "ilk not").unwrap();
        planner.add_note(folder, "Salı", "ikinci not").unwrap();

        let notes = planner.notes(folder).unwrap();
        assert_eq!(notes.len(), 2);
        // Newest first.
        assert_eq!(notes[0].title, "Salı");

        planner
            .update_note(first, "Pazartesi", "güncellenen not")
            .unwrap();
        let notes = planner.notes(folder).unwrap();
        assert_eq!(notes[1].content, "güncellenen not");

        planner.delete_note(first).unwrap();
        assert_eq!(planner.notes(folder).unwrap().len(), 1);
    });
}

#[test]
fn update_task_and_folder() {
    with_backends(|planner| {
        let folder = planner.add_folder("İş", FolderKind::Todo, None).unwrap();
        let task = planner
            .add_task(folder, "raporu bitir", Level::Low, Level::Low, None)
            .unwrap();

        planner
            .update_task(task, "raporu gönder", Level::VeryHigh, Level::Medium, Some("Work"))
            .unwrap();
        let tasks = planner.query_tasks(folder, &TaskQuery::default()).unwrap();
        assert_eq!(tasks[0].text, "raporu gönder");
        assert_eq!(tasks[0].importance, Level::VeryHigh);
        assert_eq!(tasks[0].tag.as_deref(), Some("Work"));

        planner
            .update_folder(folder, "İş (arşiv)", Some("Archive"))
            .unwrap();
        let folders = planner.folders(FolderKind::Todo).unwrap();
        assert_eq!(folders[0].name, "İş (arşiv)");
        assert_eq!(folders[0].tag.as_deref(), Some("Archive"));
    });
}

#[test]
fn level_colors_default_and_override() {
    with_backends(|planner| {
        let colors = planner.level_colors().unwrap();
        assert_eq!(colors.color(Scale::Importance, Level::VeryHigh), "#c0392b");
        assert_eq!(colors.color(Scale::Effort, Level::Medium), "#444444");

        planner
            .set_level_color(Scale::Effort, Level::Medium, "#ff00ff")
            .unwrap();

        let colors = planner.level_colors().unwrap();
        assert_eq!(colors.color(Scale::Effort, Level::Medium), "#ff00ff");
        // Other cells untouched.
        assert_eq!(colors.color(Scale::Effort, Level::Low), "#444444");
        assert_eq!(colors.color(Scale::Importance, Level::VeryHigh), "#c0392b");
    });
}

#[test]
fn mutations_on_missing_ids_are_not_found() {
    with_backends(|planner| {
        assert!(matches!(
            planner.set_task_done(999, true).unwrap_err(),
            StorageError::NotFound(_)
        ));
        assert!(matches!(
            planner.delete_folder(999).unwrap_err(),
            StorageError::NotFound(_)
        ));
        assert!(matches!(
            planner.update_note(999, "a", "b").unwrap_err(),
            StorageError::NotFound(_)
        ));
        assert!(matches!(
            planner
                .toggle_routine(999, true, date("2024-01-01"))
                .unwrap_err(),
            StorageError::NotFound(_)
        ));
    });
}
