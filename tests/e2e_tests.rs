// End-to-end scenarios through the library API: store, history, grouping.

use chrono::Duration;
use letsdo::config::Config;
use letsdo::repo::{group_task_by, Grouped, History, TaskStore};
use tempfile::TempDir;

fn setup() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let config = Config::new(dir.path());
    (dir, config)
}

#[test]
fn test_start_stop_records_tags_and_context() {
    let (_dir, config) = setup();
    let store = TaskStore::new(&config);

    store
        .start("write +report @office", Some("2024-03-01 15:00"))
        .unwrap();
    store.stop(Some("2024-03-01 15:05")).unwrap();

    let tasks = History::new(&config).get_tasks().unwrap();
    assert_eq!(tasks.len(), 1);

    let task = &tasks[0];
    assert_eq!(task.description, "write +report @office");
    assert_eq!(task.tags(), vec!["+report"]);
    assert_eq!(task.context(), Some("@office".to_string()));
    assert_eq!(task.duration(), Duration::minutes(5));
}

#[test]
fn test_repeated_task_groups_into_one_row_with_one_id() {
    let (_dir, config) = setup();
    let store = TaskStore::new(&config);

    store.start("task A", Some("2024-03-01 09:00")).unwrap();
    store.stop(Some("2024-03-01 10:00")).unwrap();
    store.start("task A", Some("2024-03-02 09:00")).unwrap();
    store.stop(Some("2024-03-02 09:30")).unwrap();

    let tasks = History::new(&config).get_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    // Both occurrences carry the same display ID.
    assert_eq!(tasks[0].display_id, Some(1));
    assert_eq!(tasks[1].display_id, Some(1));

    match group_task_by(tasks, "name") {
        Grouped::ByName(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].description, "task A");
            assert_eq!(rows[0].duration(), Duration::minutes(90));
        }
        other => panic!("unexpected grouping: {other:?}"),
    }
}

#[test]
fn test_cancel_leaves_history_untouched() {
    let (_dir, config) = setup();
    let store = TaskStore::new(&config);

    store.start("task A", Some("2024-03-01 09:00")).unwrap();
    store.stop(Some("2024-03-01 10:00")).unwrap();
    let before = std::fs::read_to_string(config.history_file_path()).unwrap();

    store.start("task B", Some("2024-03-01 10:00")).unwrap();
    store.cancel().unwrap().unwrap();

    let after = std::fs::read_to_string(config.history_file_path()).unwrap();
    assert_eq!(before, after);
    assert!(!config.task_file_path().exists());
}

#[test]
fn test_full_lifecycle_day_grouping() {
    let (_dir, config) = setup();
    let store = TaskStore::new(&config);

    for (desc, start, stop) in [
        ("morning mail", "2024-03-01 08:30", "2024-03-01 09:00"),
        ("deep work", "2024-03-01 09:00", "2024-03-01 12:00"),
        ("deep work", "2024-03-02 09:00", "2024-03-02 11:00"),
    ] {
        store.start(desc, Some(start)).unwrap();
        store.stop(Some(stop)).unwrap();
    }

    let tasks = History::new(&config).get_tasks().unwrap();
    match group_task_by(tasks, "date") {
        Grouped::ByDate(by_date) => {
            assert_eq!(by_date.len(), 2);
            assert_eq!(by_date["2024-03-01"].len(), 2);
            assert_eq!(by_date["2024-03-02"].len(), 1);
        }
        other => panic!("unexpected grouping: {other:?}"),
    }
}
