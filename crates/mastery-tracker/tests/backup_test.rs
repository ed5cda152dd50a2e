use chrono::NaiveDate;
use mastery_common::{NewTask, TaskCategory, TaskEntry};
use mastery_tracker::{Tracker, TrackerError};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[tokio::test]
async fn test_export_then_import_into_fresh_tracker() {
    let source = Tracker::in_memory();
    source.store().add_task(NewTask::new("MEDITATION", TaskCategory::Wellness)).await.unwrap();
    source.store().upsert_entry(TaskEntry::new("task1", day(1), true)).await.unwrap();
    source
        .store()
        .upsert_entry(TaskEntry::new("task15", day(1), false).with_value("01:10"))
        .await
        .unwrap();

    let json = source.data().export_backup().await.unwrap();

    let target = Tracker::in_memory();
    let summary = target.data().import_backup(&json).await.unwrap();
    assert_eq!(summary.tasks, 16);
    assert_eq!(summary.entries, 2);

    assert_eq!(target.store().list_tasks().await.unwrap(), source.store().list_tasks().await.unwrap());
    let progress = target.progress().daily_progress(day(1)).await.unwrap();
    assert_eq!(progress.completed_tasks, 1);
    assert_eq!(progress.total_tasks, 16);
    assert_eq!(progress.screen_time.as_deref(), Some("01:10"));
}

#[tokio::test]
async fn test_malformed_import_leaves_data_untouched() {
    let tracker = Tracker::in_memory();
    tracker.store().upsert_entry(TaskEntry::new("task2", day(3), true)).await.unwrap();

    let duplicate = r#"{"tasks":[],"entries":[
        {"taskId":"task1","date":"2024-01-01","completed":true},
        {"taskId":"task1","date":"2024-01-01","completed":true}
    ]}"#;

    for bad in ["", "[]", "{\"tasks\": 5}", duplicate] {
        let result = tracker.data().import_backup(bad).await;
        assert!(matches!(result, Err(TrackerError::MalformedImport(_))), "accepted {:?}", bad);
    }

    assert_eq!(tracker.store().list_tasks().await.unwrap().len(), 15);
    assert_eq!(tracker.store().list_entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_catalog_csv() {
    let tracker = Tracker::in_memory();

    let csv = tracker.data().export_catalog_csv().await.unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 16);
    assert_eq!(lines[0], "id,name,category");
    assert_eq!(lines[1], "task1,VISUALIZATION - MORNING,morning");
    assert_eq!(lines[15], "task15,SCREEN TIME,productivity");
}

#[tokio::test]
async fn test_clear_entries_keeps_catalog() {
    let tracker = Tracker::in_memory();
    tracker.store().upsert_entry(TaskEntry::new("task1", day(1), true)).await.unwrap();

    tracker.data().clear_entries().await.unwrap();

    assert!(tracker.store().list_entries().await.unwrap().is_empty());
    assert_eq!(tracker.store().list_tasks().await.unwrap().len(), 15);
    assert_eq!(tracker.progress().daily_progress(day(1)).await.unwrap().completed_tasks, 0);
}
