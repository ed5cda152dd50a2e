use mastery_common::Role;
use mastery_tracker::{Tracker, TrackerConfig};
use tempfile::tempdir;

#[tokio::test]
async fn test_login_sets_current_user() {
    let tracker = Tracker::in_memory();
    let session = tracker.session();

    let user = session.login("student2", "s2pass").await.unwrap().unwrap();
    assert_eq!(user.name, "Student 2");
    assert_eq!(user.role, Role::Student);

    assert!(session.is_authenticated().await.unwrap());
    assert_eq!(session.current_user().await.unwrap(), Some(user));
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let tracker = Tracker::in_memory();
    let session = tracker.session();

    session.login("mentor", "mentorpass").await.unwrap();
    assert!(session.login("mentor", "wrong").await.unwrap().is_none());

    let current = session.current_user().await.unwrap().unwrap();
    assert_eq!(current.role, Role::Mentor);
}

#[tokio::test]
async fn test_logout_clears_session_and_is_idempotent() {
    let tracker = Tracker::in_memory();
    let session = tracker.session();

    session.login("student1", "s1pass").await.unwrap();
    session.logout().await.unwrap();
    session.logout().await.unwrap();

    assert!(!session.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn test_session_survives_reopen() {
    let dir = tempdir().unwrap();
    let mut config = TrackerConfig::default();
    config.database.path = dir.path().join("session.db").to_string_lossy().to_string();

    let tracker = Tracker::open(&config).await.unwrap();
    tracker.session().login("student1", "s1pass").await.unwrap();
    tracker.close().await;

    let tracker = Tracker::open(&config).await.unwrap();
    let user = tracker.session().current_user().await.unwrap().unwrap();
    assert_eq!(user.id, "student1");
    tracker.close().await;
}
