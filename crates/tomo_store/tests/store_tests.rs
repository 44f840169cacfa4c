//! Integration tests for SqliteStore
//!
//! Uses tempfile::TempDir for isolated SQLite databases.

use tomo_core::{InspirationLine, InspirationSource, MoodStore, NewSessionRecord};
use tomo_store::SqliteStore;
use uuid::Uuid;

async fn setup_store(dir: &tempfile::TempDir) -> SqliteStore {
    let db_path = dir.path().join("test.db");
    SqliteStore::new(db_path).await.unwrap()
}

#[tokio::test]
async fn test_check_in_then_direction() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = setup_store(&dir).await;

    let entry = store
        .create_entry("local", "anxious", Some("big meeting tomorrow"))
        .await
        .unwrap();
    assert_eq!(entry.target_emotion, None);

    store.set_target_emotion(entry.id, "calm").await.unwrap();
    let loaded = store.get_entry(entry.id).await.unwrap().unwrap();
    assert_eq!(loaded.current_emotion, "anxious");
    assert_eq!(loaded.target_emotion.as_deref(), Some("calm"));
    assert_eq!(loaded.note.as_deref(), Some("big meeting tomorrow"));
    assert_eq!(loaded.user_id, "local");
}

#[tokio::test]
async fn test_unknown_entry() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = setup_store(&dir).await;

    assert!(store.get_entry(Uuid::new_v4()).await.unwrap().is_none());
    assert!(store
        .set_target_emotion(Uuid::new_v4(), "calm")
        .await
        .is_err());
}

#[tokio::test]
async fn test_session_requires_existing_entry() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = setup_store(&dir).await;

    let result = store
        .record_session(NewSessionRecord {
            user_id: "local".into(),
            mood_entry_id: Uuid::new_v4(),
            completed: true,
            duration_seconds: 90,
        })
        .await;
    assert!(result.is_err(), "foreign key must reject orphan sessions");
}

#[tokio::test]
async fn test_recent_entries_newest_first() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = setup_store(&dir).await;

    for emotion in ["sad", "tired", "happy"] {
        store.create_entry("local", emotion, None).await.unwrap();
    }
    store.create_entry("someone-else", "angry", None).await.unwrap();

    let recent = store.recent_entries("local", 7).await.unwrap();
    let emotions: Vec<_> = recent.iter().map(|e| e.current_emotion.as_str()).collect();
    assert_eq!(emotions, vec!["happy", "tired", "sad"]);

    let limited = store.recent_entries("local", 2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].current_emotion, "happy");
}

#[tokio::test]
async fn test_session_stats() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = setup_store(&dir).await;

    assert_eq!(store.session_stats("local").await.unwrap().sessions, 0);

    let entry = store.create_entry("local", "stressed", None).await.unwrap();
    for seconds in [90, 450] {
        let saved = store
            .record_session(NewSessionRecord {
                user_id: "local".into(),
                mood_entry_id: entry.id,
                completed: true,
                duration_seconds: seconds,
            })
            .await
            .unwrap();
        assert_eq!(saved.duration_seconds, seconds);
    }

    let stats = store.session_stats("local").await.unwrap();
    assert_eq!(stats.sessions, 2);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.total_seconds, 540);
    assert_eq!(stats.total_minutes(), 9);
    assert_eq!(store.session_stats("nobody").await.unwrap().sessions, 0);
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let dir = tempfile::TempDir::new().unwrap();
    let id = {
        let store = setup_store(&dir).await;
        store.create_entry("local", "bored", None).await.unwrap().id
    };
    let store = setup_store(&dir).await;
    assert!(store.get_entry(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_inspirations_prefer_exact_journey() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = setup_store(&dir).await;

    let line = |current: &str, target: &str, text: &str| InspirationLine {
        current_emotion: current.into(),
        target_emotion: target.into(),
        text: text.into(),
    };
    store
        .add_inspiration(&line("sad", "calm", "shared target"))
        .await
        .unwrap();
    store
        .add_inspiration(&line("Anxious", "Calm", "exact match"))
        .await
        .unwrap();
    store
        .add_inspiration(&line("angry", "content", "unrelated"))
        .await
        .unwrap();
    assert!(store.add_inspiration(&line("sad", "calm", "  ")).await.is_err());

    let lines = store.inspirations("anxious", "calm", 10).await.unwrap();
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["exact match", "shared target"]);
    assert_eq!(lines[0].current_emotion, "anxious");

    assert_eq!(store.inspirations("anxious", "calm", 1).await.unwrap().len(), 1);
    assert!(store.inspirations("bored", "curious", 10).await.unwrap().is_empty());
}
