use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;
use tomo_core::{
    InspirationLine, InspirationSource, MeditationSession, MoodEntry, MoodStore, NewSessionRecord,
    SessionStats,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().display().to_string();
        // Every connection to ":memory:" is its own database.
        let max_connections = if path == ":memory:" { 1 } else { 5 };

        let db_url = format!("sqlite://{}?mode=rwc", path);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON").execute(conn).await?;
                    Ok(())
                })
            })
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!("SQLite store ready at {}", path);
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mood_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                current_emotion TEXT NOT NULL,
                target_emotion TEXT,
                note TEXT,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create mood_entries table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_mood_entries_user ON mood_entries(user_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create mood_entries index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meditation_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                mood_entry_id TEXT NOT NULL REFERENCES mood_entries(id) ON DELETE CASCADE,
                completed INTEGER NOT NULL,
                duration_seconds INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create meditation_sessions table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inspiration_lines (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                current_emotion TEXT NOT NULL,
                target_emotion TEXT NOT NULL,
                text TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create inspiration_lines table")?;

        Ok(())
    }

    /// Store a line of source material for the `current → target` journey.
    pub async fn add_inspiration(&self, line: &InspirationLine) -> Result<()> {
        let text = line.text.trim();
        if text.is_empty() {
            anyhow::bail!("Inspiration text is empty");
        }
        sqlx::query(
            "INSERT INTO inspiration_lines (current_emotion, target_emotion, text) \
             VALUES (?, ?, ?)",
        )
        .bind(line.current_emotion.trim().to_lowercase())
        .bind(line.target_emotion.trim().to_lowercase())
        .bind(text)
        .execute(&self.pool)
        .await
        .context("Failed to insert inspiration line")?;
        Ok(())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<MoodEntry> {
        let id: String = row.get("id");
        Ok(MoodEntry {
            id: Uuid::parse_str(&id).context("Corrupt mood entry id")?,
            user_id: row.get("user_id"),
            current_emotion: row.get("current_emotion"),
            target_emotion: row.get("target_emotion"),
            note: row.get("note"),
            created_at: from_millis(row.get("created_at"))?,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).with_context(|| format!("Timestamp out of range: {}", ms))
}

#[async_trait]
impl MoodStore for SqliteStore {
    async fn create_entry(
        &self,
        user_id: &str,
        current_emotion: &str,
        note: Option<&str>,
    ) -> Result<MoodEntry> {
        let entry = MoodEntry {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            current_emotion: current_emotion.to_string(),
            target_emotion: None,
            note: note.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO mood_entries \
             (id, user_id, current_emotion, target_emotion, note, created_at) \
             VALUES (?, ?, ?, NULL, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(&entry.user_id)
        .bind(&entry.current_emotion)
        .bind(&entry.note)
        .bind(entry.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .context("Failed to insert mood entry")?;

        tracing::debug!("Created mood entry {} ({})", entry.id, entry.current_emotion);
        Ok(entry)
    }

    async fn get_entry(&self, id: Uuid) -> Result<Option<MoodEntry>> {
        let row = sqlx::query(
            "SELECT id, user_id, current_emotion, target_emotion, note, created_at \
             FROM mood_entries WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query mood entry")?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn set_target_emotion(&self, id: Uuid, target_emotion: &str) -> Result<()> {
        let result = sqlx::query("UPDATE mood_entries SET target_emotion = ? WHERE id = ?")
            .bind(target_emotion)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update target emotion")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Mood entry {} not found", id);
        }
        Ok(())
    }

    async fn record_session(&self, record: NewSessionRecord) -> Result<MeditationSession> {
        let session = MeditationSession {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            mood_entry_id: record.mood_entry_id,
            completed: record.completed,
            duration_seconds: record.duration_seconds,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO meditation_sessions \
             (id, user_id, mood_entry_id, completed, duration_seconds, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(&session.user_id)
        .bind(session.mood_entry_id.to_string())
        .bind(session.completed)
        .bind(i64::from(session.duration_seconds))
        .bind(session.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .context("Failed to insert meditation session")?;

        Ok(session)
    }

    async fn recent_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>> {
        let rows = sqlx::query(
            "SELECT id, user_id, current_emotion, target_emotion, note, created_at \
             FROM mood_entries WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .context("Failed to query recent mood entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn session_stats(&self, user_id: &str) -> Result<SessionStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS sessions, \
                    COALESCE(SUM(completed), 0) AS completed, \
                    COALESCE(SUM(duration_seconds), 0) AS total_seconds \
             FROM meditation_sessions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate sessions")?;

        Ok(SessionStats {
            sessions: row.get::<i64, _>("sessions").max(0) as u64,
            completed: row.get::<i64, _>("completed").max(0) as u64,
            total_seconds: row.get::<i64, _>("total_seconds").max(0) as u64,
        })
    }
}

/// Exact journey matches first, then lines sharing either end of it.
#[async_trait]
impl InspirationSource for SqliteStore {
    async fn inspirations(
        &self,
        current_emotion: &str,
        target_emotion: &str,
        limit: usize,
    ) -> Result<Vec<InspirationLine>> {
        let rows = sqlx::query(
            "SELECT current_emotion, target_emotion, text, \
                    (current_emotion = ?1) + (target_emotion = ?2) AS score \
             FROM inspiration_lines \
             WHERE current_emotion = ?1 OR target_emotion = ?2 \
             ORDER BY score DESC, id ASC LIMIT ?3",
        )
        .bind(current_emotion.trim().to_lowercase())
        .bind(target_emotion.trim().to_lowercase())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .context("Failed to query inspiration lines")?;

        Ok(rows
            .iter()
            .map(|row| InspirationLine {
                current_emotion: row.get("current_emotion"),
                target_emotion: row.get("target_emotion"),
                text: row.get("text"),
            })
            .collect())
    }
}
