//! SQLite-based transcript store.
//!
//! Transcript names are the primary key, so a second insert under the same
//! name is rejected by the database even if two writers both passed the
//! in-process existence check.

use super::{Transcript, TranscriptStore, TranscriptSummary};
use crate::error::{HarkError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS transcripts (
        name TEXT PRIMARY KEY,
        text TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

/// SQLite-based transcript store.
pub struct SqliteTranscriptStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteTranscriptStore {
    /// Open (or create) a store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode so the query path can read while ingestion writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite transcript store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|e| HarkError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.lock()?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| HarkError::Store("Transcript store is closed".to_string()))?;
        f(conn)
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default()
    }
}

#[async_trait]
impl TranscriptStore for SqliteTranscriptStore {
    #[instrument(skip(self, transcript), fields(name = %transcript.name))]
    async fn insert(&self, transcript: &Transcript) -> Result<()> {
        self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO transcripts (name, text, created_at) VALUES (?1, ?2, ?3)",
                params![transcript.name, transcript.text, Utc::now().to_rfc3339()],
            );

            match result {
                Ok(_) => {
                    debug!("Inserted transcript");
                    Ok(())
                }
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(HarkError::DuplicateName(transcript.name.clone()))
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    async fn names(&self) -> Result<HashSet<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM transcripts")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<HashSet<_>, _>>()?;
            Ok(names)
        })
    }

    async fn find_all_texts(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT text FROM transcripts ORDER BY rowid")?;
            let texts = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(texts)
        })
    }

    async fn list(&self) -> Result<Vec<TranscriptSummary>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT name, text, created_at FROM transcripts ORDER BY rowid")?;
            let rows = stmt
                .query_map([], |row| {
                    let name: String = row.get(0)?;
                    let text: String = row.get(1)?;
                    let created_at: String = row.get(2)?;
                    Ok((name, text, created_at))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows
                .into_iter()
                .map(|(name, text, created_at)| TranscriptSummary {
                    name,
                    chars: text.chars().count(),
                    created_at: Self::parse_timestamp(&created_at),
                })
                .collect())
        })
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM transcripts", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    async fn close(&self) -> Result<()> {
        let conn = self.lock()?.take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| HarkError::Database(e))?;
            debug!("Closed transcript store");
        }
        Ok(())
    }
}
