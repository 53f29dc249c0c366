//! Note Store: durable keyed storage for note records.
//!
//! The free functions ([`create_note`], [`list_notes`], [`get_note`], [`delete_note`])
//! operate on a borrowed [`Connection`] and run each mutation in one transaction, so a
//! note is written with all fields or not at all. [`NoteStore`] owns the shared
//! connection and moves every call onto the blocking pool; the connection mutex is the
//! critical section that serializes writers.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{NewNote, Note, Sentiment};
use crate::db::HealthReport;
use crate::error::{Error, Result};

const NOTE_COLUMNS: &str = "id, title, summary, tags, sentiment, source_text, created_at";

/// Insert a new note. Assigns a fresh `id` and `created_at` and writes the audit log
/// entry in the same transaction.
pub fn create_note(conn: &mut Connection, note: &NewNote) -> Result<Note> {
    if note.title.trim().is_empty() {
        return Err(Error::InvalidInput("note title must not be empty".into()));
    }
    let tags_json = serde_json::to_string(&note.tags)?;

    let tx = conn.transaction()?;

    let created_at = next_created_at(&tx)?;
    tx.execute(
        "INSERT INTO notes (title, summary, tags, sentiment, source_text, created_at, summarizer) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            note.title,
            note.summary,
            tags_json,
            note.sentiment.as_str(),
            note.source_text,
            format_timestamp(&created_at),
            note.summarizer,
        ],
    )?;
    let id = tx.last_insert_rowid();

    let details = note
        .summarizer
        .as_ref()
        .map(|name| serde_json::json!({ "summarizer": name }));
    write_audit_log(&tx, "create", id, details.as_ref())?;

    tx.commit()?;

    Ok(Note {
        id,
        title: note.title.clone(),
        summary: note.summary.clone(),
        tags: note.tags.clone(),
        sentiment: note.sentiment,
        created_at,
        source_text: note.source_text.clone(),
    })
}

/// All notes, newest first. Ties on `created_at` fall back to the higher id first.
pub fn list_notes(conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at DESC, id DESC"
    ))?;

    let rows = stmt
        .query_map([], NoteRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(NoteRow::into_note).collect()
}

/// Fetch one note by id.
pub fn get_note(conn: &Connection, id: i64) -> Result<Note> {
    conn.query_row(
        &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
        params![id],
        NoteRow::from_row,
    )
    .optional()?
    .ok_or(Error::NotFound(id))?
    .into_note()
}

/// Permanently remove a note. A second delete of the same id fails with `NotFound`.
pub fn delete_note(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;

    let removed = tx.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(Error::NotFound(id));
    }
    write_audit_log(&tx, "delete", id, None)?;

    tx.commit()?;
    Ok(())
}

pub fn count_notes(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Timestamp for the next insert: the current time at microsecond precision, but never
/// earlier than the newest stored note.
fn next_created_at(conn: &Connection) -> Result<DateTime<Utc>> {
    let now = Utc::now();
    let now = DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now);

    let latest: Option<String> =
        conn.query_row("SELECT MAX(created_at) FROM notes", [], |row| row.get(0))?;

    match latest.as_deref().map(parse_timestamp).transpose()? {
        Some(latest) if latest > now => Ok(latest),
        _ => Ok(now),
    }
}

/// Fixed-width RFC 3339 so that lexical order in SQLite equals chronological order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("malformed stored timestamp {raw:?}: {e}")))
}

/// Write an entry to the note_log audit table.
fn write_audit_log(
    conn: &Connection,
    operation: &str,
    note_id: i64,
    details: Option<&serde_json::Value>,
) -> Result<()> {
    let now = format_timestamp(&Utc::now());
    let details_json = details.map(|d| d.to_string());
    conn.execute(
        "INSERT INTO note_log (operation, note_id, details, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![operation, note_id, details_json, now],
    )?;
    Ok(())
}

/// Raw column values, converted to a [`Note`] outside the rusqlite row callback.
struct NoteRow {
    id: i64,
    title: String,
    summary: String,
    tags: String,
    sentiment: String,
    source_text: String,
    created_at: String,
}

impl NoteRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            summary: row.get(2)?,
            tags: row.get(3)?,
            sentiment: row.get(4)?,
            source_text: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_note(self) -> Result<Note> {
        let sentiment: Sentiment = self
            .sentiment
            .parse()
            .map_err(|e: String| Error::Storage(format!("note {}: {e}", self.id)))?;
        Ok(Note {
            id: self.id,
            title: self.title,
            summary: self.summary,
            tags: serde_json::from_str(&self.tags)?,
            sentiment,
            created_at: parse_timestamp(&self.created_at)?,
            source_text: self.source_text,
        })
    }
}

/// Shared handle to the note database, safe to clone into every request task.
#[derive(Clone)]
pub struct NoteStore {
    db: Arc<Mutex<Connection>>,
}

impl NoteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    pub async fn create(&self, note: NewNote) -> Result<Note> {
        self.run(move |conn| create_note(conn, &note)).await
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        self.run(|conn| list_notes(conn)).await
    }

    pub async fn get(&self, id: i64) -> Result<Note> {
        self.run(move |conn| get_note(conn, id)).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.run(move |conn| delete_note(conn, id)).await
    }

    pub async fn count(&self) -> Result<u64> {
        self.run(|conn| count_notes(conn)).await
    }

    pub async fn health(&self) -> Result<HealthReport> {
        self.run(|conn| {
            crate::db::check_database_health(conn).map_err(|e| Error::Storage(format!("{e:#}")))
        })
        .await
    }

    /// Run a synchronous store operation on the blocking pool while holding the
    /// connection lock.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| Error::Internal(format!("db lock poisoned: {e}")))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("db task failed: {e}")))?
    }
}
