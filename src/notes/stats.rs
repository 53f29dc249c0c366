use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate view of the note store, shown by `quicknote stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_notes: u64,
    pub deleted_notes: u64,
    pub by_sentiment: BTreeMap<String, u64>,
    pub by_summarizer: BTreeMap<String, u64>,
    pub top_tags: Vec<(String, u64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_note: Option<String>,
}

/// Compute store statistics. `tag_limit` caps the number of tags in `top_tags`.
pub fn note_stats(conn: &Connection, tag_limit: usize) -> Result<StatsResponse> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
    let deleted: i64 = conn.query_row(
        "SELECT COUNT(*) FROM note_log WHERE operation = 'delete'",
        [],
        |row| row.get(0),
    )?;

    let by_sentiment = grouped_counts(
        conn,
        "SELECT sentiment, COUNT(*) FROM notes GROUP BY sentiment",
    )?;
    let by_summarizer = grouped_counts(
        conn,
        "SELECT COALESCE(summarizer, 'unknown'), COUNT(*) FROM notes GROUP BY 1",
    )?;

    let mut stmt = conn.prepare(
        "SELECT tag.value, COUNT(*) AS uses FROM notes, json_each(notes.tags) AS tag \
         GROUP BY tag.value ORDER BY uses DESC, tag.value ASC LIMIT ?1",
    )?;
    let top_tags = stmt
        .query_map(params![tag_limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM notes",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(StatsResponse {
        total_notes: total as u64,
        deleted_notes: deleted as u64,
        by_sentiment,
        by_summarizer,
        top_tags,
        oldest_note: oldest,
        newest_note: newest,
    })
}

fn grouped_counts(conn: &Connection, sql: &str) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(sql)?;
    let map = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(map)
}
