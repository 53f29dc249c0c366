//! CLI `doctor` command: database and summarizer diagnostics.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;

use quicknote::config::QuicknoteConfig;
use quicknote::db;

pub fn doctor(config: &QuicknoteConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("No database at {}.", db_path.display());
        println!("It is created on the first `quicknote serve`.");
        return Ok(());
    }

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;
    let activity = audit_activity(&conn)?;

    println!("QuickNote doctor");
    println!();
    println!("[storage]");
    println!("  path             {}", db_path.display());
    println!("  size             {}", format_bytes(file_len(&db_path)));
    println!("  wal              {}", format_bytes(file_len(&wal_path(&db_path))));
    println!(
        "  schema           v{} (binary expects v{})",
        report.schema_version,
        db::migrations::CURRENT_SCHEMA_VERSION
    );
    println!(
        "  integrity        {}",
        if report.integrity_ok { "ok" } else { report.integrity_details.as_str() }
    );
    println!();

    println!("[notes]");
    println!("  stored           {}", report.note_count);
    for (operation, count) in &activity.by_operation {
        println!("  {:<16} {count}", format!("{operation}d"));
    }
    if let Some(last) = &activity.last_entry {
        println!("  last activity    {last}");
    }
    let creates = activity.by_operation.get("create").copied().unwrap_or(0);
    let deletes = activity.by_operation.get("delete").copied().unwrap_or(0);
    if creates.saturating_sub(deletes) != report.note_count {
        println!(
            "  WARNING: audit log ({creates} created, {deletes} deleted) disagrees with {} stored notes",
            report.note_count
        );
    }
    println!();

    println!("[summarizer]");
    println!("  provider         {}", config.summarizer.provider);
    if config.summarizer.provider == "huggingface" {
        println!("  endpoint         {}", config.summarizer.endpoint);
        println!(
            "  api key          {}",
            if config.summarizer.api_key.is_some() { "set" } else { "MISSING" }
        );
        println!("  timeout          {}s", config.summarizer.timeout_secs);
    }

    if !report.integrity_ok {
        println!();
        println!("The database failed its integrity check. To recover:");
        println!("  quicknote export > notes.json   # save what is still readable");
        println!("  then restore {} from a backup", db_path.display());
    }

    Ok(())
}

struct AuditActivity {
    by_operation: BTreeMap<String, u64>,
    last_entry: Option<String>,
}

fn audit_activity(conn: &Connection) -> Result<AuditActivity> {
    let mut stmt =
        conn.prepare("SELECT operation, COUNT(*) FROM note_log GROUP BY operation")?;
    let by_operation = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let last_entry: Option<String> =
        conn.query_row("SELECT MAX(created_at) FROM note_log", [], |row| row.get(0))?;

    Ok(AuditActivity {
        by_operation,
        last_entry,
    })
}

/// SQLite keeps the write-ahead log next to the database as `<name>-wal`.
fn wal_path(db_path: &Path) -> PathBuf {
    let mut wal = db_path.as_os_str().to_owned();
    wal.push("-wal");
    PathBuf::from(wal)
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn format_bytes(bytes: u64) -> String {
    match bytes {
        b if b < 1024 => format!("{b} B"),
        b if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}
