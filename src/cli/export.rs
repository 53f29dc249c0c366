use anyhow::Result;

use quicknote::config::QuicknoteConfig;
use quicknote::notes::store::list_notes;

/// Export all notes, newest first, as JSON to stdout.
pub fn export(config: &QuicknoteConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = quicknote::db::open_database(&db_path)?;

    let notes = list_notes(&conn)?;

    let json = serde_json::to_string_pretty(&notes)?;
    println!("{json}");

    eprintln!("Exported {} notes.", notes.len());
    Ok(())
}
