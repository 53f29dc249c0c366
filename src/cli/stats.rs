use anyhow::Result;

use quicknote::config::QuicknoteConfig;

/// Display note statistics in the terminal.
pub fn stats(config: &QuicknoteConfig, tag_limit: usize) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = quicknote::db::open_database(&db_path)?;

    let response = quicknote::notes::stats::note_stats(&conn, tag_limit)?;

    println!("Note Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total notes:         {}", response.total_notes);
    println!("  Deleted:             {}", response.deleted_notes);
    println!();

    println!("By Sentiment:");
    for s in &["positive", "neutral", "negative"] {
        let count = response.by_sentiment.get(*s).copied().unwrap_or(0);
        println!("  {:<12} {}", s, count);
    }
    println!();

    println!("By Summarizer:");
    for (name, count) in &response.by_summarizer {
        println!("  {:<12} {}", name, count);
    }
    println!();

    if !response.top_tags.is_empty() {
        println!("Top Tags:");
        for (tag, count) in &response.top_tags {
            println!("  {:<24} {}", tag, count);
        }
        println!();
    }

    if let Some(ref oldest) = response.oldest_note {
        println!("Oldest note:           {oldest}");
    }
    if let Some(ref newest) = response.newest_note {
        println!("Newest note:           {newest}");
    }

    Ok(())
}
