//! `chefai history`: Show recent questions, newest first.

use chefai_config::AppConfig;
use chefai_core::history::HistoryStore;
use chefai_stores::SqliteStore;

pub async fn run(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.history.database_url == "memory" {
        println!("History is in-memory; nothing persists between runs.");
        return Ok(());
    }

    std::fs::create_dir_all(AppConfig::config_dir())?;
    let store = SqliteStore::new(&config.history.database_url).await?;
    let records = store.recent(limit).await?;
    if records.is_empty() {
        println!("No questions yet.");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.question
        );
    }
    Ok(())
}
