//! `chefai recipes`: List saved recipes or show one in full.

use chefai_config::AppConfig;
use chefai_core::history::SavedRecipeStore;
use chefai_stores::SqliteStore;

pub async fn run(id: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.history.database_url == "memory" {
        println!("Saved recipes are in-memory; nothing persists between runs.");
        return Ok(());
    }

    std::fs::create_dir_all(AppConfig::config_dir())?;
    let store = SqliteStore::new(&config.history.database_url).await?;

    let Some(id) = id else {
        let recipes = store.list().await?;
        if recipes.is_empty() {
            println!("No saved recipes. Save one with POST /api/recipes.");
        }
        for recipe in recipes {
            println!("{}  {}", recipe.recipe_id, recipe.query);
        }
        return Ok(());
    };

    let recipe = store
        .get(&id)
        .await?
        .ok_or_else(|| format!("No saved recipe with id {id}"))?;

    println!("{}", recipe.recipe_id);
    println!("Saved: {}", recipe.timestamp.format("%Y-%m-%d %H:%M:%S"));
    println!("Question: {}\n", recipe.query);
    println!("{}\n", recipe.answer);
    if !recipe.trace.is_empty() {
        println!("Tool calls:");
        for invocation in &recipe.trace {
            let status = if invocation.success { "ok" } else { "failed" };
            println!("  [{status}] {} {}", invocation.tool, invocation.arguments);
        }
    }
    Ok(())
}
