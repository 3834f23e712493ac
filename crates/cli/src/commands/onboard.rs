//! `chefai onboard`: First-time setup.

use chefai_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("ChefAI: First-Time Setup");
    println!("=========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    } else {
        println!("Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\nConfig already exists at: {}", config_path.display());
        println!("Edit it manually or delete it and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set your model credentials, either in config.toml or via");
    println!("     AZURE_OPENAI_API_KEY / AZURE_OPENAI_ENDPOINT or OPENAI_API_KEY");
    println!("  2. Set TAVILY_API_KEY to enable web search");
    println!("  3. Ask something:  chefai ask \"What can I cook with leeks?\"");
    println!("  4. Or serve the API:  chefai serve");

    Ok(())
}
