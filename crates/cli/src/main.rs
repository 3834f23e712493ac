//! ChefAI CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Write the default config file
//! - `ask`: Answer a single question
//! - `serve`: Start the HTTP API
//! - `history`: Show recent questions
//! - `recipes`: List or show saved recipes

use clap::{Parser, Subcommand};

mod commands;
mod runtime;

#[derive(Parser)]
#[command(
    name = "chefai",
    about = "ChefAI: a conversational recipe assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Ask a single question
    Ask {
        /// The question
        question: String,

        /// Comma-separated dietary restrictions, e.g. "vegan, gluten-free"
        #[arg(short, long)]
        diet: Option<String>,

        /// Print the tool calls made while answering
        #[arg(long)]
        trace: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the most recent questions
    History {
        /// How many to show
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// List saved recipes, or show one by id
    Recipes {
        /// Recipe id to show
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask {
            question,
            diet,
            trace,
        } => commands::ask::run(question, diet, trace).await?,
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::History { limit } => commands::history::run(limit).await?,
        Commands::Recipes { id } => commands::recipes::run(id).await?,
    }

    Ok(())
}
