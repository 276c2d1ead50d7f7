//! blogctl CLI - run and inspect the blog API
//!
//! - `serve`: HTTP API (tags and tag-filtered posts)
//! - `seed`: load sample users, posts, and tags
//! - `tags`: query tags and visible posts straight from the database

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "blogctl",
    author,
    version,
    about = "Blog API server with tag-filtered post listings"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create tables and insert sample data
    Seed(commands::seed::SeedArgs),
    /// Query tags and tagged posts
    Tags(commands::tags::TagsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so clap's env fallbacks see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Seed(args) => commands::run_seed(args).await?,
        Commands::Tags(args) => commands::run_tags(args).await?,
    }
    Ok(())
}
