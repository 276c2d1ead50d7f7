//! Seed command - load sample users, posts, and tags

use anyhow::{Context, Result};
use clap::Parser;

use blogctl_server::db::seed;

use super::DbArgs;

#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Drop the users, posts, tags, and post_tags tables first
    #[arg(long)]
    pub reset: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

pub async fn run_seed(args: SeedArgs) -> Result<()> {
    let pool = args.db.connect().await?;

    let summary = seed::run(&pool, args.reset)
        .await
        .context("Seeding failed (use --reset if sample users already exist)")?;

    println!(
        "Seeded {} users, {} posts, {} tags",
        summary.users, summary.posts, summary.tags
    );
    Ok(())
}
