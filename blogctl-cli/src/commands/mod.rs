//! Command implementations for the blogctl CLI

pub mod seed;
pub mod serve;
pub mod tags;

pub use seed::run_seed;
pub use serve::run_serve;
pub use tags::run_tags;

use anyhow::{Context, Result};
use clap::Args;

use blogctl_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use blogctl_server::db::{create_pool_with_options, PgPool};

/// Database connection arguments shared by every command.
///
/// Global so they may follow a nested subcommand (`tags posts X --database-url ...`).
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Database URL (overrides .env)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS, global = true)]
    pub max_connections: u32,
}

impl DbArgs {
    /// Connect using the resolved database URL.
    pub async fn connect(&self) -> Result<PgPool> {
        let database_url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

        create_pool_with_options(database_url, self.max_connections)
            .await
            .context("Failed to create database pool")
    }
}
