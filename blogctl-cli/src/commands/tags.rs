//! Tags command - query tags and tagged posts without the HTTP server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use blogctl_server::models::UserId;
use blogctl_server::{PgStore, TagService};

use super::DbArgs;

#[derive(Parser, Debug)]
#[command(about = "Query tags and the posts behind them")]
pub struct TagsArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(subcommand)]
    pub command: TagsCommand,
}

#[derive(Subcommand, Debug)]
pub enum TagsCommand {
    /// List every tag as JSON
    List,

    /// List posts carrying a tag, filtered by visibility
    Posts {
        /// Tag name, e.g. "#happy"
        tag: String,

        /// User id to view as (their inactive posts are included)
        #[arg(long)]
        viewer: Option<UserId>,
    },
}

pub async fn run_tags(args: TagsArgs) -> Result<()> {
    let store = PgStore::new(args.db.connect().await?);
    let service = TagService::new(&store);

    let output = match args.command {
        TagsCommand::List => {
            let tags = service.all_tags().await.context("Failed to list tags")?;
            json!({ "tags": tags })
        }
        TagsCommand::Posts { tag, viewer } => {
            let resolved = service
                .resolve_viewer(viewer)
                .await
                .context("Failed to load viewer")?;
            if let (Some(id), None) = (viewer, &resolved) {
                tracing::warn!(user_id = %id, "no such user, viewing anonymously");
            }

            let posts = service
                .resolve_posts_for_tag(&tag, resolved.as_ref())
                .await
                .with_context(|| format!("Failed to load posts for tag '{}'", tag))?;
            json!({ "posts": posts })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
