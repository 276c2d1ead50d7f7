//! Database layer - connection pool, schema, repositories, and stores
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default) - no shared connection
//! - Post lists hydrate tags with one extra query - no N+1
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Transactions for multi-row writes

pub mod memory;
pub mod pool;
pub mod repos;
pub mod schema;
pub mod seed;
pub mod store;

pub use sqlx::PgPool;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::{DbError, PostRepo, TagRepo, UserRepo};
pub use store::{BlogStore, PgStore};
