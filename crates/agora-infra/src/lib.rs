//! # Agora Infrastructure
//!
//! Concrete implementations of the ports defined in `agora-core`, plus the
//! feed assembler and refresh loop that run on top of them.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL content store via SeaORM
//! - `rest` - Hosted backend content store via its PostgREST API

pub mod database;
pub mod feed;
pub mod memory;

#[cfg(feature = "rest")]
pub mod rest;

// Re-exports - always available
pub use feed::{FeedAssembler, FeedSnapshot, FeedView, LoopState, RefreshHandle, RefreshLoop};
pub use memory::InMemoryContentStore;

#[cfg(feature = "postgres")]
pub use database::PostgresContentStore;

#[cfg(feature = "rest")]
pub use rest::{PostgrestConfig, PostgrestContentStore};
