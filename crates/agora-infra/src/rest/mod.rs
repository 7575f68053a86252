//! Hosted backend-as-a-service adapter (PostgREST over HTTP).

mod postgrest;

pub use postgrest::{PostgrestConfig, PostgrestContentStore};
