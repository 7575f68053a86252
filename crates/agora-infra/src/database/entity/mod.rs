//! SeaORM entities for the content tables.

pub mod content;
pub mod profile;
