//! Domain entities - the core business objects.

mod content;
mod profile;

pub use content::{ContentItem, ContentPatch, ContentType, Tier, parse_timestamp};
pub use profile::{CreatorProfile, EnrichedContent};
