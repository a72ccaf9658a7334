//! CLI presentation: text and json formatters per command family.

mod ingest;
mod listing;
mod shared;
mod status;

pub use ingest::format_ingest_outcome;
pub use listing::{format_listing_json, format_listing_text, format_node_detail};
pub use shared::to_json;
pub use status::{format_status_text, format_usage_text, StatusReport};
