//! Property-based tests for catalog invariants

mod listing_order;
mod quota;
