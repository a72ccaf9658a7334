//! CloudFlow: a personal cloud on local storage
//!
//! Files and folders dropped or selected by the user are walked, stored in a durable
//! local catalog under a usage quota, and optionally described by an AI provider.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod provider;
pub mod store;
pub mod types;
pub mod views;
