//! Integration tests for the CloudFlow file catalog

mod cli_binary;
mod config_integration;
mod enrichment_flow;
mod export_integration;
mod ingest_flow;
mod logging_default;
mod store_integration;
mod test_utils;
