//! CLI parse: clap types for CloudFlow. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CloudFlow CLI - a personal cloud on local storage
#[derive(Parser, Debug)]
#[command(name = "cloudflow")]
#[command(about = "Store files and folders in a local catalog, list them and describe them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace directory (searched for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add files or folders (folders are walked recursively)
    Add {
        /// Files or folders to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Treat the paths as a plain file selection; folders are not walked
        #[arg(long)]
        selection: bool,
        /// Skip AI descriptions for this batch
        #[arg(long)]
        no_enrich: bool,
        /// Recreate dropped folders as folder entries
        #[arg(long)]
        preserve_folders: bool,
    },
    /// List stored entries
    List {
        /// Sort key
        #[arg(long, default_value = "name", value_parser = ["name", "size", "created", "kind"])]
        sort: String,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Only show one kind
        #[arg(long, value_parser = ["file", "folder"])]
        kind: Option<String>,
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Remove an entry (folders take their contents with them)
    Remove {
        /// Entry id
        id: String,
    },
    /// Remove every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Write an entry's content to a directory
    Export {
        /// Entry id
        id: String,
        /// Target directory
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
    /// Show storage usage against the quota
    Usage {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Request an AI description for one entry
    Describe {
        /// Entry id
        id: String,
    },
    /// Show store location, backend and configuration summary
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}
