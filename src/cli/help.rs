//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string used in log fields (e.g. "add", "list").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Add { .. } => "add",
        Commands::List { .. } => "list",
        Commands::Remove { .. } => "remove",
        Commands::Clear { .. } => "clear",
        Commands::Export { .. } => "export",
        Commands::Usage { .. } => "usage",
        Commands::Describe { .. } => "describe",
        Commands::Status { .. } => "status",
    }
}

/// Whether the command changes the catalog.
pub fn is_mutating(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Add { .. }
            | Commands::Remove { .. }
            | Commands::Clear { .. }
            | Commands::Describe { .. }
    )
}
