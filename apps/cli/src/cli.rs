//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigPaths;

/// Sync markdown notes from Joplin into Anki flashcards.
///
/// Every top-level header of a note in the configured folders becomes one
/// card; cards whose header disappeared are deleted.
#[derive(Debug, Parser)]
#[command(name = "joplin-anki-sync", version)]
pub struct Cli {
    /// Path to config.json, also read from JOPLIN_ANKI_SYNC_CONFIG
    #[arg(long, env = "JOPLIN_ANKI_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to token.json
    #[arg(long)]
    pub token: Option<PathBuf>,

    /// Show what would change without touching Anki
    #[arg(long)]
    pub dry_run: bool,

    /// Fail on duplicate folder, note or card titles
    #[arg(long)]
    pub strict: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level or filter directives, e.g. `warn` or `joplin_anki_sync=trace`
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn config_paths(&self) -> ConfigPaths {
        ConfigPaths {
            config: self.config.clone(),
            token: self.token.clone(),
        }
    }
}
