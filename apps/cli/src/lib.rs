//! One-way sync from Joplin notes to Anki flashcards.
//!
//! Provides:
//! - Config and token file loading
//! - HTTP clients for the Joplin web clipper and AnkiConnect
//! - Note extraction into desired cards
//! - The sync engine that diffs and applies changes

pub mod anki;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod joplin;
pub mod logging;
pub mod sync;

pub use cli::Cli;
pub use config::Config;
pub use error::{ConfigError, Result, SyncError};
pub use sync::{SyncEngine, SyncReport, SyncStats};

/// Load configuration and run one sync.
pub async fn run(cli: &Cli) -> Result<SyncReport> {
    let mut config = config::load(&cli.config_paths())?;
    if cli.strict {
        config.strict = true;
    }

    tracing::info!(
        folders = ?config.folders,
        joplin = %config.joplin_origin,
        anki = %config.anki_origin,
        dry_run = cli.dry_run,
        "starting sync"
    );

    let engine = SyncEngine::new(config)?;
    engine.run(cli.dry_run).await
}
