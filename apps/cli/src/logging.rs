//! Structured logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CRATES: [&str; 2] = ["joplin_anki_sync", "notesync_core"];

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over the command line.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "info",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}

/// Filter directives for our crates; a level that already names a target is
/// used verbatim.
fn directives(level: &str) -> String {
    if level.contains('=') {
        return level.to_string();
    }
    CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",")
}
