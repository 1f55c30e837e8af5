//! Token and config file loading.
//!
//! Both files are JSON. Each is looked up, in order, at an explicit path
//! given on the command line, under `$HOME/.config/joplin-anki-sync/`, and in
//! the current directory. The first existing candidate wins.
//!
//! `token.json`:
//! ```json
//! { "token": "..." }
//! ```
//!
//! `config.json`:
//! ```json
//! {
//!   "folders": ["Math", "Biology"],
//!   "exclude_headers": ["Draft"],
//!   "exclude_notes": ["_"]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const APP_DIR: &str = "joplin-anki-sync";
pub const TOKEN_FILE: &str = "token.json";
pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_JOPLIN_ORIGIN: &str = "http://localhost:41184";
pub const DEFAULT_ANKI_ORIGIN: &str = "http://localhost:8765";
pub const DEFAULT_MODEL_NAME: &str = "Basic";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenFile {
    token: String,
}

/// Contents of `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    pub folders: Vec<String>,
    #[serde(default)]
    pub exclude_headers: Vec<String>,
    #[serde(default)]
    pub exclude_notes: Vec<String>,
    #[serde(default)]
    pub joplin_origin: Option<String>,
    #[serde(default)]
    pub anki_origin: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Everything a run needs to know, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    /// Titles of the root folders; each becomes one deck.
    pub folders: Vec<String>,
    pub exclude_headers: Vec<String>,
    pub exclude_notes: Vec<String>,
    pub joplin_origin: String,
    pub anki_origin: String,
    /// Note type used for new cards; must have `Front` and `Back` fields.
    pub model_name: String,
    /// Abort on title collisions instead of warning.
    pub strict: bool,
    pub timeout: Duration,
}

impl Config {
    /// Config with default origins and no exclusions.
    pub fn new(token: impl Into<String>, folders: Vec<String>) -> Self {
        Self {
            token: token.into(),
            folders,
            exclude_headers: Vec::new(),
            exclude_notes: Vec::new(),
            joplin_origin: DEFAULT_JOPLIN_ORIGIN.to_string(),
            anki_origin: DEFAULT_ANKI_ORIGIN.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            strict: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Merge the parsed config file with a token.
    pub fn from_file(file: FileConfig, token: String) -> Self {
        let mut config = Self::new(token, file.folders);
        config.exclude_headers = file.exclude_headers;
        config.exclude_notes = file.exclude_notes;
        if let Some(origin) = file.joplin_origin {
            config.joplin_origin = origin;
        }
        if let Some(origin) = file.anki_origin {
            config.anki_origin = origin;
        }
        if let Some(model) = file.model_name {
            config.model_name = model;
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config.strict = file.strict;
        config
    }

    /// Apply `JOPLIN_ORIGIN` and `ANKI_ORIGIN` overrides.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(origin) = lookup("JOPLIN_ORIGIN") {
            self.joplin_origin = origin;
        }
        if let Some(origin) = lookup("ANKI_ORIGIN") {
            self.anki_origin = origin;
        }
    }
}

/// Explicit file locations from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub config: Option<PathBuf>,
    pub token: Option<PathBuf>,
}

/// Load the run configuration from disk and the process environment.
///
/// `JOPLIN_TOKEN`, when set, replaces the token file entirely.
pub fn load(paths: &ConfigPaths) -> Result<Config, ConfigError> {
    let home = dirs::home_dir();
    let cwd = std::env::current_dir().ok();
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

    let config_path = locate(
        CONFIG_FILE,
        candidates(CONFIG_FILE, paths.config.as_deref(), home.as_deref(), cwd.as_deref()),
    )?;
    let file_config: FileConfig = read_json(&config_path)?;
    if file_config.folders.is_empty() {
        return Err(ConfigError::NoFolders { path: config_path });
    }

    let token = match env("JOPLIN_TOKEN") {
        Some(token) => token,
        None => {
            let token_path = locate(
                TOKEN_FILE,
                candidates(TOKEN_FILE, paths.token.as_deref(), home.as_deref(), cwd.as_deref()),
            )?;
            read_json::<TokenFile>(&token_path)?.token
        }
    };

    let mut config = Config::from_file(file_config, token);
    config.apply_env(env);
    Ok(config)
}

/// Candidate paths for `file_name`, most specific first.
///
/// An explicit path is the only candidate when given.
pub fn candidates(
    file_name: &str,
    explicit: Option<&Path>,
    home: Option<&Path>,
    cwd: Option<&Path>,
) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut out = Vec::new();
    if let Some(home) = home {
        out.push(home.join(".config").join(APP_DIR).join(file_name));
    }
    match cwd {
        Some(cwd) => out.push(cwd.join(file_name)),
        None => out.push(PathBuf::from(file_name)),
    }
    out
}

/// First candidate that exists on disk.
pub fn locate(name: &'static str, candidates: Vec<PathBuf>) -> Result<PathBuf, ConfigError> {
    match candidates.iter().find(|p| p.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(ConfigError::NotFound { name, candidates }),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}
