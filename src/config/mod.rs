//! Configuration for the dashboard
//!
//! Configuration is loaded in order of precedence:
//! 1. Command-line flags (highest priority)
//! 2. Environment variables (PANEBOARD_CONFIG, PANEBOARD_LOG, PANEBOARD_TICK_MS)
//! 3. Config file (~/.config/paneboard/config.toml)
//! 4. Built-in defaults (lowest priority)

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod observability;
mod panes;
mod serialization;

#[cfg(test)]
mod tests;

pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use panes::{PaneConfig, PaneKindConfig};
#[cfg(test)]
pub use panes::BindingConfig;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Input wait per session cycle unless configured
pub const DEFAULT_TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Upper bound on waiting for a key each cycle
    pub tick: Duration,

    /// Run the built-in demo dashboard instead of configured panes
    pub demo: bool,

    pub logging: LoggingConfig,

    /// Panes in registration order
    pub panes: Vec<PaneConfig>,

    /// File the configuration was read from
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            demo: false,
            logging: LoggingConfig::default(),
            panes: Vec::new(),
            source: None,
        }
    }
}

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub tick_ms: Option<u64>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// [[panes]] entries
    #[serde(default)]
    pub panes: Vec<PaneConfig>,
}

impl Config {
    /// Default config file path: ~/.config/paneboard/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("paneboard").join("config.toml"))
    }

    /// Path the configuration would be read from: flag > env > default
    pub fn resolve_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
        cli_path
            .or_else(|| std::env::var("PANEBOARD_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::config_path)
    }

    /// Load configuration from the process environment
    pub fn load(cli_path: Option<PathBuf>, demo: bool) -> Result<Self> {
        Self::load_with(cli_path, demo, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup
    pub fn load_with<E>(cli_path: Option<PathBuf>, demo: bool, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        // An explicitly named file must exist; the default one is optional
        let explicit = cli_path.or_else(|| env("PANEBOARD_CONFIG").map(PathBuf::from));
        let required = explicit.is_some();
        let path = explicit.or_else(Self::config_path);

        let (file, source) = match path {
            Some(path) => match read_file_config(&path, required)? {
                Some(file) => (file, Some(path)),
                None => (FileConfig::default(), None),
            },
            None => (FileConfig::default(), None),
        };

        let mut config = Self::from_file(file, &env)?;
        config.demo = demo;
        config.source = source;
        Ok(config)
    }

    /// Merge a parsed file with environment overrides and validate the result
    pub(crate) fn from_file<E>(file: FileConfig, env: &E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        // Tick: env > file > default
        let tick_ms = match env("PANEBOARD_TICK_MS") {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid PANEBOARD_TICK_MS value {:?}", value))?,
            ),
            None => file.tick_ms,
        };
        let tick = tick_ms.map(Duration::from_millis).unwrap_or(DEFAULT_TICK);
        if tick.is_zero() {
            bail!("tick_ms must be greater than zero");
        }

        // Log level: env > file > default (RUST_LOG still wins at subscriber setup)
        let mut logging = LoggingConfig::from_file(file.logging);
        if let Some(level) = env("PANEBOARD_LOG") {
            logging.level = level;
        }

        panes::validate(&file.panes).context("Invalid pane configuration")?;

        Ok(Self {
            tick,
            demo: false,
            logging,
            panes: file.panes,
            source: None,
        })
    }

    /// Whether the built-in demo runs instead of configured panes
    pub fn runs_demo(&self) -> bool {
        self.demo || self.panes.is_empty()
    }

    /// Write the commented default template to `path`, refusing to overwrite
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, Self::default().to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn read_file_config(path: &Path, required: bool) -> Result<Option<FileConfig>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot read config file {}", path.display()))
        }
    };
    let file = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(Some(file))
}
