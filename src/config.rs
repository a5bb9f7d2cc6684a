//! User configuration loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::calculator::DEFAULT_PRECISION;

/// Most decimal places an `f64` can meaningfully show.
pub const MAX_PRECISION: usize = 15;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Decimal places results are formatted with before trimming.
    pub precision: usize,
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
    pub repl: ReplConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplConfig {
    pub prompt: String,
    /// Draw a `|` at the cursor position when printing the buffer.
    pub show_cursor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            log_level: "warn".to_string(),
            repl: ReplConfig::default(),
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            show_cursor: true,
        }
    }
}

impl Config {
    /// Default config file location, e.g. `~/.config/calcline/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calcline").join("config.toml"))
    }

    /// Load the config from `path`, or from the default location.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_PRECISION).contains(&self.precision) {
            anyhow::bail!(
                "precision must be between 1 and {}, got {}",
                MAX_PRECISION,
                self.precision
            );
        }
        Ok(())
    }

    /// Override the precision from the command line.
    pub fn with_precision(mut self, precision: Option<usize>) -> Result<Self> {
        if let Some(precision) = precision {
            self.precision = precision;
            self.validate()?;
        }
        Ok(self)
    }
}
