use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quotacard_core::position::DEFAULT_POSITION_KEY;
use quotacard_core::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory shared with the quota collector
const STATE_DIR_NAME: &str = ".ai-usage-widget";

/// Snapshot file written by the collector
const DATA_FILE_NAME: &str = "quota_data.json";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Floating AI usage quota card")]
pub struct Config {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the quota snapshot JSON
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Refresh interval in milliseconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Card width in columns
    #[arg(short = 'w', long, global = true)]
    pub width: Option<u16>,

    /// Pin the card in place (disable dragging)
    #[arg(long)]
    pub fixed: bool,

    /// Keep card moves in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render the card once to stdout and exit
    Once {
        /// Print the render plan as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// `Some(json)` when running the one-shot `once` subcommand
    pub fn once_mode(&self) -> Option<bool> {
        match self.command {
            Some(Command::Once { json }) => Some(json),
            None => None,
        }
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Quota snapshot written by the collector
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// How often the snapshot is re-read, in milliseconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    /// Card position persistence
    #[serde(default)]
    pub position: PositionSettings,

    /// Card appearance
    #[serde(default)]
    pub ui: UiSettings,

    /// Usage color bands
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Where and whether the card position is stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSettings {
    /// Directory holding the position record
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,

    /// Record key (file stem)
    #[serde(default = "default_position_key")]
    pub key: String,

    /// Persist position across restarts
    #[serde(default = "default_persist")]
    pub persist: bool,
}

/// Card appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Card width in columns, borders included
    #[serde(default = "default_width")]
    pub width: u16,

    /// Horizontal padding inside the border
    #[serde(default = "default_padding")]
    pub padding: u16,

    /// Allow moving the card with the mouse
    #[serde(default = "default_draggable")]
    pub draggable: bool,

    /// Enable color output
    #[serde(default = "default_color")]
    pub color: bool,
}

/// `~/.ai-usage-widget`, shared with the collector
pub fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME))
}

fn default_data_path() -> PathBuf {
    default_state_dir().join(DATA_FILE_NAME)
}

fn default_refresh_interval() -> u64 {
    120_000
}

fn default_position_key() -> String {
    DEFAULT_POSITION_KEY.to_string()
}

fn default_persist() -> bool {
    true
}

fn default_width() -> u16 {
    42
}

fn default_padding() -> u16 {
    1
}

fn default_draggable() -> bool {
    true
}

fn default_color() -> bool {
    true
}

impl Default for PositionSettings {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
            key: default_position_key(),
            persist: default_persist(),
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            padding: default_padding(),
            draggable: default_draggable(),
            color: default_color(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            refresh_interval_ms: default_refresh_interval(),
            position: PositionSettings::default(),
            ui: UiSettings::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", p));
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("quotacard/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/quotacard/config.toml")),
            dirs::home_dir().map(|p| p.join(".quotacard.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path));
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(data) = &cli.data {
            self.data_path = data.clone();
        }
        if let Some(interval) = cli.interval {
            self.refresh_interval_ms = interval;
        }
        if let Some(width) = cli.width {
            self.ui.width = width;
        }
        if cli.fixed {
            self.ui.draggable = false;
        }
        if cli.no_persist {
            self.position.persist = false;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Expands `~` in paths and keeps numeric values in a usable range.
    pub fn validate(&mut self) {
        const MIN_REFRESH_INTERVAL: u64 = 1_000;
        const MIN_WIDTH: u16 = 24;

        if self.refresh_interval_ms < MIN_REFRESH_INTERVAL {
            self.refresh_interval_ms = MIN_REFRESH_INTERVAL;
        }
        if self.ui.width < MIN_WIDTH {
            self.ui.width = MIN_WIDTH;
        }
        // Padding may not eat the content area
        self.ui.padding = self.ui.padding.min((self.ui.width - 2) / 4);
        if self.thresholds.critical < self.thresholds.warning {
            self.thresholds.critical = self.thresholds.warning;
        }

        self.data_path = expand_home(&self.data_path);
        self.position.dir = expand_home(&self.position.dir);
    }
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
