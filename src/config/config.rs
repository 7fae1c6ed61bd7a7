use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hidden_columns: HiddenColumnsConfig,
    pub quick_filter: QuickFilterConfig,
    pub persist: PersistConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HiddenColumnsConfig {
    /// Ids of columns hidden when the grid starts
    pub init: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickFilterConfig {
    /// Filter while typing instead of only on Enter
    pub auto_apply: bool,

    /// Quiet period after the last keystroke before filtering (ms)
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Remember hidden columns between sessions
    pub enabled: bool,

    /// Store location (leave unset to use the data directory)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Render only the rows in view; column changes force a rescroll
    pub virtual_scroll: bool,

    /// Body width used before the terminal size is known
    pub body_width: u16,

    /// Tree depth of the generated demo data
    pub tree_levels: u32,

    /// Upper bound on children per generated node
    pub tree_children: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for QuickFilterConfig {
    fn default() -> Self {
        Self {
            auto_apply: true,
            delay_ms: 700,
        }
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            virtual_scroll: false,
            body_width: 80,
            tree_levels: 3,
            tree_children: 6,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "debug".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create a commented default config if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, Self::create_default_with_comments())?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Grid plugins configuration
# Location: ~/.config/grid-plugins/config.toml (Linux)
#           %APPDATA%\grid-plugins\config.toml (Windows)

[hidden_columns]
# Column ids hidden when the grid starts (persisted ids are hidden first)
init = []

[quick_filter]
# Filter while typing; when false only Enter applies the filter
auto_apply = true

# Quiet period after the last keystroke before the filter runs (ms)
delay_ms = 700

[persist]
# Remember hidden columns between sessions
enabled = true

# Store location (leave commented to use the data directory)
# path = "/path/to/persist.json"

[display]
# Render only the rows in view
virtual_scroll = false

# Body width used before the terminal size is known
body_width = 80

# Shape of the generated demo tree
tree_levels = 3
tree_children = 6

[logging]
# Used when RUST_LOG is not set
filter = "debug"
"#
        .to_string()
    }
}
