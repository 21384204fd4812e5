//! The main config loading module for quickfiler.
//!
//! Handles loading and deserializing settings from `qf.toml`.
//!
//! Provides the main [Config] struct, as well as the internal [RawConfig] used for parsing.
//! Also implements default config generation for `qf --init`.

use crate::config::{Cache, Editor, General, InternalGeneral, Keys};
use crate::utils::get_home;

use log::{info, warn};
use serde::Deserialize;

use std::path::Path;
use std::{fs, io, path::PathBuf};

/// Raw configuration as read from the toml file.
/// It is converted into the main [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
    cache: Cache,
    editor: Editor,
    keys: Keys,
}

/// Main configuration struct for quickfiler
#[derive(Debug)]
pub struct Config {
    general: InternalGeneral,
    cache: Cache,
    editor: Editor,
    keys: Keys,
}

/// Conversion from RawConfig to Config
impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            cache: raw.cache,
            editor: raw.editor,
            keys: raw.keys,
        }
    }
}

impl Config {
    /// Loads the configuration from [Config::default_path].
    /// A missing or invalid file yields the internal defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!(
                "No qf.toml found at {}, using internal defaults",
                path.display()
            );
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error parsing config: {}", e);
                    warn!("Error parsing {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawConfig>(content).map(Config::from)
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    #[inline]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Determine the default configuration file path.
    /// Checks the QF_CONFIG environment variable first,
    /// XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/quickfiler/qf.toml.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("QF_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("quickfiler/qf.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/quickfiler/qf.toml");
        }
        PathBuf::from("qf.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_TOML)?;
        println!("Default config generated at {:?}", path);
        Ok(())
    }
}

/// Default configuration options
impl Default for Config {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

const DEFAULT_TOML: &str = r##"# qf.toml - default configuration for quickfiler

# Note:
# Commented values are the internal defaults of quickfiler.
# Run `qf --config-help` for a description of every option.

[general]
exclude_gitignore = true
exclude = "**/.git"
# case_sensitive = false
# move_to_trash = true
# max_results = 10000
# debounce_ms = 300

# [cache]
# ttl_secs = 600
# capacity = 1000

[editor]
cmd = "nvim"
# diff_args = ["-d"]
# split_args = ["-O"]

# [keys]
# accept = ["Enter"]
# descend = ["Tab"]
# up = ["Up", "Ctrl+p"]
# down = ["Down", "Ctrl+n"]
# page_up = ["PageUp"]
# page_down = ["PageDown"]
# toggle_case = ["Alt+c"]
# quit = ["Esc", "Ctrl+c"]
"##;
