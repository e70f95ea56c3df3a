//! User configuration directory
//!
//! Locates the per-user settings file. Follows XDG on Linux and the standard
//! locations on macOS.
//!
//! `CASABUILD_CONFIG_DIR` overrides the platform default.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "CASABUILD_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "casabuild";

/// Per-user settings file name
const USER_CONFIG_FILE: &str = "config.toml";

/// Platform-specific directory provider for casabuild
#[derive(Debug, Clone)]
pub struct CasabuildDirs {
    config_dir: PathBuf,
}

impl CasabuildDirs {
    /// Create a new `CasabuildDirs` instance
    ///
    /// Checks the environment first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Directory provider rooted at `config_dir`
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/casabuild` or `~/.config/casabuild`
    /// - macOS: `~/Library/Application Support/casabuild`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the per-user settings file path
    #[must_use]
    pub fn user_config_path(&self) -> PathBuf {
        self.config_dir.join(USER_CONFIG_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Some(path) = env::var_os(ENV_CONFIG_DIR).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for CasabuildDirs {
    fn default() -> Self {
        Self::new()
    }
}
