use crate::config_types::History;
use crate::config_types::HistoryPersistence;
use dirs::home_dir;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;

/// Name of the ranked history file inside the shell-filter home directory.
pub const HISTORY_FILENAME: &str = ".vscode-shell-filter-history";

/// Name of the optional TOML configuration file inside the home directory.
pub const CONFIG_TOML_FILE: &str = ".shell-filter.toml";

/// Overrides the directory that holds the history and config files. Mostly
/// useful for tests and for keeping several independent histories.
pub const SHELL_FILTER_HOME_ENV_VAR: &str = "SHELL_FILTER_HOME";

/// Application configuration loaded from disk and merged with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the ranked command history is loaded from and saved to.
    pub history_file: PathBuf,

    /// Settings that govern if the history is written back to disk.
    pub history: History,

    /// Program and leading arguments used to interpret a filter command. The
    /// command string is appended as the final argument.
    pub shell: Vec<String>,

    /// Directory that holds the history and config files. Defaults to the
    /// user's home directory.
    pub shell_filter_home: PathBuf,
}

/// Base config deserialized from `~/.shell-filter.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigToml {
    /// Location of the history file, when not the default.
    pub history_file: Option<PathBuf>,

    /// Shell invocation used to run filters, e.g. `["/bin/bash", "-c"]`.
    pub shell: Option<Vec<String>>,

    pub history: Option<History>,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub history_file: Option<PathBuf>,
    pub shell: Option<Vec<String>>,
    pub history_persistence: Option<HistoryPersistence>,
}

impl Config {
    /// Load configuration, optionally applying overrides (CLI flags). Merges
    /// `~/.shell-filter.toml`, built-in defaults, and any values provided in
    /// `overrides` (highest precedence).
    pub fn load_with_overrides(overrides: ConfigOverrides) -> std::io::Result<Self> {
        let shell_filter_home = find_shell_filter_home()?;
        let cfg = load_config_as_toml(&shell_filter_home)?;
        Self::load_from_base_config_with_overrides(cfg, overrides, shell_filter_home)
    }

    /// Meant to be used exclusively for tests: `load_with_overrides()` should
    /// be used in all other cases.
    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        shell_filter_home: PathBuf,
    ) -> std::io::Result<Self> {
        // Destructure ConfigOverrides fully to ensure all overrides are applied.
        let ConfigOverrides {
            history_file,
            shell,
            history_persistence,
        } = overrides;

        let history_file = history_file
            .or(cfg.history_file)
            .map(|p| resolve_relative_to(&shell_filter_home, p))
            .unwrap_or_else(|| shell_filter_home.join(HISTORY_FILENAME));

        let shell = shell.or(cfg.shell).unwrap_or_else(default_shell);
        if shell.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "`shell` must name at least a program",
            ));
        }

        let mut history = cfg.history.unwrap_or_default();
        if let Some(persistence) = history_persistence {
            history.persistence = persistence;
        }

        Ok(Self {
            history_file,
            history,
            shell,
            shell_filter_home,
        })
    }
}

/// Reads `<home>/.shell-filter.toml`. A missing file yields the defaults; a
/// malformed one is reported as `InvalidData`.
pub fn load_config_as_toml(shell_filter_home: &Path) -> std::io::Result<ConfigToml> {
    let config_toml_path = shell_filter_home.join(CONFIG_TOML_FILE);
    match std::fs::read_to_string(&config_toml_path) {
        Ok(contents) => toml::from_str::<ConfigToml>(&contents).map_err(|e| {
            tracing::error!("Failed to parse {CONFIG_TOML_FILE}: {e}");
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("{CONFIG_TOML_FILE} not found, using defaults");
            Ok(ConfigToml::default())
        }
        Err(e) => {
            tracing::error!("Failed to read {CONFIG_TOML_FILE}: {e}");
            Err(e)
        }
    }
}

/// Returns the directory that holds the history and config files: the value
/// of `$SHELL_FILTER_HOME` when set and non-empty, otherwise the user's home
/// directory. Does not verify that the directory exists.
pub fn find_shell_filter_home() -> std::io::Result<PathBuf> {
    if let Ok(val) = std::env::var(SHELL_FILTER_HOME_ENV_VAR) {
        if !val.is_empty() {
            return Ok(PathBuf::from(val));
        }
    }

    home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })
}

fn resolve_relative_to(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(not(windows))]
fn default_shell() -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string()]
}

#[cfg(windows)]
fn default_shell() -> Vec<String> {
    vec!["cmd".to_string(), "/C".to_string()]
}
