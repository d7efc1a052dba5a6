use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::scan::matcher::MatcherKind;

/// Configuration for a scan.
///
/// Loaded from YAML with later sources taking precedence:
/// 1. Global `$CONFIG_DIR/sigscan/config.yaml`
/// 2. Local `.sigscan.yaml` in the current directory
/// 3. Explicit path passed by the caller
///
/// CLI arguments override file values via `merge_with_cli`.
///
/// ```yaml
/// root_path: "./samples"
/// patterns_path: "patterns.db"
/// algorithm: "rabin-karp"
/// thread_count: 4
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory whose files are classified (non-recursive)
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Path to the pattern database file
    #[serde(default)]
    pub patterns_path: PathBuf,

    /// Which substring algorithm to use
    #[serde(default)]
    pub algorithm: MatcherKind,

    /// Size of the worker pool; a bound, not the file count.
    /// Defaults to the number of CPU cores.
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            patterns_path: PathBuf::new(),
            algorithm: MatcherKind::default(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally merging a specific file on top
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("sigscan/config.yaml")),
            Some(PathBuf::from(".sigscan.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values; CLI wins
    pub fn merge_with_cli(mut self, cli_config: ScanConfig) -> Self {
        if cli_config.root_path != default_root_path() {
            self.root_path = cli_config.root_path;
        }
        if cli_config.patterns_path != PathBuf::new() {
            self.patterns_path = cli_config.patterns_path;
        }
        if cli_config.algorithm != MatcherKind::default() {
            self.algorithm = cli_config.algorithm;
        }
        self.thread_count = cli_config.thread_count;
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }
}
