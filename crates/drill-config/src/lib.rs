//! Configuration management for drill.
//!
//! Parses `drill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [build]
//! root = "build"
//!
//! [toolchain]
//! program = "go"
//! run_args = ["run"]
//! elide_prefix = "${GOROOT:-/usr/local/go}/bin/"
//!
//! [markers]
//! entry_hook = "func init("
//! entry_point = "func main("
//! package_from = "package drill"
//! package_to = "package main"
//! strict = false
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `toolchain.program`,
//! `toolchain.run_args` and `toolchain.elide_prefix`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override build root directory.
    pub build_root: Option<PathBuf>,
    /// Override toolchain program.
    pub program: Option<String>,
    /// Override strict marker checking.
    pub strict_markers: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "drill.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Toolchain used to run drills.
    pub toolchain: ToolchainConfig,
    /// Snippet markers rewritten before running.
    pub markers: MarkersConfig,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    root: Option<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Directory holding one working directory per drill.
    pub root: PathBuf,
}

/// External "run one source file" command.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Program to execute.
    pub program: String,
    /// Arguments before the staged file name.
    pub run_args: Vec<String>,
    /// Prefix removed from displayed invocation lines.
    pub elide_prefix: Option<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "go".to_owned(),
            run_args: vec!["run".to_owned()],
            elide_prefix: None,
        }
    }
}

/// Marker strings of drill snippets.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkersConfig {
    /// Initialization hook renamed to the entry point.
    pub entry_hook: String,
    /// Entry point signature.
    pub entry_point: String,
    /// Package designation of drills.
    pub package_from: String,
    /// Executable package designation.
    pub package_to: String,
    /// Fail instead of warn when a drill lacks a marker.
    pub strict: bool,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            entry_hook: "func init(".to_owned(),
            entry_point: "func main(".to_owned(),
            package_from: "package drill".to_owned(),
            package_to: "package main".to_owned(),
            strict: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`toolchain.program`").
        field: String,
        /// Error message (e.g., "${`GOROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `drill.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.build_root {
            self.build_resolved.root.clone_from(root);
        }
        if let Some(program) = &settings.program {
            self.toolchain.program.clone_from(program);
        }
        if let Some(strict) = settings.strict_markers {
            self.markers.strict = strict;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the toolchain program or a
    /// marker to search for is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.toolchain.program, "toolchain.program")?;
        require_non_empty(&self.markers.entry_hook, "markers.entry_hook")?;
        require_non_empty(&self.markers.package_from, "markers.package_from")?;
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            build: BuildConfigRaw::default(),
            toolchain: ToolchainConfig::default(),
            markers: MarkersConfig::default(),
            build_resolved: BuildConfig {
                root: base.join("build"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Expand environment variable references in toolchain strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let toolchain = &mut self.toolchain;
        toolchain.program = expand::expand_env(&toolchain.program, "toolchain.program")?;
        for arg in &mut toolchain.run_args {
            *arg = expand::expand_env(arg, "toolchain.run_args")?;
        }
        if let Some(ref prefix) = toolchain.elide_prefix {
            toolchain.elide_prefix = Some(expand::expand_env(prefix, "toolchain.elide_prefix")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.build_resolved = BuildConfig {
            root: config_dir.join(self.build.root.as_deref().unwrap_or("build")),
        };
    }
}
