//! Configuration system for the lists CLI.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (LISTS_*)
//! 3. Store manifest (.lists-config/manifest.yaml)
//! 4. User global (~/.config/lists/config.yaml)
//! 5. Built-in defaults (lowest priority)

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration for the lists CLI.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Display settings
    pub display: DisplayConfig,
    /// Due-date view settings
    pub due: DueConfig,
    /// Behavior settings
    pub behavior: BehaviorConfig,
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DisplayConfig {
    /// strftime format for created/updated timestamps in pretty output
    pub date_format: String,
    /// Show checklist item keys in `show` and `item list`
    pub show_keys: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M".to_string(),
            show_keys: true,
        }
    }
}

/// Due-date view settings.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DueConfig {
    /// Only show upcoming lists due within this many days (null = all)
    pub upcoming_days: Option<u32>,
}

/// Behavior defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress hints
    pub quiet: bool,
}

// ============================================================================
// Config Source Tracking
// ============================================================================

/// Source of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default
    Default,
    /// User global config (~/.config/lists/config.yaml)
    UserGlobal,
    /// Store manifest (.lists-config/manifest.yaml)
    StoreManifest(String),
    /// Environment variable
    EnvVar(String),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::UserGlobal => write!(f, "~/.config/lists/config.yaml"),
            ConfigSource::StoreManifest(path) => write!(f, "{}", path),
            ConfigSource::EnvVar(name) => write!(f, "${}", name),
        }
    }
}

// ============================================================================
// Environment Variable Registry
// ============================================================================

/// Environment variable definition for documentation.
pub struct EnvVar {
    /// Variable name (e.g., "LISTS_FORMAT")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Default value or behavior
    pub default: &'static str,
    /// Config path this maps to (e.g., "due.upcoming_days")
    pub config_path: &'static str,
    /// Valid values (if enumerable)
    pub values: Option<&'static str>,
}

/// Registry of all supported environment variables.
pub const ENV_VARS: &[EnvVar] = &[
    EnvVar {
        name: "NO_COLOR",
        description: "Disable colored output (standard)",
        default: "unset",
        config_path: "-",
        values: Some("any non-empty value"),
    },
    EnvVar {
        name: "LISTS_FORMAT",
        description: "Default output format",
        default: "pretty (auto-detects TTY)",
        config_path: "-",
        values: Some("pretty, plain, json, yaml"),
    },
    EnvVar {
        name: "LISTS_ROOT",
        description: "Use this directory as the store root instead of searching upwards",
        default: "auto-detected",
        config_path: "-",
        values: Some("path"),
    },
    EnvVar {
        name: "LISTS_UPCOMING_DAYS",
        description: "Limit the Upcoming section of `lists due` to this many days",
        default: "unset (all)",
        config_path: "due.upcoming_days",
        values: Some("number"),
    },
    EnvVar {
        name: "LISTS_QUIET",
        description: "Suppress hint messages",
        default: "false",
        config_path: "behavior.quiet",
        values: Some("1, true, yes"),
    },
    EnvVar {
        name: "RUST_LOG",
        description: "Diagnostic log filter (written to stderr)",
        default: "warn",
        config_path: "-",
        values: Some("error, warn, info, debug, trace"),
    },
];

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Parse a boolean environment variable.
///
/// Returns `Some(true)` if the variable is set to a truthy value (1, true, yes),
/// `Some(false)` if set to a falsy value (0, false, no),
/// and `None` if unset or empty.
pub fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| {
        if v.is_empty() {
            return None;
        }
        let lower = v.to_lowercase();
        match lower.as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    })
}

/// Returns `Some(value)` if set and non-empty, `None` otherwise.
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Returns `Some(value)` if set and parseable, `None` otherwise.
pub fn env_u32(name: &str) -> Option<u32> {
    env_string(name).and_then(|v| v.trim().parse().ok())
}

/// Check if a string environment variable is set and non-empty.
pub fn env_is_set(name: &str) -> bool {
    std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}

// ============================================================================
// Config Loading
// ============================================================================

/// Manifest file name within .lists-config/
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Config directory name
pub const CONFIG_DIR: &str = ".lists-config";

/// Result of loading configuration with source tracking.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The merged configuration
    pub config: Config,
    /// Sources that contributed to this config (in order of application)
    pub sources: Vec<ConfigSource>,
}

/// Load configuration from defaults, the user global file and the store
/// manifest under `root` (if any).
///
/// Env vars are not applied here; they are checked at point of use.
pub fn load_config(root: Option<&Path>) -> LoadedConfig {
    let mut config = Config::default();
    let mut sources = vec![ConfigSource::Default];

    if let Some(user_config_path) = user_config_path() {
        if let Some(user_config) = load_manifest(&user_config_path) {
            merge(&mut config, &user_config);
            sources.push(ConfigSource::UserGlobal);
        }
    }

    if let Some(root) = root {
        let path = manifest_path(root);
        if let Some(manifest_config) = load_manifest(&path) {
            merge(&mut config, &manifest_config);
            sources.push(ConfigSource::StoreManifest(format!(
                "{}/{}",
                CONFIG_DIR, MANIFEST_FILE
            )));
        }
    }

    LoadedConfig { config, sources }
}

/// Get the user config file path (~/.config/lists/config.yaml).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lists").join("config.yaml"))
}

/// Manifest path for a store root.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(MANIFEST_FILE)
}

/// Load a manifest file. Missing files are silent, unparsable ones warn.
pub fn load_manifest(path: &Path) -> Option<Config> {
    let content = fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge overlay config into base config.
///
/// Non-default values in overlay override values in base.
pub fn merge(base: &mut Config, overlay: &Config) {
    let default_display = DisplayConfig::default();
    if overlay.display.date_format != default_display.date_format {
        base.display.date_format = overlay.display.date_format.clone();
    }
    if overlay.display.show_keys != default_display.show_keys {
        base.display.show_keys = overlay.display.show_keys;
    }

    if overlay.due.upcoming_days.is_some() {
        base.due.upcoming_days = overlay.due.upcoming_days;
    }

    if overlay.behavior.quiet != BehaviorConfig::default().quiet {
        base.behavior.quiet = overlay.behavior.quiet;
    }
}

/// Generate JSON schema for the config.
pub fn json_schema() -> String {
    let schema = schemars::schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// Check if quiet mode is enabled (suppress hints).
///
/// Checks both config.behavior.quiet and LISTS_QUIET env var.
pub fn is_quiet(config: &Config) -> bool {
    env_bool("LISTS_QUIET").unwrap_or(config.behavior.quiet)
}

/// Effective horizon for the Upcoming bucket: LISTS_UPCOMING_DAYS, then config.
pub fn upcoming_days(config: &Config) -> Option<u32> {
    env_u32("LISTS_UPCOMING_DAYS").or(config.due.upcoming_days)
}

/// Generate a template manifest with comments.
pub fn template_manifest() -> String {
    r#"# lists configuration manifest
# Place in .lists-config/manifest.yaml (or ~/.config/lists/config.yaml)

# Display settings
# display:
#   date_format: "%Y-%m-%d %H:%M"   # created/updated timestamps
#   show_keys: true                 # checklist item keys in `lists show`

# Due-date view
# due:
#   upcoming_days: null   # null = show all upcoming, number = horizon in days

# Behavior settings
# behavior:
#   quiet: false
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
