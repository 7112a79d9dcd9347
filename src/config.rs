//! Tool configuration.
//!
//! Handles loading, validating, and merging `iconsmith.toml`. Stock defaults
//! are the product table the icons have always been exported to; a user file
//! overrides only the keys it names.
//!
//! ## Config File Location
//!
//! `iconsmith.toml` in the working directory is picked up automatically.
//! `--config <FILE>` points at any other file (which must then exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_root = "."          # Relative target paths resolve against this
//!
//! [render]
//! # working_size = 1024      # Override every edition's canvas size
//!
//! [processing]
//! # max_processes = 4        # Max parallel workers (omit for auto = CPU cores)
//!
//! [[targets]]
//! path = "chrome-extension/public/icons/icon16.png"
//! size = 16
//! # ... one [[targets]] entry per exported file
//! ```
//!
//! ## Partial Configuration
//!
//! Tables merge key by key. Arrays replace: a file that declares any
//! `[[targets]]` replaces the whole stock manifest.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "iconsmith.toml";

/// Largest canvas or target edge accepted from configuration.
const MAX_EDGE: u32 = 8192;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `iconsmith.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconConfig {
    /// Directory that relative target paths resolve against.
    pub output_root: String,
    pub render: RenderConfig,
    pub processing: ProcessingConfig,
    /// Export manifest: every file written for each rendered edition.
    pub targets: Vec<TargetConfig>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            output_root: ".".to_string(),
            render: RenderConfig::default(),
            processing: ProcessingConfig::default(),
            targets: stock_targets(),
        }
    }
}

impl IconConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(size) = self.render.working_size {
            if size == 0 || size > MAX_EDGE {
                return Err(ConfigError::Validation(format!(
                    "render.working_size must be 1-{MAX_EDGE}"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        for target in &self.targets {
            if target.path.trim().is_empty() {
                return Err(ConfigError::Validation("targets.path must not be empty".into()));
            }
            if target.size == 0 || target.size > MAX_EDGE {
                return Err(ConfigError::Validation(format!(
                    "targets.size for '{}' must be 1-{MAX_EDGE}",
                    target.path
                )));
            }
        }
        Ok(())
    }
}

/// Rendering overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Canvas size for every edition. `None` keeps each edition's own size.
    pub working_size: Option<u32>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel export workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// One exported file: a path (relative to `output_root` or absolute) and a
/// square pixel size. The extension picks the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub path: String,
    pub size: u32,
}

fn target(path: &str, size: u32) -> TargetConfig {
    TargetConfig {
        path: path.to_string(),
        size,
    }
}

/// The product table: extension, editor, desktop, web and repository icons.
fn stock_targets() -> Vec<TargetConfig> {
    vec![
        target("chrome-extension/public/icons/icon16.png", 16),
        target("chrome-extension/public/icons/icon48.png", 48),
        target("chrome-extension/public/icons/icon128.png", 128),
        target("vscode-extension/images/icon.png", 128),
        target("desktop/resources/icon.png", 512),
        target("web/public/logo.png", 512),
        target("web/public/favicon-16x16.png", 16),
        target("web/public/favicon-32x32.png", 32),
        target("web/public/apple-touch-icon.png", 180),
        target("web/public/favicon.ico", 32),
        target("logo.png", 512),
    ]
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(IconConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<IconConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IconConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// With `explicit` set, that file must exist. Otherwise `iconsmith.toml` in
/// `dir` is used when present, and stock defaults when not.
pub fn load_config(dir: &Path, explicit: Option<&Path>) -> Result<IconConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                Some(load_raw_config(&path)?)
            } else {
                None
            }
        }
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `iconsmith.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# iconsmith configuration
# =======================
# All keys are optional. Unknown keys are rejected.

# Directory that relative target paths resolve against.
# `render --root` and `propagate --root` override it per run.
output_root = "."

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Canvas size every edition renders at before export.
# Omit to keep each edition's own size (1024, or 512 for color variants).
# working_size = 1024

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel export workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Export targets
# ---------------------------------------------------------------------------
# Every rendered edition is resized to each target and written to its path.
# The extension picks the encoder: .png, .ico, .jpg, .webp.
# An .ico that cannot be encoded is written as a .png beside it.
# Declaring any [[targets]] replaces this whole list.

# Browser extension
[[targets]]
path = "chrome-extension/public/icons/icon16.png"
size = 16

[[targets]]
path = "chrome-extension/public/icons/icon48.png"
size = 48

[[targets]]
path = "chrome-extension/public/icons/icon128.png"
size = 128

# Editor extension
[[targets]]
path = "vscode-extension/images/icon.png"
size = 128

# Desktop app
[[targets]]
path = "desktop/resources/icon.png"
size = 512

# Web
[[targets]]
path = "web/public/logo.png"
size = 512

[[targets]]
path = "web/public/favicon-16x16.png"
size = 16

[[targets]]
path = "web/public/favicon-32x32.png"
size = 32

[[targets]]
path = "web/public/apple-touch-icon.png"
size = 180

[[targets]]
path = "web/public/favicon.ico"
size = 32

# Repository README
[[targets]]
path = "logo.png"
size = 512
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_product_table() {
        let config = IconConfig::default();
        assert_eq!(config.output_root, ".");
        assert_eq!(config.targets.len(), 11);
        assert_eq!(config.targets[9].path, "web/public/favicon.ico");
        assert_eq!(config.targets[9].size, 32);
        assert_eq!(config.render.working_size, None);
    }

    #[test]
    fn default_config_is_valid() {
        IconConfig::default().validate().unwrap();
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: IconConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, IconConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
output_root = "../product"

[render]
working_size = 256
"#;
        let config: IconConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.output_root, "../product");
        assert_eq!(config.render.working_size, Some(256));
        // Targets untouched
        assert_eq!(config.targets, IconConfig::default().targets);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<IconConfig, _> = toml::from_str("[render]\nworking_sise = 12\n");
        assert!(result.is_err());
        let result: Result<IconConfig, _> = toml::from_str("[[targets]]\npath = \"a.png\"\nsize = 1\nformat = \"png\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config, IconConfig::default());
    }

    #[test]
    fn load_config_reads_file_from_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[processing]
max_processes = 2
"#,
        )
        .unwrap();

        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.processing.max_processes, Some(2));
        assert_eq!(config.targets.len(), 11);
    }

    #[test]
    fn explicit_targets_replace_the_stock_list() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[[targets]]
path = "icon.png"
size = 64

[[targets]]
path = "favicon.ico"
size = 32
"#,
        )
        .unwrap();

        let config = load_config(tmp.path(), Some(&path)).unwrap();
        assert_eq!(
            config.targets,
            vec![target("icon.png", 64), target("favicon.ico", 32)]
        );
        assert_eq!(config.output_root, ".");
    }

    #[test]
    fn explicit_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(tmp.path(), Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path(), None);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn zero_target_size_is_invalid() {
        let mut config = IconConfig::default();
        config.targets.push(target("broken.png", 0));
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_target_path_is_invalid() {
        let mut config = IconConfig::default();
        config.targets.push(target("  ", 16));
        assert!(config.validate().is_err());
    }

    #[test]
    fn working_size_out_of_range_is_invalid() {
        let mut config = IconConfig::default();
        config.render.working_size = Some(0);
        assert!(config.validate().is_err());
        config.render.working_size = Some(MAX_EDGE + 1);
        assert!(config.validate().is_err());
        config.render.working_size = Some(64);
        config.validate().unwrap();
    }

    #[test]
    fn zero_max_processes_is_invalid() {
        let config = IconConfig {
            processing: ProcessingConfig {
                max_processes: Some(0),
            },
            ..IconConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_validates_after_merge() {
        let overlay: toml::Value = toml::from_str("[render]\nworking_size = 0\n").unwrap();
        let result = resolve_config(stock_defaults_value().unwrap(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[render]
working_size = 1024
other = 1
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[render]\nworking_size = 64\n").unwrap();
        let merged = merge_toml(base, overlay);
        let render = merged.get("render").unwrap();
        assert_eq!(render.get("working_size").unwrap().as_integer(), Some(64));
        assert_eq!(render.get("other").unwrap().as_integer(), Some(1));
    }

    #[test]
    fn merge_toml_array_replaces() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value =
            toml::from_str("[[targets]]\npath = \"x.png\"\nsize = 8\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("targets").unwrap().as_array().unwrap().len(), 1);
        assert_eq!(merged.get("output_root").unwrap().as_str(), Some("."));
    }
}
