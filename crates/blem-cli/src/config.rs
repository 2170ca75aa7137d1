//! Configuration file support for blem.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/blem/config.toml` (lowest priority)
//! - Project-local: `.blem.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// File name of the project-local config.
const PROJECT_CONFIG: &str = ".blem.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Model selection.
    pub model: ModelConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Weights file to load, bypassing the store.
    pub path: Option<PathBuf>,
    /// Custom models directory.
    pub dir: Option<PathBuf>,
    /// Model name within the models directory.
    pub name: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Only write results whose expression changed.
    pub changes_only: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/blem/config.toml`
    /// 2. Project-local: `.blem.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
            config.discard_invalid();
        }

        config
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        if let Some(ref name) = self.model.name {
            if !is_plain_name(name) {
                return Err(format!(
                    "model.name must be a plain file stem, got '{name}'"
                ));
            }
        }

        Ok(())
    }

    /// Drops values that failed validation so defaults apply instead.
    fn discard_invalid(&mut self) {
        if self
            .output
            .format
            .as_deref()
            .is_some_and(|f| f != "json" && f != "jsonl")
        {
            self.output.format = None;
        }
        if self.model.name.as_deref().is_some_and(|n| !is_plain_name(n)) {
            self.model.name = None;
        }
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.model.path = other.model.path.or_else(|| self.model.path.take());
        self.model.dir = other.model.dir.or_else(|| self.model.dir.take());
        self.model.name = other.model.name.or_else(|| self.model.name.take());

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.changes_only = other.output.changes_only.or(self.output.changes_only);
    }
}

/// A model name must stay inside the models directory.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != ".."
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("blem").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.blem.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_CONFIG);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.general.recursive.is_none());
        assert!(config.model.path.is_none());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("").expect("parse empty config");
        assert!(config.model.name.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[general]
recursive = true

[model]
path = '/tmp/weights.safetensors'
dir = '/opt/blem/models'
name = 'webcam'

[output]
format = 'json'
pretty = true
progress = false
changes_only = true
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");

        assert_eq!(config.general.recursive, Some(true));
        assert_eq!(
            config.model.path,
            Some(PathBuf::from("/tmp/weights.safetensors"))
        );
        assert_eq!(config.model.dir, Some(PathBuf::from("/opt/blem/models")));
        assert_eq!(config.model.name.as_deref(), Some("webcam"));
        assert_eq!(config.output.format, Some("json".to_string()));
        assert_eq!(config.output.pretty, Some(true));
        assert_eq!(config.output.progress, Some(false));
        assert_eq!(config.output.changes_only, Some(true));
    }

    #[test]
    fn test_merge_configs() {
        let mut base: AppConfig = toml::from_str(
            r"
[model]
name = 'base'
dir = '/base'

[output]
pretty = true
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[model]
name = 'project'

[general]
recursive = true
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.model.name.as_deref(), Some("project"));
        assert_eq!(base.model.dir, Some(PathBuf::from("/base")));
        assert_eq!(base.output.pretty, Some(true));
        assert_eq!(base.general.recursive, Some(true));
    }

    #[test]
    fn test_merge_empty_override_preserves_base() {
        let mut base: AppConfig = toml::from_str(
            r"
[output]
format = 'json'
changes_only = true
",
        )
        .expect("parse base");

        base.merge(AppConfig::default());

        assert_eq!(base.output.format, Some("json".to_string()));
        assert_eq!(base.output.changes_only, Some(true));
    }

    #[test]
    fn test_merge_false_overrides_true() {
        let mut base: AppConfig = toml::from_str("[general]\nrecursive = true\n").unwrap();
        let project: AppConfig = toml::from_str("[general]\nrecursive = false\n").unwrap();

        base.merge(project);

        assert_eq!(base.general.recursive, Some(false));
    }

    #[test]
    fn test_invalid_toml_syntax_handled() {
        let toml = r"
[output
format = 'json'
";
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "invalid TOML should return error");
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[output]
pretty = "yes"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_unknown_field_ignored() {
        let toml = r"
[output]
format = 'jsonl'
colour = 'always'
";
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.output.format, Some("jsonl".to_string()));
    }

    #[test]
    fn test_validate_output_format_invalid() {
        let mut config = AppConfig::default();
        config.output.format = Some("xml".to_string());

        let result = config.validate();
        assert!(result.unwrap_err().contains("output.format"));
    }

    #[test]
    fn test_validate_model_name_with_separator() {
        let mut config = AppConfig::default();
        config.model.name = Some("../elsewhere".to_string());

        let result = config.validate();
        assert!(result.unwrap_err().contains("model.name"));
    }

    #[test]
    fn test_discard_invalid_clears_escaping_model_name() {
        let mut config: AppConfig = toml::from_str(
            r"
[model]
name = '../elsewhere'
dir = '/srv/models'

[output]
format = 'xml'
pretty = true
",
        )
        .unwrap();

        assert!(config.validate().is_err());
        config.discard_invalid();

        assert!(config.model.name.is_none());
        assert!(config.output.format.is_none());
        assert_eq!(config.model.dir, Some(PathBuf::from("/srv/models")));
        assert_eq!(config.output.pretty, Some(true));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_discard_invalid_keeps_plain_name() {
        let mut config = AppConfig::default();
        config.model.name = Some("webcam".to_string());
        config.discard_invalid();
        assert_eq!(config.model.name.as_deref(), Some("webcam"));
    }

    #[test]
    fn test_validate_valid_config_passes() {
        let config: AppConfig = toml::from_str(
            r"
[model]
name = 'blem'

[output]
format = 'json'
",
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_find_config_in_parents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join(PROJECT_CONFIG), "").unwrap();

        let found = find_config_in_parents(&nested).unwrap();
        assert_eq!(found, temp_dir.path().join(PROJECT_CONFIG));
    }

    #[test]
    fn test_load_file_rejects_garbage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(PROJECT_CONFIG);
        std::fs::write(&path, "[[[").unwrap();

        assert!(load_file(&path).is_none());
    }
}
