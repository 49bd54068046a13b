//! Configuration loading for volley-stats.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.volley/config.toml`)
//! 3. User config (`~/.volley/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::core::{MAX_SETS, MIN_SETS};
use crate::error::{FailOpen, Result, VolleyError};
use crate::util::{read_capped, MAX_READ_BYTES};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Defaults applied at match setup.
    #[serde(rename = "match")]
    pub match_defaults: MatchConfig,
    /// Export settings.
    pub export: ExportConfig,
}

/// Defaults applied at match setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of sets pre-filled in the setup form.
    pub default_sets: u8,
    /// Team name used when none is entered.
    pub default_team: String,
    /// `strftime` format for the default match date.
    pub date_format: String,
}

impl MatchConfig {
    /// Check if a set count is within the allowed range.
    pub fn is_valid_sets(value: u8) -> bool {
        (MIN_SETS..=MAX_SETS).contains(&value)
    }

    /// Check that a `strftime` format is non-blank and only uses known specifiers.
    pub fn is_valid_date_format(format: &str) -> bool {
        !format.trim().is_empty()
            && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            default_sets: 3,
            default_team: "Mon équipe".to_string(),
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

/// Valid values for the export formats list.
pub const VALID_FORMATS: &[&str] = &["xlsx", "pdf"];

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to.
    pub output_dir: PathBuf,
    /// Formats produced by `export all`.
    pub formats: Vec<String>,
}

impl ExportConfig {
    /// Check if every entry of a formats list is known.
    pub fn is_valid_formats(formats: &[String]) -> bool {
        !formats.is_empty() && formats.iter().all(|f| VALID_FORMATS.contains(&f.as_str()))
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            formats: vec!["xlsx".to_string(), "pdf".to_string()],
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        // Layer 4 → 3: Apply user config
        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        // Layer 3 → 2: Apply project config
        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        // Layer 2 → 1: Apply environment variables
        config.apply_env_overrides();

        config
    }

    /// Load user config from `<volley_home>/config.toml`.
    fn load_user_config() -> Option<Config> {
        let path = volley_home()?.join("config.toml");
        Self::load_optional(&path)
    }

    /// Load project config from `.volley/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let path = cwd.join(".volley").join("config.toml");
        Self::load_optional(&path)
    }

    /// Load a config file if present; a broken file is reported and skipped.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_default(&format!("loading {}", path.display()))
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = read_capped(path, MAX_READ_BYTES)?;
        toml::from_str(&content).map_err(|e| VolleyError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // VOLLEY_DEFAULT_SETS
        if let Ok(val) = env::var("VOLLEY_DEFAULT_SETS") {
            match val.parse::<u8>() {
                Ok(n) if MatchConfig::is_valid_sets(n) => self.match_defaults.default_sets = n,
                _ => eprintln!(
                    "Warning: Invalid VOLLEY_DEFAULT_SETS value '{}'. \
                    Must be between {} and {}. Using '{}'.",
                    val, MIN_SETS, MAX_SETS, self.match_defaults.default_sets
                ),
            }
        }

        // VOLLEY_DEFAULT_TEAM
        if let Ok(val) = env::var("VOLLEY_DEFAULT_TEAM") {
            if val.trim().is_empty() {
                eprintln!(
                    "Warning: Empty VOLLEY_DEFAULT_TEAM. Using '{}'.",
                    self.match_defaults.default_team
                );
            } else {
                self.match_defaults.default_team = val;
            }
        }

        // VOLLEY_DATE_FORMAT
        if let Ok(val) = env::var("VOLLEY_DATE_FORMAT") {
            if MatchConfig::is_valid_date_format(&val) {
                self.match_defaults.date_format = val;
            } else {
                eprintln!(
                    "Warning: Invalid VOLLEY_DATE_FORMAT value '{}'. Using '{}'.",
                    val, self.match_defaults.date_format
                );
            }
        }

        // VOLLEY_EXPORT_DIR
        if let Ok(val) = env::var("VOLLEY_EXPORT_DIR") {
            if !val.is_empty() {
                self.export.output_dir = PathBuf::from(val);
            }
        }

        // VOLLEY_EXPORT_FORMATS (comma separated)
        if let Ok(val) = env::var("VOLLEY_EXPORT_FORMATS") {
            let formats: Vec<String> = val
                .split(',')
                .map(|f| f.trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect();
            if ExportConfig::is_valid_formats(&formats) {
                self.export.formats = formats;
            } else {
                eprintln!(
                    "Warning: Invalid VOLLEY_EXPORT_FORMATS value '{}'. \
                    Valid values: {:?}. Using {:?}.",
                    val, VALID_FORMATS, self.export.formats
                );
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence field by field: every value in
    /// `other` that differs from the default replaces ours. A layer cannot
    /// set a value back to its default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_match = MatchConfig::default();
        if other.match_defaults.default_sets != default_match.default_sets {
            if MatchConfig::is_valid_sets(other.match_defaults.default_sets) {
                self.match_defaults.default_sets = other.match_defaults.default_sets;
            } else {
                tracing::warn!(
                    value = other.match_defaults.default_sets,
                    "ignoring out-of-range match.default_sets"
                );
            }
        }
        if other.match_defaults.default_team != default_match.default_team {
            if other.match_defaults.default_team.trim().is_empty() {
                tracing::warn!("ignoring blank match.default_team");
            } else {
                self.match_defaults.default_team = other.match_defaults.default_team;
            }
        }
        if other.match_defaults.date_format != default_match.date_format {
            if MatchConfig::is_valid_date_format(&other.match_defaults.date_format) {
                self.match_defaults.date_format = other.match_defaults.date_format;
            } else {
                tracing::warn!(
                    value = %other.match_defaults.date_format,
                    "ignoring invalid match.date_format"
                );
            }
        }

        let default_export = ExportConfig::default();
        if other.export.output_dir != default_export.output_dir {
            self.export.output_dir = other.export.output_dir;
        }
        if other.export.formats != default_export.formats {
            if ExportConfig::is_valid_formats(&other.export.formats) {
                self.export.formats = other.export.formats;
            } else {
                tracing::warn!(formats = ?other.export.formats, "ignoring invalid export.formats");
            }
        }

        self
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VolleyError::config(e.to_string()))
    }
}

/// Get the volley-stats home directory.
///
/// Checks `VOLLEY_HOME` first, then falls back to `~/.volley`.
pub fn volley_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("VOLLEY_HOME") {
        if home.is_empty() {
            tracing::warn!("VOLLEY_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("VOLLEY_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".volley"))
}

/// Path of the crash log written by the panic hook.
pub fn crash_log_path() -> Option<PathBuf> {
    volley_home().map(|h| h.join("crash.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "VOLLEY_DEFAULT_SETS",
            "VOLLEY_DEFAULT_TEAM",
            "VOLLEY_DATE_FORMAT",
            "VOLLEY_EXPORT_DIR",
            "VOLLEY_EXPORT_FORMATS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.match_defaults.default_sets, 3);
        assert_eq!(config.match_defaults.default_team, "Mon équipe");
        assert_eq!(config.match_defaults.date_format, "%d/%m/%Y");
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert_eq!(config.export.formats, vec!["xlsx", "pdf"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        let toml_content = r#"
[match]
default_sets = 5
default_team = "Les Aigles"

[export]
formats = ["pdf"]
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.match_defaults.default_sets, 5);
        assert_eq!(config.match_defaults.default_team, "Les Aigles");
        assert_eq!(config.export.formats, vec!["pdf"]);
        // Other fields should be defaults
        assert_eq!(config.match_defaults.date_format, "%d/%m/%Y");
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();
        assert!(Config::load_from_file(&config_path).is_err());
        // Fail-open loader skips it
        assert!(Config::load_optional(&config_path).is_none());
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let volley_dir = dir.path().join(".volley");
        fs::create_dir_all(&volley_dir).unwrap();
        fs::write(
            volley_dir.join("config.toml"),
            "[match]\ndefault_sets = 5\n",
        )
        .unwrap();

        env::set_var("VOLLEY_HOME", dir.path().join("home"));
        let config = Config::load_from_cwd(dir.path());
        env::remove_var("VOLLEY_HOME");

        assert_eq!(config.match_defaults.default_sets, 5);
        assert_eq!(config.match_defaults.default_team, "Mon équipe");
    }

    #[test]
    #[serial]
    fn test_user_then_project_layering() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        fs::create_dir_all(&home).unwrap();
        fs::write(
            home.join("config.toml"),
            "[match]\ndefault_team = \"Les Aigles\"\ndefault_sets = 4\n",
        )
        .unwrap();
        let project = dir.path().join("project");
        fs::create_dir_all(project.join(".volley")).unwrap();
        fs::write(
            project.join(".volley").join("config.toml"),
            "[match]\ndefault_sets = 5\n",
        )
        .unwrap();

        env::set_var("VOLLEY_HOME", &home);
        let config = Config::load_from_cwd(&project);
        env::remove_var("VOLLEY_HOME");

        assert_eq!(config.match_defaults.default_team, "Les Aigles");
        assert_eq!(config.match_defaults.default_sets, 5);
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let volley_dir = dir.path().join(".volley");
        fs::create_dir_all(&volley_dir).unwrap();
        fs::write(
            volley_dir.join("config.toml"),
            "[match]\ndefault_sets = 5\n",
        )
        .unwrap();

        env::set_var("VOLLEY_HOME", dir.path().join("home"));
        env::set_var("VOLLEY_DEFAULT_SETS", "2");
        let config = Config::load_from_cwd(dir.path());
        env::remove_var("VOLLEY_DEFAULT_SETS");
        env::remove_var("VOLLEY_HOME");

        assert_eq!(config.match_defaults.default_sets, 2);
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        env::set_var("VOLLEY_DEFAULT_TEAM", "Les Aigles");
        env::set_var("VOLLEY_DATE_FORMAT", "%Y-%m-%d");
        env::set_var("VOLLEY_EXPORT_DIR", "/tmp/exports");
        env::set_var("VOLLEY_EXPORT_FORMATS", "PDF");

        let mut config = Config::default();
        config.apply_env_overrides();
        clear_env();

        assert_eq!(config.match_defaults.default_team, "Les Aigles");
        assert_eq!(config.match_defaults.date_format, "%Y-%m-%d");
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.export.formats, vec!["pdf"]);
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_keep_previous() {
        clear_env();
        env::set_var("VOLLEY_DEFAULT_SETS", "12");
        env::set_var("VOLLEY_EXPORT_FORMATS", "docx");

        let mut config = Config::default();
        config.apply_env_overrides();
        clear_env();

        assert_eq!(config.match_defaults.default_sets, 3);
        assert_eq!(config.export.formats, vec!["xlsx", "pdf"]);
    }

    #[test]
    #[serial]
    fn test_env_date_format_with_unknown_specifier_is_ignored() {
        clear_env();
        env::set_var("VOLLEY_DATE_FORMAT", "%Q");

        let mut config = Config::default();
        config.match_defaults.date_format = "%Y-%m-%d".to_string();
        config.apply_env_overrides();
        clear_env();

        assert_eq!(config.match_defaults.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_merge_ignores_invalid_values() {
        let mut other = Config::default();
        other.match_defaults.default_sets = 0;
        other.export.formats = vec!["csv".to_string()];

        let merged = Config::default().merge(other);
        assert_eq!(merged.match_defaults.default_sets, 3);
        assert_eq!(merged.export.formats, vec!["xlsx", "pdf"]);
    }

    #[test]
    fn test_merge_ignores_blank_team_and_bad_date_format() {
        let mut base = Config::default();
        base.match_defaults.default_team = "Les Aigles".to_string();

        let mut other = Config::default();
        other.match_defaults.default_team = "   ".to_string();
        other.match_defaults.date_format = "%d %Q".to_string();

        let merged = base.merge(other);
        assert_eq!(merged.match_defaults.default_team, "Les Aigles");
        assert_eq!(merged.match_defaults.date_format, "%d/%m/%Y");
    }

    #[test]
    fn test_project_file_with_bad_date_format_keeps_default() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".volley");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.toml"),
            "[match]\ndate_format = \"%Q\"\ndefault_team = \"\"\n",
        )
        .unwrap();

        let loaded = Config::load_project_config(temp.path()).unwrap();
        let merged = Config::default().merge(loaded);
        assert_eq!(merged.match_defaults.date_format, "%d/%m/%Y");
        assert_eq!(merged.match_defaults.default_team, "Mon équipe");
    }

    #[test]
    fn test_is_valid_date_format() {
        assert!(MatchConfig::is_valid_date_format("%d/%m/%Y"));
        assert!(MatchConfig::is_valid_date_format("%Y-%m-%d"));
        assert!(!MatchConfig::is_valid_date_format("%Q"));
        assert!(!MatchConfig::is_valid_date_format("  "));
    }

    #[test]
    fn test_to_toml_round_trip() {
        let mut config = Config::default();
        config.match_defaults.default_sets = 5;
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[match]"));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    #[serial]
    fn test_volley_home_env() {
        env::set_var("VOLLEY_HOME", "/tmp/volley-home");
        assert_eq!(volley_home(), Some(PathBuf::from("/tmp/volley-home")));
        assert_eq!(
            crash_log_path(),
            Some(PathBuf::from("/tmp/volley-home/crash.log"))
        );
        env::remove_var("VOLLEY_HOME");
    }
}
