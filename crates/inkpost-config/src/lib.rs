use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

fn default_placeholder() -> Option<String> {
    Some("Start writing...".to_string())
}

fn default_font_families() -> Vec<String> {
    [
        "Arial",
        "Georgia",
        "Helvetica",
        "Times New Roman",
        "Courier New",
        "Verdana",
    ]
    .map(String::from)
    .to_vec()
}

fn default_font_sizes() -> Vec<String> {
    ["12px", "14px", "16px", "18px", "24px", "32px"]
        .map(String::from)
        .to_vec()
}

fn default_history_depth() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding html drafts.
    pub drafts_path: PathBuf,
    #[serde(default = "default_placeholder", skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default = "default_font_families")]
    pub font_families: Vec<String>,
    #[serde(default = "default_font_sizes")]
    pub font_sizes: Vec<String>,
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Where the terminal client writes its log; it owns the screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    pub fn new(drafts_path: impl Into<PathBuf>) -> Self {
        Self {
            drafts_path: drafts_path.into(),
            placeholder: default_placeholder(),
            font_families: default_font_families(),
            font_sizes: default_font_sizes(),
            history_depth: default_history_depth(),
            log_file: None,
            log_level: default_log_level(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded paths
        config.drafts_path = Self::expand_path(&config.drafts_path).unwrap_or(config.drafts_path);
        config.log_file = config
            .log_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/inkpost");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Log file to use, falling back to one next to the config file.
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            let config_dir = shellexpand::tilde("~/.config/inkpost");
            PathBuf::from(config_dir.as_ref()).join("inkpost.log")
        })
    }

    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/inkpost/config.toml"));
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str(r#"drafts_path = "/tmp/drafts""#).unwrap();

        assert_eq!(config, Config::new("/tmp/drafts"));
        assert_eq!(config.history_depth, 100);
        assert_eq!(config.font_sizes.len(), 6);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_missing_drafts_path_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "placeholder = \"x\"\n").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("INKPOST_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$INKPOST_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("INKPOST_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(Config::expand_path(&path), Some(path));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config::new("/tmp/test-drafts");
        test_config.placeholder = None;
        test_config.log_file = Some(PathBuf::from("/tmp/inkpost.log"));
        test_config.font_sizes = vec!["10px".to_string()];

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config.drafts_path, test_config.drafts_path);
        assert_eq!(loaded_config.log_file, test_config.log_file);
        assert_eq!(loaded_config.font_sizes, test_config.font_sizes);
    }

    #[test]
    fn test_paths_in_toml_are_expanded() {
        unsafe {
            env::set_var("INKPOST_DRAFTS_ROOT", "/custom/drafts");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "drafts_path = \"$INKPOST_DRAFTS_ROOT/blog\"\nlog_file = \"~/inkpost.log\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.drafts_path, PathBuf::from("/custom/drafts/blog"));
        assert!(!config.log_path().to_string_lossy().starts_with('~'));

        unsafe {
            env::remove_var("INKPOST_DRAFTS_ROOT");
        }
    }
}
