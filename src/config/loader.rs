//! Config file discovery, layering and writing.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Config, ConfigFile};
use crate::error::ConfigError;

/// File name of both the global and the repository-local config.
pub const CONFIG_FILENAME: &str = ".gitmit.json";

/// Environment variable overriding the global config location.
pub const GLOBAL_CONFIG_ENV: &str = "GITMIT_GLOBAL_CONFIG";

/// Load the merged configuration for a repository.
///
/// Missing files are skipped; a file that exists but cannot be read or parsed
/// is an error.
pub fn load(repo_root: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            debug!("Loading global config from {}", global_path.display());
            config.merge(load_file(&global_path)?);
        }
    }

    if let Some(root) = repo_root {
        let local_path = root.join(CONFIG_FILENAME);
        if local_path.exists() {
            debug!("Loading local config from {}", local_path.display());
            config.merge(load_file(&local_path)?);
        }
    }

    Ok(config)
}

/// Read one config layer from disk.
pub fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Location of the global config: `$GITMIT_GLOBAL_CONFIG`, else `~/.gitmit.json`.
pub fn global_config_path() -> Option<PathBuf> {
    match std::env::var(GLOBAL_CONFIG_ENV) {
        Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
        _ => dirs::home_dir().map(|home| home.join(CONFIG_FILENAME)),
    }
}

/// Write a config layer as pretty JSON.
pub fn write(path: &Path, file: &ConfigFile) -> Result<(), ConfigError> {
    let mut json = serde_json::to_string_pretty(file).map_err(ConfigError::SerializeFailed)?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Action;
    use serial_test::serial;

    fn write_json(path: &Path, json: &str) {
        std::fs::write(path, json).expect("failed to write config");
    }

    #[test]
    #[serial]
    fn test_load_without_any_config_files() {
        let repo = tempfile::tempdir().unwrap();
        let missing = repo.path().join("no-global.json");
        temp_env::with_var(GLOBAL_CONFIG_ENV, Some(missing.as_os_str()), || {
            let config = load(Some(repo.path())).unwrap();
            assert_eq!(config, Config::default());
        });
    }

    #[test]
    #[serial]
    fn test_local_overrides_global() {
        let global_dir = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        let global_path = global_dir.path().join("global.json");

        write_json(
            &global_path,
            r#"{"topicMappings": {"cmd/": "cli"}, "diffStatThreshold": 0.6, "projectType": "go"}"#,
        );
        write_json(
            &repo.path().join(CONFIG_FILENAME),
            r#"{"topicMappings": {"api/": "api"}, "diffStatThreshold": 0.4}"#,
        );

        temp_env::with_var(GLOBAL_CONFIG_ENV, Some(global_path.as_os_str()), || {
            let config = load(Some(repo.path())).unwrap();
            assert_eq!(config.topic_mappings.len(), 2);
            assert_eq!(config.effective_threshold(), 0.4);
            assert_eq!(config.project_type, "go");
        });
    }

    #[test]
    #[serial]
    fn test_invalid_local_config_is_an_error() {
        let repo = tempfile::tempdir().unwrap();
        let missing = repo.path().join("no-global.json");
        write_json(&repo.path().join(CONFIG_FILENAME), "{ not json");

        temp_env::with_var(GLOBAL_CONFIG_ENV, Some(missing.as_os_str()), || {
            let err = load(Some(repo.path())).unwrap_err();
            assert!(matches!(err, ConfigError::ParseFile { .. }));
        });
    }

    #[test]
    #[serial]
    fn test_global_path_from_env() {
        temp_env::with_var(GLOBAL_CONFIG_ENV, Some("/tmp/custom.json"), || {
            assert_eq!(global_config_path(), Some(PathBuf::from("/tmp/custom.json")));
        });
    }

    #[test]
    fn test_write_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let mut file = ConfigFile {
            project_type: Some("rust".to_string()),
            ..Default::default()
        };
        file.keywords = Some(
            [(Action::Fix, [("panic".to_string(), 2)].into_iter().collect())]
                .into_iter()
                .collect(),
        );

        write(&path, &file).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"projectType\": \"rust\""));
        assert!(!content.contains("topicMappings"));
        assert_eq!(load_file(&path).unwrap(), file);
    }
}
