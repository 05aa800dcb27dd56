use crate::error::{DevflowError, Result};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// The base config directory name under ~/.config/
const CONFIG_DIR_NAME: &str = "devflow";

/// Overrides the app directory.
pub const HOME_ENV: &str = "DEVFLOW_HOME";

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "DEVFLOW_CONFIG";

const CONFIG_FILENAME: &str = "config.json";

/// Written by `devflow init` when no config file exists yet.
pub const DEFAULT_CONFIG: &str = r#"{
  "issue_provider": "jira",
  "jira": {
    "url": "https://your-instance.atlassian.net",
    "email": "your.email@example.com",
    "token": "YOUR_API_TOKEN",
    "default_project_key": "KRAFT",
    "default_issue_type": "Task",
    "default_assignee_name": "Your Name"
  }
}
"#;

// ============================================================================
// Paths
// ============================================================================

/// The devflow app directory: `$DEVFLOW_HOME`, else `~/.config/devflow/`.
///
/// Does not create the directory.
pub fn app_dir() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| DevflowError::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR_NAME))
}

/// Ensure the app directory exists. Returns whether it was newly created.
pub fn ensure_app_dir() -> Result<(PathBuf, bool)> {
    let dir = app_dir()?;
    let created = !dir.exists();
    fs::create_dir_all(&dir)?;
    Ok((dir, created))
}

/// `$DEVFLOW_CONFIG`, else `<app dir>/config.json`.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(app_dir()?.join(CONFIG_FILENAME))
}

pub fn cache_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(crate::cache::CACHE_FILE))
}

// ============================================================================
// Config
// ============================================================================

/// Read-only hierarchical JSON configuration.
///
/// Lookups walk a key path. A segment written `@name` is first replaced by
/// the string stored at the top-level key `name`, so
/// `get(&["@issue_provider", "default_project_key"])` reads
/// `jira.default_project_key` when `issue_provider` is `"jira"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    root: Value,
}

impl Config {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Load from `path`. A missing file is an empty config; invalid JSON is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let root: Value = serde_json::from_str(&content).map_err(|e| {
            DevflowError::Config(format!(
                "Failed to parse config file at {:?}: {}",
                path, e
            ))
        })?;

        if !root.is_object() {
            return Err(DevflowError::Config(format!(
                "Config file at {:?} must contain a JSON object",
                path
            )));
        }

        Ok(Self { root })
    }

    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let mut node = &self.root;
        for segment in path {
            let key = match segment.strip_prefix('@') {
                Some(indirect) => self.root.get(indirect)?.as_str()?,
                None => segment,
            };
            node = node.get(key)?;
        }
        Some(node)
    }

    /// String value at `path`, ignoring blanks.
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// String value at `path` or a `Config` error naming the missing key.
    pub fn require_str(&self, path: &[&str]) -> Result<&str> {
        self.get_str(path).ok_or_else(|| {
            DevflowError::Config(format!(
                "Configuration parameter '{}' is required",
                path.join(".")
            ))
        })
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Config {
        Config::from_value(json!({
            "issue_provider": "jira",
            "jira": {
                "url": "https://acme.atlassian.net",
                "default_project_key": "KRAFT",
                "default_assignee_name": "  "
            }
        }))
    }

    #[test]
    fn test_get_plain_path() {
        let config = sample();
        assert_eq!(
            config.get_str(&["jira", "url"]),
            Some("https://acme.atlassian.net")
        );
        assert_eq!(config.get(&["jira", "missing"]), None);
    }

    #[test]
    fn test_get_with_indirection() {
        let config = sample();
        assert_eq!(
            config.get_str(&["@issue_provider", "default_project_key"]),
            Some("KRAFT")
        );
    }

    #[test]
    fn test_indirection_to_missing_key_is_none() {
        let config = sample();
        assert_eq!(config.get(&["@code_host", "token"]), None);
    }

    #[test]
    fn test_blank_string_is_treated_as_missing() {
        let config = sample();
        assert_eq!(config.get_str(&["@issue_provider", "default_assignee_name"]), None);
        let err = config.require_str(&["jira", "default_assignee_name"]).unwrap_err();
        assert!(err.to_string().contains("jira.default_assignee_name"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.get(&["jira"]), None);
    }

    #[test]
    fn test_load_invalid_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Config::load(&path), Err(DevflowError::Config(_))));

        fs::write(&path, "[]").unwrap();
        assert!(matches!(Config::load(&path), Err(DevflowError::Config(_))));
    }

    #[test]
    fn test_default_config_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, DEFAULT_CONFIG).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.get_str(&["@issue_provider", "default_issue_type"]),
            Some("Task")
        );
    }
}
