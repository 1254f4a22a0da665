//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::Path;

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the standard locations are
    /// searched and defaults are used if none is found.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::config_not_found(p));
            }
        }

        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        tracing::debug!(path = ?config_path, "Configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse and validate an in-memory TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let schema: ConfigSchema = toml::from_str(content)?;
        schema.validate()?;
        Ok(Self { schema, path: None })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [".tablemate.toml", "tablemate.toml", ".config/tablemate.toml"];

    candidates
        .iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(|candidate| (*candidate).to_string())
}

/// Load, parse and validate a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path))?;

    schema.validate().context(format!("Invalid config file {}", path))?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterStrategy;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.pagination.page_size, 20);
        assert_eq!(config.schema.search.cache_max_entries, 50);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Config::load(Some("/definitely/not/here/tablemate.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tablemate.toml");
        std::fs::write(
            &path,
            r#"
[pagination]
page_size = 10

[cluster]
strategy = "nearest-fit"
"#,
        )
        .unwrap();

        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(config.schema.pagination.page_size, 10);
        assert_eq!(config.schema.pagination.max_map_markers, 100);
        assert_eq!(config.schema.cluster.strategy, ClusterStrategy::NearestFit);
        assert!(config.path.is_some());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tablemate.toml");
        std::fs::write(&path, "[pagination]\npage_size = 0\n").unwrap();

        let err = Config::load(path.to_str()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_from_toml_str_parse_error() {
        let err = Config::from_toml_str("[search\ncache_ttl_secs = ").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }
}
