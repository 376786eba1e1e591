//! Optional YAML config file.
//!
//! Read from `--config <path>` or, failing that, `~/.ddb.yaml`. A missing
//! default file is not an error. Every key is optional and only supplies a
//! default: environment variables and command-line flags win.
//!
//! ```yaml
//! pretty: true
//! color: false
//! verbose: false
//! region: eu-west-1
//! endpoint-url: http://localhost:8000
//! timeout-secs: 10
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ddb_client::ClientConfig;
use serde::Deserialize;

/// File name looked up in the home directory.
pub const DEFAULT_FILE_NAME: &str = ".ddb.yaml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub pretty: Option<bool>,
    pub color: Option<bool>,
    pub verbose: Option<bool>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub timeout_secs: Option<u64>,

    /// Where the values came from, if a file was read.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl FileConfig {
    /// Load `explicit`, or the default file if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match dirs::home_dir().map(|home| home.join(DEFAULT_FILE_NAME)) {
            Some(path) if path.is_file() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Write the connection settings the file sets into `config`.
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(region) = &self.region {
            config.region.clone_from(region);
        }
        if let Some(endpoint) = &self.endpoint_url {
            config.endpoint_url = Some(endpoint.clone());
        }
        if let Some(secs) = self.timeout_secs.filter(|s| *s > 0) {
            config.timeout = Duration::from_secs(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.yaml", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_should_parse_every_key() {
        let config = FileConfig::parse(
            "pretty: true\ncolor: false\nverbose: true\nregion: eu-west-1\n\
             endpoint-url: http://localhost:8000\ntimeout-secs: 9\n",
        )
        .unwrap();
        assert_eq!(config.pretty, Some(true));
        assert_eq!(config.color, Some(false));
        assert_eq!(config.verbose, Some(true));
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.timeout_secs, Some(9));
    }

    #[test]
    fn test_should_treat_empty_file_as_unset() {
        assert_eq!(FileConfig::parse("\n").unwrap(), FileConfig::default());
        assert_eq!(FileConfig::parse("pretty: true\n").unwrap().color, None);
    }

    #[test]
    fn test_should_reject_unknown_key() {
        let err = FileConfig::parse("colour: true\n").unwrap_err();
        assert!(err.to_string().contains("colour"), "{err}");
    }

    #[test]
    fn test_should_apply_connection_settings() {
        let file = FileConfig {
            region: Some("sa-east-1".to_owned()),
            endpoint_url: Some("http://ddb.local:8000".to_owned()),
            timeout_secs: Some(0),
            ..Default::default()
        };
        let mut config = ClientConfig::default();
        file.apply(&mut config);
        assert_eq!(config.region, "sa-east-1");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://ddb.local:8000"));
        assert_eq!(config.timeout, ddb_client::config::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_should_load_explicit_path_and_record_source() {
        let path = temp_file("ddb-config-explicit", "region: us-west-1\n");
        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.region.as_deref(), Some("us-west-1"));
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_should_fail_for_missing_explicit_path() {
        let path = std::env::temp_dir().join("ddb-config-does-not-exist.yaml");
        let err = FileConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
