//! Configuration loading.
//!
//! Configuration is a single TOML file, loaded once at startup and immutable
//! afterwards:
//!
//! ```toml
//! port = 12140
//! path = "/"
//! secret = "s3cret"
//!
//! [chat]
//! api_url = "http://127.0.0.1:5700"
//! access_token = "bot-token"
//!
//! [routing]
//! "group/project" = [123456789]
//! "group/other" = [123456789, 987654321]
//! ```
//!
//! `port`, `path`, and `secret` have defaults (12140, "/", empty — empty
//! disables token verification). Every `[routing]` key is a GitLab project
//! path with namespace; the value lists the chat groups its events are
//! relayed to.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::router::RoutingTable;
use crate::types::{GroupId, ProjectPath};

/// Default webhook listener port.
pub const DEFAULT_PORT: u16 = 12140;

/// Default webhook endpoint path.
pub const DEFAULT_PATH: &str = "/";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The webhook endpoint path is not absolute.
    #[error("webhook path must start with '/', got {0:?}")]
    Path(String),
}

/// Chat API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the OneBot-compatible HTTP API.
    pub api_url: String,

    /// Optional bearer token for the chat API.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Top-level relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Port the webhook listener binds.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the webhook endpoint.
    #[serde(default = "default_path")]
    pub path: String,

    /// Shared secret expected in the `X-Gitlab-Token` header.
    /// Empty disables verification.
    #[serde(default)]
    pub secret: String,

    /// Chat API settings.
    pub chat: ChatConfig,

    /// Project path-with-namespace to destination chat groups.
    #[serde(default)]
    pub routing: HashMap<ProjectPath, Vec<GroupId>>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Config::from_toml_str(&text)
    }

    /// Parses configuration from a TOML string.
    ///
    /// The endpoint path must start with '/'; rejecting it here keeps a bad
    /// path from reaching the HTTP router, which would abort on it.
    pub fn from_toml_str(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text)?;
        if !config.path.starts_with('/') {
            return Err(ConfigError::Path(config.path));
        }
        Ok(config)
    }

    /// Builds the routing table from the configured mapping.
    pub fn routing_table(&self) -> RoutingTable {
        let mut table = RoutingTable::new();
        for (project, groups) in &self.routing {
            table.insert(project.clone(), groups.iter().copied());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        port = 8080
        path = "/gitlab"
        secret = "s3cret"

        [chat]
        api_url = "http://127.0.0.1:5700"
        access_token = "bot-token"

        [routing]
        "group/project" = [111, 222]
        "group/other" = [333]
    "#;

    #[test]
    fn full_config_parses() {
        let config = Config::from_toml_str(FULL).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.path, "/gitlab");
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.chat.api_url, "http://127.0.0.1:5700");
        assert_eq!(config.chat.access_token.as_deref(), Some("bot-token"));
        assert_eq!(
            config.routing.get(&ProjectPath::new("group/project")),
            Some(&vec![GroupId(111), GroupId(222)])
        );
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let config = Config::from_toml_str(
            r#"
            [chat]
            api_url = "http://127.0.0.1:5700"
        "#,
        )
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.path, DEFAULT_PATH);
        assert_eq!(config.secret, "");
        assert!(config.chat.access_token.is_none());
        assert!(config.routing.is_empty());
    }

    #[test]
    fn missing_chat_section_is_an_error() {
        let result = Config::from_toml_str("port = 8080");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let result = Config::from_toml_str("port = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn relative_path_is_an_error() {
        let result = Config::from_toml_str(
            r#"
            path = "hook"

            [chat]
            api_url = "http://127.0.0.1:5700"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Path(p)) if p == "hook"));
    }

    #[test]
    fn empty_path_is_an_error() {
        let result = Config::from_toml_str(
            r#"
            path = ""

            [chat]
            api_url = "http://127.0.0.1:5700"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Path(_))));
    }

    #[test]
    fn routing_table_mirrors_config() {
        let config = Config::from_toml_str(FULL).unwrap();
        let table = config.routing_table();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.groups_for(&ProjectPath::new("group/project")),
            Some(&[GroupId(111), GroupId(222)][..])
        );
    }
}
