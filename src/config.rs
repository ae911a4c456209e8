use crate::error::Error;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Generator configuration loaded from a YAML file.
///
/// Everything here has a default so a run without a config file still works;
/// only example calls and impersonation need real values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL the example calls are sent to
    pub base_url: String,
    /// Public URL shown in the documentation's curl examples (defaults to `base_url`)
    pub docs_url: Option<String>,
    /// Timeout of a single example call
    pub timeout_secs: u64,
    pub auth: AuthConfig,
    /// Action (`Controller@method`, without namespace) to impersonated username
    pub routes: HashMap<String, String>,
    /// Username to credentials of the users available for impersonation
    pub users: BTreeMap<String, UserCredentials>,
}

/// How impersonated users obtain their token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Login endpoint receiving `{"username", "password"}`
    pub login_path: String,
    /// JSON pointer to the token in the login response
    pub token_pointer: String,
    /// Header carrying the token on example calls
    pub token_header: String,
    /// Optional user lookup endpoint; `{id}` is replaced by the user id
    pub user_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub password: String,
    pub id: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            docs_url: None,
            timeout_secs: 30,
            auth: AuthConfig::default(),
            routes: HashMap::new(),
            users: BTreeMap::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/api/login".to_string(),
            token_pointer: "/access_token/token".to_string(),
            token_header: "X-Token".to_string(),
            user_path: None,
        }
    }
}

impl Config {
    /// Loads the configuration file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        debug!("Loading config file: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> crate::error::Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// URL used in the rendered curl examples and the exported collection.
    pub fn public_url(&self) -> &str {
        self.docs_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Finds the configured username owning the given user id.
    pub fn username_for_id(&self, id: u64) -> Option<&str> {
        self.users
            .iter()
            .find(|(_, creds)| creds.id == id)
            .map(|(name, _)| name.as_str())
    }
}

/// Parses route bindings given as `name,value|name,value`.
///
/// Malformed entries are skipped with a warning.
pub fn parse_bindings(raw: Option<&str>) -> BTreeMap<String, String> {
    let mut bindings = BTreeMap::new();
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return bindings;
    };

    for binding in raw.split('|') {
        match binding.split_once(',') {
            Some((name, value)) if !name.trim().is_empty() => {
                bindings.insert(name.trim().to_string(), value.trim().to_string());
            }
            _ => warn!("Ignoring malformed binding: {}", binding),
        }
    }

    bindings
}

/// Parses `Name: value` header strings into pairs.
///
/// Values without a `:` separator are skipped with a warning.
pub fn parse_headers(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|header| match header.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                Some((name.trim().to_string(), value.trim().to_string()))
            }
            _ => {
                warn!("Ignoring malformed header: {}", header);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config_yaml() {
        let config = Config::from_yaml(
            r#"
base_url: http://app.test
auth:
  token_header: Authorization
routes:
  UserController@index: admin
users:
  admin:
    password: secret
    id: 7
"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://app.test");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.auth.token_header, "Authorization");
        assert_eq!(config.auth.login_path, "/api/login");
        assert_eq!(config.routes["UserController@index"], "admin");
        assert_eq!(
            config.users["admin"],
            UserCredentials { password: "secret".to_string(), id: 7 }
        );
        assert_eq!(config.username_for_id(7), Some("admin"));
        assert_eq!(config.username_for_id(8), None);
        assert_eq!(config.public_url(), "http://app.test");
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_yaml("users: [1, 2").unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.base_url, "http://localhost");
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("apidoc.yaml");
        fs::write(&path, "docs_url: https://docs.test\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.public_url(), "https://docs.test");
    }

    #[test]
    fn test_parse_bindings() {
        let bindings = parse_bindings(Some("user,1|order, 42|broken|,3"));
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings["user"], "1");
        assert_eq!(bindings["order"], "42");

        assert!(parse_bindings(None).is_empty());
        assert!(parse_bindings(Some("")).is_empty());
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            "Accept-Language: en".to_string(),
            "X-Trace:abc:def".to_string(),
            "nonsense".to_string(),
        ]);
        assert_eq!(
            headers,
            vec![
                ("Accept-Language".to_string(), "en".to_string()),
                ("X-Trace".to_string(), "abc:def".to_string()),
            ]
        );
    }
}
