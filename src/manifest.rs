use crate::error::Error;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Exported route table of the documented application.
///
/// The manifest is produced by the application itself (for example by a console
/// command dumping its router) and carries both the routes and the raw docblocks
/// of the handlers they point to, so the generator never has to load application
/// code.
///
/// # Example
///
/// ```no_run
/// use apidoc_from_routes::manifest::RouteTable;
/// use std::path::Path;
///
/// let table = RouteTable::load(Path::new("routes.json")).unwrap();
/// println!("Loaded {} routes", table.routes.len());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTable {
    /// Registered routes in router order
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Handler documentation keyed by action (`Class@method`)
    #[serde(default)]
    pub handlers: HashMap<String, HandlerDocs>,
}

/// A single registered route as the router reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Verbs the route answers to (`HEAD` is reported but never documented)
    pub methods: Vec<String>,
    /// URI pattern without leading slash, e.g. `api/users/{user}`
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub middleware: Vec<String>,
    /// `Class@method` for controller actions, `Closure` for inline handlers
    #[serde(default)]
    pub action: Option<String>,
    /// API version the route is registered under (versioned router only)
    #[serde(default)]
    pub version: Option<String>,
}

/// Raw documentation comments attached to a handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlerDocs {
    /// Docblock of the handler method
    #[serde(default)]
    pub doc: Option<String>,
    /// Docblock of the controller class
    #[serde(default)]
    pub controller_doc: Option<String>,
}

impl RouteTable {
    /// Loads a route manifest, choosing YAML for `.yaml`/`.yml` files and JSON otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a route table.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading route manifest: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read route manifest: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let table = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
        .map_err(|e| Error::ManifestError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(
            "Loaded {} routes and {} documented handlers",
            table.routes.len(),
            table.handlers.len()
        );
        Ok(table)
    }

    pub fn from_json(content: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> crate::error::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

impl RouteEntry {
    /// Creates a route answering to the given verbs with no name, middleware or action.
    pub fn new(methods: &[&str], uri: &str) -> Self {
        Self {
            methods: methods.iter().map(|m| m.to_string()).collect(),
            uri: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_middleware(mut self, middleware: &str) -> Self {
        self.middleware.push(middleware.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Returns the controller action when the handler is a concrete `Class@method`.
    ///
    /// Closures and missing handlers cannot be documented and yield `None`.
    pub fn controller_action(&self) -> Option<&str> {
        let action = self.action.as_deref()?;
        let (class, method) = action.split_once('@')?;
        if class.is_empty() || method.is_empty() {
            return None;
        }
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JSON_MANIFEST: &str = r#"{
        "routes": [
            {
                "methods": ["GET", "HEAD"],
                "uri": "api/users",
                "name": "users.index",
                "middleware": ["api"],
                "action": "App\\Http\\Controllers\\UserController@index"
            },
            { "methods": ["GET"], "uri": "health", "action": "Closure" }
        ],
        "handlers": {
            "App\\Http\\Controllers\\UserController@index": {
                "doc": "/** List users */",
                "controller_doc": "/** @resource Users */"
            }
        }
    }"#;

    #[test]
    fn test_load_json_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.json");
        fs::write(&path, JSON_MANIFEST).unwrap();

        let table = RouteTable::load(&path).unwrap();
        assert_eq!(table.routes.len(), 2);
        assert_eq!(table.routes[0].name.as_deref(), Some("users.index"));
        assert_eq!(table.routes[0].middleware, vec!["api"]);
        assert!(table.routes[1].name.is_none());
        assert_eq!(table.handlers.len(), 1);
    }

    #[test]
    fn test_load_yaml_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.yaml");
        fs::write(
            &path,
            "routes:\n  - methods: [POST]\n    uri: api/orders\n    version: v1\n",
        )
        .unwrap();

        let table = RouteTable::load(&path).unwrap();
        assert_eq!(table.routes.len(), 1);
        assert_eq!(table.routes[0].version.as_deref(), Some("v1"));
        assert!(table.handlers.is_empty());
    }

    #[test]
    fn test_load_invalid_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.json");
        fs::write(&path, "{ not json").unwrap();

        let err = RouteTable::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid route manifest"));
    }

    #[test]
    fn test_load_missing_manifest() {
        let result = RouteTable::load(Path::new("/definitely/not/here.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_controller_action() {
        let route = RouteEntry::new(&["GET"], "a").with_action("UserController@index");
        assert_eq!(route.controller_action(), Some("UserController@index"));

        let closure = RouteEntry::new(&["GET"], "a").with_action("Closure");
        assert_eq!(closure.controller_action(), None);

        let missing = RouteEntry::new(&["GET"], "a");
        assert_eq!(missing.controller_action(), None);

        let broken = RouteEntry::new(&["GET"], "a").with_action("@index");
        assert_eq!(broken.controller_action(), None);
    }
}
