//! Impersonated identities for example calls.
//!
//! Some routes only answer meaningfully for an authenticated user. The configuration maps
//! controller actions to usernames; before such a route's example call the user is
//! authenticated through an [`AuthGuard`] and the resulting [`Identity`] is passed along
//! with the request. Identities are cached per username for the duration of a run.

use crate::config::{AuthConfig, Config};
use crate::error::Error;
use log::{debug, warn};
use std::collections::HashMap;
use std::time::Duration;

/// Authentication collaborator of the documented application.
pub trait AuthGuard {
    /// Whether a user with this id exists.
    fn user_exists(&self, id: u64) -> crate::error::Result<bool>;

    /// Attempts a login, returning the access token on success and `None` when the
    /// credentials are rejected.
    fn attempt(&self, username: &str, password: &str) -> crate::error::Result<Option<String>>;
}

/// An authenticated user whose token is attached to example calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub user_id: u64,
    pub token: String,
}

impl Identity {
    /// Header pair carrying the token.
    pub fn header(&self, name: &str) -> (String, String) {
        (name.to_string(), self.token.clone())
    }
}

/// Resolves and caches identities for controller actions.
pub struct Impersonator<'a> {
    guard: &'a dyn AuthGuard,
    config: &'a Config,
    default_username: Option<String>,
    identities: HashMap<String, Identity>,
}

impl<'a> Impersonator<'a> {
    /// Creates an impersonator. `default_user_id` applies to actions without an explicit
    /// mapping and must belong to a configured user, otherwise it is ignored.
    pub fn new(guard: &'a dyn AuthGuard, config: &'a Config, default_user_id: Option<u64>) -> Self {
        let default_username = default_user_id.and_then(|id| {
            let username = config.username_for_id(id);
            if username.is_none() {
                warn!("No configured user has id {}, ignoring --act-as-user-id", id);
            }
            username.map(str::to_string)
        });

        Self {
            guard,
            config,
            default_username,
            identities: HashMap::new(),
        }
    }

    /// Username to impersonate for an action, if any.
    ///
    /// Actions are matched without their namespace, e.g. `UserController@index`.
    pub fn username_for(&self, action: &str) -> Option<&str> {
        let key = action.rsplit('\\').next().unwrap_or(action);
        self.config
            .routes
            .get(key)
            .map(String::as_str)
            .or(self.default_username.as_deref())
    }

    /// Identity for the action: `Ok(None)` when the action runs anonymously.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationError`] when the mapped user is not configured,
    /// does not exist, or its credentials are rejected.
    pub fn identity_for(&mut self, action: &str) -> crate::error::Result<Option<Identity>> {
        let Some(username) = self.username_for(action).map(str::to_string) else {
            return Ok(None);
        };

        if let Some(identity) = self.identities.get(&username) {
            debug!("User {} already authenticated, reusing token", username);
            return Ok(Some(identity.clone()));
        }

        let failed = |message: &str| Error::AuthenticationError {
            username: username.clone(),
            message: message.to_string(),
        };

        let credentials = self
            .config
            .users
            .get(&username)
            .ok_or_else(|| failed("user is not configured"))?;

        if !self.guard.user_exists(credentials.id)? {
            return Err(failed(&format!("no user with id {}", credentials.id)));
        }

        debug!("Authenticating {} for {}", username, action);
        let token = self
            .guard
            .attempt(&username, &credentials.password)?
            .ok_or_else(|| failed("credentials rejected"))?;

        let identity = Identity {
            username: username.clone(),
            user_id: credentials.id,
            token,
        };
        self.identities.insert(username, identity.clone());
        Ok(Some(identity))
    }
}

/// [`AuthGuard`] logging in through the application's HTTP API.
pub struct HttpAuthGuard {
    base_url: String,
    auth: AuthConfig,
    client: reqwest::blocking::Client,
}

impl HttpAuthGuard {
    pub fn new(config: &Config) -> crate::error::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ConfigError(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: config.auth.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl AuthGuard for HttpAuthGuard {
    fn user_exists(&self, id: u64) -> crate::error::Result<bool> {
        let Some(path) = &self.auth.user_path else {
            return Ok(true);
        };

        let url = self.url(&path.replace("{id}", &id.to_string()));
        let response = self.client.get(&url).send().map_err(|e| Error::AuthenticationError {
            username: id.to_string(),
            message: e.to_string(),
        })?;

        Ok(response.status().is_success())
    }

    fn attempt(&self, username: &str, password: &str) -> crate::error::Result<Option<String>> {
        let failed = |message: String| Error::AuthenticationError {
            username: username.to_string(),
            message,
        };

        let response = self
            .client
            .post(self.url(&self.auth.login_path))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            debug!("Login for {} answered {}", username, response.status());
            return Ok(None);
        }

        let body: serde_json::Value = response.json().map_err(|e| failed(e.to_string()))?;
        let token = body
            .pointer(&self.auth.token_pointer)
            .and_then(|t| t.as_str())
            .ok_or_else(|| failed(format!("no token at {}", self.auth.token_pointer)))?;

        Ok(Some(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserCredentials;
    use std::cell::Cell;

    struct StubGuard {
        attempts: Cell<usize>,
    }

    impl AuthGuard for StubGuard {
        fn user_exists(&self, id: u64) -> crate::error::Result<bool> {
            Ok(id != 404)
        }

        fn attempt(&self, username: &str, password: &str) -> crate::error::Result<Option<String>> {
            self.attempts.set(self.attempts.get() + 1);
            if password == "secret" {
                Ok(Some(format!("token-{}", username)))
            } else {
                Ok(None)
            }
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.routes.insert("UserController@index".to_string(), "admin".to_string());
        config.routes.insert("UserController@store".to_string(), "admin".to_string());
        config.routes.insert("OrderController@index".to_string(), "guest".to_string());
        config.routes.insert("OrderController@show".to_string(), "ghost".to_string());
        config.routes.insert("OrderController@store".to_string(), "missing".to_string());
        config.users.insert(
            "admin".to_string(),
            UserCredentials { password: "secret".to_string(), id: 1 },
        );
        config.users.insert(
            "guest".to_string(),
            UserCredentials { password: "wrong".to_string(), id: 2 },
        );
        config.users.insert(
            "missing".to_string(),
            UserCredentials { password: "secret".to_string(), id: 404 },
        );
        config
    }

    #[test]
    fn test_identity_is_cached_per_username() {
        let guard = StubGuard { attempts: Cell::new(0) };
        let config = config();
        let mut impersonator = Impersonator::new(&guard, &config, None);

        let first = impersonator
            .identity_for("App\\Http\\Controllers\\UserController@index")
            .unwrap()
            .unwrap();
        let second = impersonator
            .identity_for("App\\Http\\Controllers\\UserController@store")
            .unwrap()
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.token, "token-admin");
        assert_eq!(first.user_id, 1);
        assert_eq!(guard.attempts.get(), 1);
        assert_eq!(impersonator.identities.len(), 1);
        assert_eq!(
            first.header("X-Token"),
            ("X-Token".to_string(), "token-admin".to_string())
        );
    }

    #[test]
    fn test_unmapped_action_is_anonymous() {
        let guard = StubGuard { attempts: Cell::new(0) };
        let config = config();
        let mut impersonator = Impersonator::new(&guard, &config, None);

        assert_eq!(impersonator.identity_for("PingController@ping").unwrap(), None);
        assert_eq!(guard.attempts.get(), 0);
    }

    #[test]
    fn test_default_user_applies_to_unmapped_actions() {
        let guard = StubGuard { attempts: Cell::new(0) };
        let config = config();
        let mut impersonator = Impersonator::new(&guard, &config, Some(1));

        let identity = impersonator.identity_for("PingController@ping").unwrap().unwrap();
        assert_eq!(identity.username, "admin");
    }

    #[test]
    fn test_unknown_default_user_is_ignored() {
        let guard = StubGuard { attempts: Cell::new(0) };
        let config = config();
        let impersonator = Impersonator::new(&guard, &config, Some(99));

        assert_eq!(impersonator.username_for("PingController@ping"), None);
    }

    #[test]
    fn test_failures() {
        let guard = StubGuard { attempts: Cell::new(0) };
        let config = config();
        let mut impersonator = Impersonator::new(&guard, &config, None);

        let rejected = impersonator.identity_for("OrderController@index").unwrap_err();
        assert!(rejected.to_string().contains("credentials rejected"));

        let unconfigured = impersonator.identity_for("OrderController@show").unwrap_err();
        assert!(unconfigured.to_string().contains("ghost"));

        let nonexistent = impersonator.identity_for("OrderController@store").unwrap_err();
        assert!(nonexistent.to_string().contains("no user with id 404"));

        assert_eq!(impersonator.identities.len(), 0);
    }
}
