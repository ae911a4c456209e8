//! Route selection and validity checks.
//!
//! A route is documented when it is *selected* by at least one criterion and is
//! *valid*: backed by a concrete controller action whose docblock does not hide it.

use crate::manifest::RouteEntry;
use crate::metadata::MetadataProvider;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

lazy_static! {
    /// Compiled `str_is` patterns, keyed by pattern.
    static ref GLOBS: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());
}

/// Which routes the user asked to document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// Explicit route names
    pub routes: Vec<String>,
    /// URI pattern where `*` matches any run of characters
    pub route_prefix: Option<String>,
    /// Middleware name a route must carry
    pub middleware: Option<String>,
}

/// Why a selected route is left out of the documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Closure or missing handler, nothing to read documentation from
    NotIntrospectable,
    /// Handler docblock carries `@hideFromAPIDocumentation`
    Hidden,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotIntrospectable => write!(f, "handler is not a controller action"),
            Rejection::Hidden => write!(f, "hidden from documentation"),
        }
    }
}

impl SelectionCriteria {
    /// True when no criterion at all was supplied.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.route_prefix.is_none() && self.middleware.is_none()
    }

    /// Whether any criterion selects the route.
    ///
    /// `uri` is the URI the prefix pattern is matched against; flavors decide
    /// whether that includes a global prefix.
    pub fn matches(&self, route: &RouteEntry, uri: &str) -> bool {
        let by_name = route
            .name
            .as_ref()
            .is_some_and(|name| self.routes.contains(name));
        let by_prefix = self
            .route_prefix
            .as_deref()
            .is_some_and(|pattern| str_is(pattern, uri));
        let by_middleware = self
            .middleware
            .as_ref()
            .is_some_and(|m| route.middleware.contains(m));

        by_name || by_prefix || by_middleware
    }
}

/// Checks that a route can and may be documented, returning its controller action.
pub fn validate<'a>(
    route: &'a RouteEntry,
    metadata: &dyn MetadataProvider,
) -> Result<&'a str, Rejection> {
    let action = route.controller_action().ok_or(Rejection::NotIntrospectable)?;
    if metadata.is_hidden(action) {
        return Err(Rejection::Hidden);
    }
    Ok(action)
}

/// Glob-style whole-string match where `*` is the only wildcard.
pub fn str_is(pattern: &str, value: &str) -> bool {
    if pattern == value {
        return true;
    }

    let mut globs = GLOBS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = globs.get(pattern) {
        return re.is_match(value);
    }

    let expression = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    match Regex::new(&expression) {
        Ok(re) => {
            let matched = re.is_match(value);
            globs.insert(pattern.to_string(), re);
            matched
        }
        Err(_) => false,
    }
}
