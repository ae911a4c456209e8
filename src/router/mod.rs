//! Router flavors and the per-route documentation model.
//!
//! Applications expose their routes through one of two router flavors that differ only in
//! how the route table is narrowed and which routes the selection criteria pick:
//!
//! - **Standard**: See [`standard::StandardRouter`]
//! - **Versioned**: See [`versioned::VersionedRouter`]
//!
//! Both produce the same [`RouteDescriptor`] through the shared
//! [`crate::processor::RouteProcessor`].
//!
//! # Example
//!
//! ```
//! use apidoc_from_routes::filter::SelectionCriteria;
//! use apidoc_from_routes::manifest::{RouteEntry, RouteTable};
//! use apidoc_from_routes::router::{standard::StandardRouter, RouterFlavor};
//!
//! let mut table = RouteTable::default();
//! table.routes.push(RouteEntry::new(&["GET"], "users").with_name("users.index"));
//!
//! let criteria = SelectionCriteria {
//!     routes: vec!["users.index".to_string()],
//!     ..Default::default()
//! };
//! let router = StandardRouter::new(Some("api".to_string()));
//! let selected = router.select(&table, &criteria);
//! assert_eq!(selected.len(), 1);
//! assert_eq!(router.full_uri(selected[0]), "api/users");
//! ```

pub mod standard;
pub mod versioned;

use crate::client::{ExampleRequest, ExampleResponse};
use crate::docblock::DocBlock;
use crate::filter::SelectionCriteria;
use crate::manifest::{RouteEntry, RouteTable};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Trait implemented by each supported router flavor.
pub trait RouterFlavor {
    /// Flavor name used in log output.
    fn name(&self) -> &'static str;

    /// Rejects criteria the flavor cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NoSelectionCriteria`] when the flavor needs at least
    /// one selector and none was given.
    fn check_criteria(&self, criteria: &SelectionCriteria) -> crate::error::Result<()>;

    /// Routes of the table this flavor looks at, in router order.
    fn route_table<'a>(&self, table: &'a RouteTable, criteria: &SelectionCriteria)
        -> Vec<&'a RouteEntry>;

    /// Whether the criteria select the route.
    fn is_selected(&self, route: &RouteEntry, criteria: &SelectionCriteria) -> bool;

    /// URI as it appears in the documentation and in example calls.
    fn full_uri(&self, route: &RouteEntry) -> String;

    /// Selected routes in router order; validity is checked later by the processor.
    fn select<'a>(&self, table: &'a RouteTable, criteria: &SelectionCriteria) -> Vec<&'a RouteEntry> {
        self.route_table(table, criteria)
            .into_iter()
            .filter(|route| self.is_selected(route, criteria))
            .collect()
    }
}

/// HTTP methods a documented route can answer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl HttpMethod {
    /// Parses a verb; `HEAD` and unknown verbs are not documented and yield `None`.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Documented verbs of a route, deduplicated, in router order.
pub fn resolve_methods(route: &RouteEntry) -> Vec<HttpMethod> {
    let mut methods = Vec::new();
    for method in route.methods.iter().filter_map(|m| HttpMethod::parse(m)) {
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    methods
}

/// `[GET,POST] uri` label used in log messages.
pub fn route_label(methods: &[HttpMethod], uri: &str) -> String {
    let verbs: Vec<&str> = methods.iter().map(HttpMethod::as_str).collect();
    format!("[{}] {}", verbs.join(","), uri)
}

/// Stable anchor id of a route.
///
/// Derived from the controller action and the route signature so that it survives
/// regeneration and stays unique per (methods, uri) pair.
pub fn route_id(action: &str, methods: &[HttpMethod], uri: &str) -> String {
    let verbs: Vec<&str> = methods.iter().map(HttpMethod::as_str).collect();
    let digest = Sha256::digest(format!("{}|{}|{}", action, verbs.join(","), uri).as_bytes());
    digest.iter().take(16).map(|b| format!("{:02x}", b)).collect()
}

/// Where a documented parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Body,
    Query,
}

/// A parameter declared through `@bodyParam` / `@queryParam`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocParameter {
    pub name: String,
    pub location: ParameterLocation,
    #[serde(rename = "type")]
    pub param_type: String,
    pub required: bool,
    pub description: String,
}

impl DocParameter {
    /// Collects the parameters declared in a docblock.
    ///
    /// `@bodyParam name type [required] description` and
    /// `@queryParam name [required] description` are understood.
    pub fn from_docblock(doc: &DocBlock) -> Vec<Self> {
        let body = doc
            .tags_named("bodyParam")
            .filter_map(|tag| Self::parse(&tag.content, ParameterLocation::Body));
        let query = doc
            .tags_named("queryParam")
            .filter_map(|tag| Self::parse(&tag.content, ParameterLocation::Query));
        body.chain(query).collect()
    }

    fn parse(content: &str, location: ParameterLocation) -> Option<Self> {
        let mut words = content.split_whitespace().peekable();
        let name = words.next()?.to_string();

        let param_type = match location {
            ParameterLocation::Body => words.next().unwrap_or("string").to_string(),
            ParameterLocation::Query => "string".to_string(),
        };

        let required = words.peek() == Some(&"required");
        if required {
            words.next();
        }

        Some(Self {
            name,
            location,
            param_type,
            required,
            description: words.collect::<Vec<_>>().join(" "),
        })
    }
}

/// Everything the generator knows about one documented route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDescriptor {
    /// Anchor id, see [`route_id`]
    pub id: String,
    /// Controller action (`Class@method`)
    pub action: String,
    pub methods: Vec<HttpMethod>,
    /// Full URI including any global prefix
    pub uri: String,
    pub name: Option<String>,
    /// Resource group the route is listed under
    pub resource: String,
    pub middleware: Vec<String>,
    pub title: String,
    pub description: String,
    pub parameters: Vec<DocParameter>,
    pub example_request: Option<ExampleRequest>,
    pub example_response: Option<ExampleResponse>,
    /// Freshly rendered fragment, markers included
    pub rendered: String,
    /// Manually edited fragment kept from the previous output
    pub modified: Option<String>,
}

impl RouteDescriptor {
    pub fn label(&self) -> String {
        route_label(&self.methods, &self.uri)
    }

    /// Fragment that goes into the published document.
    pub fn published_fragment(&self) -> &str {
        self.modified.as_deref().unwrap_or(&self.rendered)
    }

    /// Heading of the route: its docblock summary, or the URI when undocumented.
    pub fn heading(&self) -> &str {
        if self.title.is_empty() {
            &self.uri
        } else {
            &self.title
        }
    }
}
