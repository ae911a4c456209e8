//! Postman collection export.
//!
//! The documented routes are turned into a Postman v2.0.0 collection with one folder per
//! resource group and one request per route, so the API can be explored from an API
//! client right after generation.

use crate::renderer::RouteGroup;
use crate::router::{ParameterLocation, RouteDescriptor};
use serde::{Deserialize, Serialize};

pub const SCHEMA_URL: &str = "https://schema.getpostman.com/json/collection/v2.0.0/collection.json";

/// A complete Postman collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub info: CollectionInfo,
    /// One folder per resource group
    pub item: Vec<Folder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub description: String,
    pub schema: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub description: String,
    pub item: Vec<Item>,
}

/// A request entry with its saved example responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub request: Request,
    pub response: Vec<SavedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub header: Vec<Header>,
    pub body: Body,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,
    pub formdata: Vec<FormParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormParameter {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResponse {
    pub name: String,
    pub code: u16,
    pub body: String,
}

/// Builds a [`Collection`] from grouped routes.
pub struct CollectionExporter {
    name: String,
    base_url: String,
    headers: Vec<(String, String)>,
}

impl CollectionExporter {
    pub fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
        }
    }

    /// Static headers added to every request after `Accept`.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn export(&self, groups: &[RouteGroup]) -> Collection {
        Collection {
            info: CollectionInfo {
                name: self.name.clone(),
                description: String::new(),
                schema: SCHEMA_URL.to_string(),
            },
            item: groups
                .iter()
                .map(|group| Folder {
                    name: group.name.clone(),
                    description: String::new(),
                    item: group.routes.iter().map(|route| self.item(route)).collect(),
                })
                .collect(),
        }
    }

    fn item(&self, route: &RouteDescriptor) -> Item {
        let mut header = vec![Header {
            key: "Accept".to_string(),
            value: "application/json".to_string(),
        }];
        header.extend(
            self.headers
                .iter()
                .filter(|(key, _)| !key.eq_ignore_ascii_case("accept"))
                .map(|(key, value)| Header {
                    key: key.clone(),
                    value: value.clone(),
                }),
        );

        let formdata = route
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Body)
            .map(|p| FormParameter {
                key: p.name.clone(),
                value: String::new(),
                param_type: "text".to_string(),
                enabled: true,
            })
            .collect();

        let response = route
            .example_response
            .iter()
            .map(|example| SavedResponse {
                name: "Example response".to_string(),
                code: example.status,
                body: example.body.clone(),
            })
            .collect();

        Item {
            name: route.heading().to_string(),
            request: Request {
                url: format!("{}/{}", self.base_url, route.uri.trim_start_matches('/')),
                method: route.methods[0].to_string(),
                header,
                body: Body {
                    mode: "formdata".to_string(),
                    formdata,
                },
                description: route.description.clone(),
            },
            response,
        }
    }
}
