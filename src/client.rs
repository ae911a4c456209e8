//! Example calls against the running application.
//!
//! Response capture goes through [`ExampleClient`] so the processor can be driven by a
//! real HTTP client in production and by a stub in tests.

use crate::error::Error;
use crate::router::HttpMethod;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

lazy_static! {
    /// Optional route parameter such as `/{post?}`, with its leading slash.
    static ref OPTIONAL_PARAMETER: Regex = Regex::new(r"/?\{[^/{}]+\?\}").unwrap();
}

/// A request issued to capture an example response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleRequest {
    pub method: HttpMethod,
    /// URI with route bindings applied, relative to the application root
    pub uri: String,
    pub headers: Vec<(String, String)>,
}

/// Captured response of an example request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleResponse {
    pub status: u16,
    pub body: String,
}

impl ExampleResponse {
    /// Creates a response, pretty-printing the body when it is JSON.
    pub fn new(status: u16, body: &str) -> Self {
        let body = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
            Err(_) => body.to_string(),
        };
        Self { status, body }
    }
}

/// Performs example calls.
pub trait ExampleClient {
    /// Sends the request and returns whatever the application answered.
    ///
    /// # Errors
    ///
    /// Returns an error when no response could be obtained at all. Error statuses
    /// are regular responses.
    fn call(&self, request: &ExampleRequest) -> crate::error::Result<ExampleResponse>;
}

/// Blocking HTTP implementation of [`ExampleClient`].
pub struct HttpExampleClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpExampleClient {
    pub fn new(base_url: &str, timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ExampleCallError {
                uri: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, uri: &str) -> String {
        format!("{}/{}", self.base_url, uri.trim_start_matches('/'))
    }
}

impl ExampleClient for HttpExampleClient {
    fn call(&self, request: &ExampleRequest) -> crate::error::Result<ExampleResponse> {
        let url = self.url(&request.uri);
        debug!("Calling {} {}", request.method, url);

        let failed = |message: String| Error::ExampleCallError {
            uri: request.uri.clone(),
            message,
        };

        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| failed(e.to_string()))?;

        let mut builder = self.client.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(|e| failed(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| failed(e.to_string()))?;

        debug!("{} {} answered {}", request.method, url, status);
        Ok(ExampleResponse::new(status, &body))
    }
}

/// Substitutes route bindings into a URI.
///
/// `{name}` and `{name?}` are replaced by the bound value; optional parameters without
/// a binding are dropped together with their leading slash. Required parameters
/// without a binding are left untouched.
pub fn apply_bindings(uri: &str, bindings: &BTreeMap<String, String>) -> String {
    let mut uri = uri.to_string();
    for (name, value) in bindings {
        uri = uri
            .replace(&format!("{{{}}}", name), value)
            .replace(&format!("{{{}?}}", name), value);
    }

    OPTIONAL_PARAMETER.replace_all(&uri, "").into_owned()
}
