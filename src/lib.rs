//! API documentation generator - documentation from a web application's route table.
//!
//! The application exports its registered routes together with the docblocks of their
//! handlers. This library selects the routes to document, captures example responses
//! by calling the running application (optionally as an impersonated user), and renders
//! Markdown, an HTML page and a Postman collection.
//!
//! # Router Flavors
//!
//! - **Standard**: every registered route, optional global URI prefix, selection required
//! - **Versioned**: routes of one API version, an empty allowlist selects them all
//!
//! # Architecture
//!
//! 1. [`manifest`] - Loads the route table and handler documentation
//! 2. [`docblock`] / [`metadata`] - Reads titles, descriptions, parameters and groups
//! 3. [`filter`] - Selection criteria and validity checks
//! 4. [`router`] - Router flavors and the documented route model
//! 5. [`processor`] - Turns selected routes into descriptors, capturing examples
//! 6. [`impersonation`] / [`client`] - Authenticated example calls
//! 7. [`merge`] - Keeps manual edits of previously generated documentation
//! 8. [`renderer`] - Markdown and HTML output
//! 9. [`collection`] / [`serializer`] - Postman collection export
//!
//! # Example Usage
//!
//! ```no_run
//! use apidoc_from_routes::{
//!     filter::SelectionCriteria,
//!     manifest::RouteTable,
//!     merge::MergeEngine,
//!     processor::{ProcessOptions, RouteProcessor},
//!     renderer::{group_routes, OutputPaths, RenderOptions, Renderer},
//!     router::standard::StandardRouter,
//! };
//! use std::path::Path;
//!
//! let table = RouteTable::load(Path::new("routes.json")).unwrap();
//! let criteria = SelectionCriteria {
//!     route_prefix: Some("api/*".to_string()),
//!     ..Default::default()
//! };
//!
//! let options = ProcessOptions { with_response: false, ..Default::default() };
//! let mut processor = RouteProcessor::new(&table, options);
//! let outcome = processor.process(&StandardRouter::default(), &table, &criteria).unwrap();
//!
//! let mut groups = group_routes(outcome.routes);
//! let renderer = Renderer::new(RenderOptions {
//!     base_url: "http://localhost".to_string(),
//!     show_collection_link: false,
//! })
//! .unwrap();
//! renderer
//!     .write_markdown(&OutputPaths::new("public/docs"), &mut groups, MergeEngine::default())
//!     .unwrap();
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod client;
pub mod collection;
pub mod config;
pub mod docblock;
pub mod error;
pub mod filter;
pub mod impersonation;
pub mod manifest;
pub mod merge;
pub mod metadata;
pub mod processor;
pub mod renderer;
pub mod router;
pub mod serializer;
