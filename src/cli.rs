use crate::client::{ExampleClient, HttpExampleClient};
use crate::collection::CollectionExporter;
use crate::config::{parse_bindings, parse_headers, Config};
use crate::filter::SelectionCriteria;
use crate::impersonation::{AuthGuard, HttpAuthGuard, Impersonator};
use crate::manifest::RouteTable;
use crate::merge::MergeEngine;
use crate::processor::{ProcessOptions, RouteProcessor};
use crate::renderer::{group_routes, OutputPaths, RenderOptions, Renderer, DEFAULT_TITLE};
use crate::router::standard::StandardRouter;
use crate::router::versioned::VersionedRouter;
use crate::router::RouterFlavor;
use crate::serializer::{serialize_json, write_to_file};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// API documentation generator - Markdown, HTML and a Postman collection from a route table
#[derive(Parser, Debug)]
#[command(name = "apidoc-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route table exported by the application (JSON or YAML)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output directory of the documentation
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "public/docs")]
    pub output_dir: PathBuf,

    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Prefix prepended to every documented URI (standard router)
    #[arg(long = "uri-prefix", value_name = "PREFIX")]
    pub uri_prefix: Option<String>,

    /// Document routes whose URI matches this pattern (versioned router: the API version)
    #[arg(long = "route-prefix", value_name = "GLOB")]
    pub route_prefix: Option<String>,

    /// Document the route with this name (repeatable)
    #[arg(long = "routes", value_name = "NAME")]
    pub routes: Vec<String>,

    /// Document routes carrying this middleware
    #[arg(long = "middleware", value_name = "NAME")]
    pub middleware: Option<String>,

    /// Do not call routes to capture example responses
    #[arg(long = "no-response-calls")]
    pub no_response_calls: bool,

    /// Do not write the Postman collection
    #[arg(long = "no-postman-collection")]
    pub no_postman_collection: bool,

    /// Impersonate this user for routes without an explicit user mapping
    #[arg(long = "act-as-user-id", value_name = "ID")]
    pub act_as_user_id: Option<u64>,

    /// Router flavor the route table comes from
    #[arg(long = "router", value_enum, default_value = "standard")]
    pub router: RouterKind,

    /// Overwrite manually edited documentation
    #[arg(long = "force")]
    pub force: bool,

    /// Route parameter bindings for example calls, as `name,value|name,value`
    #[arg(long = "bindings", value_name = "LIST")]
    pub bindings: Option<String>,

    /// Extra header sent with every example call, as `Name: value`
    #[arg(long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Supported router flavors
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RouterKind {
    /// Application router with optional URI prefix
    Standard,
    /// Versioned API router
    Versioned,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documented: usize,
    pub skipped: usize,
    pub preserved: usize,
    pub discarded: usize,
    pub collection_written: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Route manifest does not exist: {}",
            args.manifest_path.display()
        );
    }

    if !args.manifest_path.is_file() {
        anyhow::bail!(
            "Route manifest is not a file: {}",
            args.manifest_path.display()
        );
    }

    if let Some(ref config) = args.config_path {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
    }

    if args.uri_prefix.is_some() && args.router == RouterKind::Versioned {
        warn!("--uri-prefix only applies to the standard router and will be ignored");
    }

    info!("Route manifest: {}", args.manifest_path.display());
    info!("Output directory: {}", args.output_dir.display());
    info!("Router: {:?}", args.router);
    if args.no_response_calls {
        info!("Example calls: disabled");
    }
    if args.force {
        info!("Manual changes will be overwritten");
    }

    Ok(args)
}

impl CliArgs {
    fn criteria(&self) -> SelectionCriteria {
        SelectionCriteria {
            routes: self.routes.clone(),
            route_prefix: self.route_prefix.clone(),
            middleware: self.middleware.clone(),
        }
    }

    fn flavor(&self) -> Box<dyn RouterFlavor> {
        match self.router {
            RouterKind::Standard => Box::new(StandardRouter::new(self.uri_prefix.clone())),
            RouterKind::Versioned => Box::new(VersionedRouter),
        }
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting documentation generation...");

    // Step 1: Load configuration and route table
    let config = Config::load(args.config_path.as_deref())?;
    info!("Loading route manifest...");
    let table = RouteTable::load(&args.manifest_path)?;
    info!("Found {} routes", table.routes.len());

    // Step 2: Set up the collaborators of example calls
    let client = if args.no_response_calls {
        None
    } else {
        Some(HttpExampleClient::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?)
    };
    let guard = HttpAuthGuard::new(&config)?;

    let summary = generate(
        &args,
        &config,
        &table,
        client.as_ref().map(|c| c as &dyn ExampleClient),
        &guard,
    )?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes documented: {}", summary.documented);
    info!("  - Routes skipped: {}", summary.skipped);
    info!("  - Manual changes kept: {}", summary.preserved);
    if summary.discarded > 0 {
        info!("  - Manual changes discarded: {}", summary.discarded);
    }
    info!("  - Postman collection: {}", if summary.collection_written { "written" } else { "skipped" });

    Ok(())
}

/// Generates the documentation of an already loaded route table.
///
/// Nothing is written when the selection criteria are rejected.
pub fn generate(
    args: &CliArgs,
    config: &Config,
    table: &RouteTable,
    client: Option<&dyn ExampleClient>,
    guard: &dyn AuthGuard,
) -> Result<RunSummary> {
    let paths = OutputPaths::new(&args.output_dir);

    // Step 3: Select and process routes
    info!("Processing routes...");
    let options = ProcessOptions {
        with_response: !args.no_response_calls,
        bindings: parse_bindings(args.bindings.as_deref()),
        headers: parse_headers(&args.headers),
        token_header: config.auth.token_header.clone(),
    };

    let mut processor = RouteProcessor::new(table, options.clone());
    if let Some(client) = client {
        processor = processor
            .with_client(client)
            .with_impersonator(Impersonator::new(guard, config, args.act_as_user_id));
    }

    let flavor = args.flavor();
    let outcome = processor.process(flavor.as_ref(), table, &args.criteria())?;
    info!(
        "Processed {} routes, skipped {}",
        outcome.routes.len(),
        outcome.skipped.len()
    );

    if outcome.routes.is_empty() {
        warn!("No routes were selected for documentation");
    }

    // Step 4: Render and merge the Markdown documentation
    info!("Writing documentation...");
    let mut groups = group_routes(outcome.routes);
    let renderer = Renderer::new(RenderOptions {
        base_url: config.public_url().to_string(),
        show_collection_link: !args.no_postman_collection,
    })?;
    let report = renderer.write_markdown(&paths, &mut groups, MergeEngine::new(args.force))?;

    // Step 5: HTML page
    renderer.write_html(&paths)?;

    // Step 6: Postman collection
    if !args.no_postman_collection {
        info!("Generating Postman collection...");
        let collection = CollectionExporter::new(DEFAULT_TITLE, config.public_url())
            .with_headers(options.headers)
            .export(&groups);
        write_to_file(&serialize_json(&collection)?, &paths.collection())?;
        info!("Wrote collection.json to: {}", paths.root.display());
    }

    Ok(RunSummary {
        documented: groups.iter().map(|g| g.routes.len()).sum(),
        skipped: outcome.skipped.len(),
        preserved: report.preserved.len(),
        discarded: report.discarded.len(),
        collection_written: !args.no_postman_collection,
    })
}
