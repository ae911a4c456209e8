//! API documentation generator - command-line tool.
//!
//! Reads a route table exported by a web application, documents the selected routes
//! from their handler docblocks and example calls, and writes Markdown, an HTML page
//! and a Postman collection. Manual edits to the generated Markdown survive
//! regeneration unless `--force` is given.
//!
//! # Usage
//!
//! ```bash
//! apidoc-from-routes [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Document every route below `api/`:
//! ```bash
//! apidoc-from-routes routes.json --route-prefix 'api/*'
//! ```
//!
//! Document version `v1` of a versioned API without example calls:
//! ```bash
//! apidoc-from-routes routes.json --router versioned --route-prefix v1 --no-response-calls
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! apidoc-from-routes routes.json --routes users.index -v
//! ```

use anyhow::Result;
use apidoc_from_routes::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once for the verbose flag, validate after the logger is up
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("API documentation generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
