// src/main.rs
// =============================================================================
// Entry point of the CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and load the config file
// 3. Dispatch to the subcommand handler
// 4. Exit with proper code (0 = bundles found, 1 = nothing found, 2 = error)
// =============================================================================

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use link_bundler::cli::{Cli, Commands};
use link_bundler::config::Config;
use link_bundler::formats::FormatRegistry;
use link_bundler::{crawl, logging, parse_tree, report, Flattener};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = at least one bundle
//   Ok(1) = the location held no files
//   Err   = anything went wrong
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = Config::load_or_default(cli.config.as_deref())?;
    let registry = config.registry()?;

    match cli.command {
        Commands::Crawl {
            url,
            json,
            tree,
            max_depth,
            concurrency,
        } => {
            let mut crawl_config = config.crawl.clone();
            if let Some(max_depth) = max_depth {
                crawl_config.max_depth = max_depth;
            }
            if let Some(concurrency) = concurrency {
                crawl_config.concurrency = concurrency;
            }

            let root = crawl::crawl(&url, &crawl_config)
                .await
                .with_context(|| format!("Failed to crawl {}", url))?;

            if tree {
                report::print_json(&root)?;
                return Ok(0);
            }
            handle_bundles(&root, &registry, json)
        }
        Commands::Flatten { input, json } => {
            let text = read_input(&input)?;
            match parse_tree(&text)? {
                Some(root) => handle_bundles(&root, &registry, json),
                None => {
                    info!("empty crawl document, nothing to flatten");
                    report::print_bundles(&[], json)?;
                    Ok(1)
                }
            }
        }
        Commands::Formats { json } => {
            report::print_families(registry.families(), json)?;
            Ok(0)
        }
    }
}

fn handle_bundles(root: &link_bundler::Node, registry: &FormatRegistry, json: bool) -> Result<i32> {
    let bundles = Flattener::new(registry).flatten(root);
    info!(url = %root.url(), bundles = bundles.len(), "flattened");

    report::print_bundles(&bundles, json)?;

    if bundles.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Reads the crawl document from a file, or stdin for "-".
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read crawl document from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read crawl document {}", path.display()))
}
