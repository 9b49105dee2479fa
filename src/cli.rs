// src/cli.rs
// =============================================================================
// This file defines the command-line interface using the `clap` crate.
//
// We use the derive API: the CLI structure is described by the structs and
// enums below and their #[...] attributes.
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "link-bundler",
    version,
    about = "Crawl index-of listings and group multi-file datasets into bundles",
    long_about = "link-bundler crawls a remote location (a file or a directory index) and \
                  groups the files it finds into downloadable bundles: a shapefile with its \
                  .shx/.dbf/.prj companions, a GeoTIFF with its overviews, and so on."
)]
pub struct Cli {
    /// TOML config file (crawl settings and extra format families)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a location and print its bundles
    ///
    /// Example: link-bundler crawl https://example.com/data/ --max-depth 2
    Crawl {
        /// File or directory index URL
        url: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Print the raw crawl tree as JSON instead of bundles
        #[arg(long, conflicts_with = "json")]
        tree: bool,

        /// Listing levels to descend into (overrides the config file)
        ///
        /// Depth 1 = just the starting listing
        /// Depth 2 = starting listing + its sub-directories
        #[arg(long)]
        max_depth: Option<usize>,

        /// Children probed concurrently per listing (overrides the config file)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Flatten a crawl tree saved as JSON
    ///
    /// Example: link-bundler flatten crawl.json
    Flatten {
        /// JSON file holding the crawl tree, or "-" for stdin
        input: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the known format families
    Formats {
        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crawl_with_overrides() {
        let cli = Cli::parse_from([
            "link-bundler",
            "crawl",
            "https://example.com/data/",
            "--max-depth",
            "2",
            "--json",
        ]);

        match cli.command {
            Commands::Crawl {
                url,
                json,
                tree,
                max_depth,
                concurrency,
            } => {
                assert_eq!(url, "https://example.com/data/");
                assert!(json);
                assert!(!tree);
                assert_eq!(max_depth, Some(2));
                assert_eq!(concurrency, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["link-bundler", "formats", "--config", "bundler.toml", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("bundler.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_tree_conflicts_with_json() {
        let result = Cli::try_parse_from(["link-bundler", "crawl", "http://x/", "--tree", "--json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
