// src/logging.rs
// =============================================================================
// Logging setup for the CLI.
//
// Logs go to stderr so `--json` output on stdout stays machine readable.
// RUST_LOG wins when set; otherwise `--verbose` picks debug over info.
// =============================================================================

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "link_bundler=debug" } else { "link_bundler=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // try_init so a second call (tests, embedding) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
