//! `pinelint` — Pine Script v6 static analysis server entry point.
//!
//! Parses CLI flags, resolves a [`pinelint::config::PinelintConfig`] (TOML
//! file, then `PINELINT_*` env vars, then these flags), initializes
//! `tracing`, loads the preloaded documentation blob into a
//! `ReferenceIndex`, and hands off to `pinelint_server`'s newline-delimited
//! JSON-RPC stdio loop.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pinelint::config::{LogFormat, PinelintConfig};
use pinelint_core::reference::ReferenceIndex;
use pinelint_server::Dispatcher;

/// Pine Script v6 static analysis server, speaking newline-delimited
/// JSON-RPC over stdio.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a `pinelint.toml` configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preloaded documentation blob (overrides config/env).
    #[arg(long)]
    docs_path: Option<PathBuf>,

    /// Root directory file/directory review requests are confined to
    /// (overrides config/env).
    #[arg(long)]
    scan_root: Option<PathBuf>,

    /// Log output format: text or json (overrides config/env).
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Raise the tracing verbosity to debug regardless of `RUST_LOG`.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = PinelintConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    if let Some(docs_path) = args.docs_path {
        config.docs_path = docs_path;
    }
    if let Some(scan_root) = args.scan_root {
        config.scan_root = scan_root;
    }
    if let Some(log_format) = args.log_format {
        config.log_format = log_format;
    }

    init_tracing(config.log_format, args.verbose);

    let reference_index = load_reference_index(&config.docs_path)?;
    let limits = config.clone().into_dispatcher_limits();
    let dispatcher = Dispatcher::new(reference_index, limits);

    tracing::info!(scan_root = %config.scan_root.display(), "pinelint server starting");

    // A single-threaded current-thread runtime for the stdio loop
    //: `rayon`, not Tokio
    // multi-threading, provides the only parallelism in the process.
    pinelint_server::stdio::run_stdio(&dispatcher).await?;
    Ok(())
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}

/// Loads the preloaded documentation blob if present; an absent or
/// unreadable blob degrades to an empty reference index rather than
/// failing startup, since `reference_lookup` is a secondary tool and
/// `code_review` does not depend on it.
fn load_reference_index(path: &std::path::Path) -> Result<ReferenceIndex> {
    match pinelint_tools::load_reference_index(path) {
        Ok(index) => Ok(index),
        Err(pinelint_tools::ToolsError::Io { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::warn!(path = %path.display(), "documentation blob not found, reference_lookup will return no results");
            Ok(ReferenceIndex::from_entries(Vec::new()))
        }
        Err(e) => Err(e).context("failed to load documentation reference index"),
    }
}
