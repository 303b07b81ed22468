//! # momentz
//!
//! Command-line front end for the Momentz photo-sharing service. Each
//! invocation restores the saved session, performs one action through the
//! client coordinator, and prints the result.

mod args;
mod run;

use anyhow::anyhow;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use momentz_client::config::normalize_base_url;
use momentz_client::{Client, ClientConfig};

use crate::args::Args;

const DEFAULT_LOG_FILTER: &str = "momentz_client=debug,momentz_media=info,momentz_store=info,warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = &args.api_url {
        config.api_url =
            normalize_base_url(url).ok_or_else(|| anyhow!("Invalid --api-url: {url}"))?;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    debug!(?config, "Loaded configuration");

    let mut client = Client::open(config)?;
    run::run(&mut client, args.command).await
}
