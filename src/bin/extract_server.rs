//! gRPC server binary for the extraction service.

use anyhow::{Context, Result};
use clap::Parser;
use proto_extract::{service, ExtractConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Serve ExtractService.ExtractData over plaintext gRPC.
#[derive(Parser, Debug)]
#[command(
    name = "extract-server",
    version,
    about = "gRPC service exposing the document extraction pipeline"
)]
struct Cli {
    /// TCP port to bind.
    #[arg(long, env = "EXTRACT_PORT", default_value_t = 50051)]
    port: u16,

    /// Maximum number of concurrently processed requests.
    #[arg(long, env = "EXTRACT_CONCURRENCY", default_value_t = 10)]
    concurrency: usize,

    /// Root of the pre-compiled descriptor tree.
    #[arg(long, env = "EXTRACT_GEN_ROOT", default_value = "gen")]
    gen_root: PathBuf,

    /// Root under which schema source paths are interpreted.
    #[arg(long, env = "EXTRACT_SCHEMA_ROOT", default_value = ".")]
    schema_root: PathBuf,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXTRACT_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ExtractConfig::builder()
        .gen_root(cli.gen_root.clone())
        .schema_root(cli.schema_root.clone())
        .concurrency(cli.concurrency)
        .port(cli.port)
        .build()
        .context("Invalid configuration")?;

    let addr: SocketAddr = format!("[::]:{}", config.port)
        .parse()
        .context("Invalid bind address")?;

    service::serve(addr, config)
        .await
        .context("Server terminated with an error")?;

    Ok(())
}
