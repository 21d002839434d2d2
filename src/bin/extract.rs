//! CLI binary: run the extraction pipeline once and print both results.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractConfig` and prints the JSON plus the decoded typed instance.

use anyhow::{Context, Result};
use clap::Parser;
use proto_extract::{extract, ExtractConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Extract structured protobuf data from an image, PDF, or URL.
#[derive(Parser, Debug)]
#[command(
    name = "extract",
    version,
    about = "Extract structured protobuf data from documents using vision LLMs",
    long_about = "Renders a document's pages as images, sends them with a schema-derived \
prompt to a vision LLM (OpenAI or Anthropic), and parses the JSON reply into the \
referenced protobuf message type.",
    arg_required_else_help = true
)]
struct Cli {
    /// Path to the document (image or PDF), or a URL to download from.
    #[arg(long)]
    file_path: String,

    /// Schema reference: "path/to/schema.proto:TypeName".
    #[arg(long)]
    proto_schema: String,

    /// Model provider to use for extraction.
    #[arg(long, value_enum, default_value = "openai")]
    model: ModelArg,

    /// Root of the pre-compiled descriptor tree.
    #[arg(long, env = "EXTRACT_GEN_ROOT", default_value = "gen")]
    gen_root: PathBuf,

    /// Root under which schema source paths are interpreted.
    #[arg(long, env = "EXTRACT_SCHEMA_ROOT", default_value = ".")]
    schema_root: PathBuf,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "EXTRACT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXTRACT_VERBOSE")]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModelArg {
    Openai,
    Anthropic,
}

impl ModelArg {
    fn as_str(self) -> &'static str {
        match self {
            ModelArg::Openai => "openai",
            ModelArg::Anthropic => "anthropic",
        }
    }
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
        .download_timeout_secs(cli.download_timeout)
        .build()
        .context("Invalid configuration")?;

    let output = extract(
        &cli.file_path,
        &cli.proto_schema,
        cli.model.as_str(),
        &config,
    )
    .await
    .context("Extraction failed")?;

    println!("Extracted JSON:");
    println!("{}", output.json);
    println!("Proto instance ({}):", output.resolved.full_name());
    println!("{:#?}", output.message);

    Ok(())
}
