//! gRPC client binary: send one ExtractData request and print both results.
//!
//! The server returns the typed instance as a `google.protobuf.Any`; the
//! client knows the target type (it supplied the schema reference), so it
//! resolves the same type locally and unpacks the payload by expected tag.

use anyhow::{bail, Context, Result};
use clap::Parser;
use proto_extract::service::pb::extract_service_client::ExtractServiceClient;
use proto_extract::service::pb::ExtractRequest;
use proto_extract::{schema, ExtractConfig, SchemaReference};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Client for ExtractService.
#[derive(Parser, Debug)]
#[command(
    name = "extract-client",
    version,
    about = "Send one extraction request to a running extract-server"
)]
struct Cli {
    /// Server endpoint.
    #[arg(long, env = "EXTRACT_ADDR", default_value = "http://localhost:50051")]
    addr: String,

    /// Path or URL of the document, as seen by the server.
    #[arg(long)]
    file_path: String,

    /// Schema reference: "path/to/schema.proto:TypeName".
    #[arg(long)]
    proto_schema: String,

    /// Model provider to use for extraction.
    #[arg(long, value_enum, default_value = "openai")]
    model: ModelArg,

    /// Root of the local pre-compiled descriptor tree (for unpacking).
    #[arg(long, env = "EXTRACT_GEN_ROOT", default_value = "gen")]
    gen_root: PathBuf,

    /// Root under which schema source paths are interpreted.
    #[arg(long, env = "EXTRACT_SCHEMA_ROOT", default_value = ".")]
    schema_root: PathBuf,
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

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut client = ExtractServiceClient::connect(cli.addr.clone())
        .await
        .with_context(|| format!("Failed to connect to {}", cli.addr))?;

    let response = client
        .extract_data(ExtractRequest {
            file_path: cli.file_path.clone(),
            proto_schema: cli.proto_schema.clone(),
            model: cli.model.as_str().to_string(),
        })
        .await
        .context("ExtractData call failed")?
        .into_inner();

    println!("JSON Result:");
    println!("{}", response.json_result);

    let Some(any) = response.proto_instance else {
        bail!("Server response carried no proto instance");
    };

    // Resolve the same type locally to unpack the Any by expected tag.
    let config = ExtractConfig::builder()
        .gen_root(cli.gen_root.clone())
        .schema_root(cli.schema_root.clone())
        .build()
        .context("Invalid configuration")?;
    let reference =
        SchemaReference::parse(&cli.proto_schema).context("Invalid schema reference")?;
    let resolved =
        schema::resolve_type(&reference, &config).context("Failed to resolve schema type")?;

    let message = resolved
        .unpack(&any)
        .context("Failed to unpack proto instance")?;

    println!("Proto instance ({}):", resolved.full_name());
    println!("{:#?}", message);

    Ok(())
}
