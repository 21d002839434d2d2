//! The extraction pipeline entry point, shared by both transport
//! front-ends.
//!
//! One call runs the whole pipeline for one request: ingest the document
//! and load the schema (independent inputs, awaited together), build the
//! prompt, make a single model call, coerce the reply. Everything the run
//! touches is request-local; concurrent extractions never share state
//! beyond the filesystem and the provider's HTTP endpoint.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::pipeline::{coerce, ingest, provider};
use crate::prompt;
use crate::schema::{self, ResolvedType, SchemaReference};
use prost_reflect::DynamicMessage;
use std::time::Instant;
use tracing::{debug, info};

/// The result of one extraction: the model's JSON (fence-stripped) and the
/// same data populated into the requested message type.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    /// Bare JSON text as returned by the model.
    pub json: String,
    /// The typed instance the JSON was coerced into.
    pub message: DynamicMessage,
    /// Handle to the message's type, for packing/unpacking across the wire.
    pub resolved: ResolvedType,
}

/// Run the full pipeline for one (file, schema reference, provider) triple.
///
/// # Errors
///
/// Any pipeline failure is fatal to the request; see [`ExtractError`] for
/// the taxonomy. The reference string is validated before any I/O.
pub async fn extract(
    file_path: &str,
    schema_reference: &str,
    provider_name: &str,
    config: &ExtractConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let start = Instant::now();

    // Input validation first: a malformed reference or provider name must
    // fail before any file or network I/O.
    let reference = SchemaReference::parse(schema_reference)?;
    let selected = provider::Provider::parse(provider_name)?;

    info!(
        "Extracting '{}' as {} via {}",
        file_path, reference.type_name, selected
    );

    // Document ingestion and schema loading have no ordering dependency.
    let (pages, (schema_text, resolved)) = tokio::try_join!(
        ingest::ingest(file_path, config),
        load_schema(&reference, config),
    )?;

    debug!(
        "Ingested {} page(s) ({}), schema '{}' resolved to {}",
        pages.len(),
        pages.encoding(),
        reference.path.display(),
        resolved.full_name()
    );

    let prompt_text = prompt::build_prompt(&schema_text);

    let raw = provider::run_model(selected, &pages, &prompt_text, config)
        .await
        .ok_or_else(|| ExtractError::ProviderFailed {
            provider: selected.name().to_string(),
        })?;

    let (json, message) = coerce::coerce(&raw, &resolved)?;

    info!(
        "Extraction complete: {} in {}ms",
        resolved.full_name(),
        start.elapsed().as_millis()
    );

    Ok(ExtractionOutput {
        json,
        message,
        resolved,
    })
}

/// Async shim over the synchronous schema loader so it can be joined with
/// ingestion.
async fn load_schema(
    reference: &SchemaReference,
    config: &ExtractConfig,
) -> Result<(String, ResolvedType), ExtractError> {
    schema::load_schema(reference, config)
}
