//! Error types for the proto-extract library.
//!
//! Every pipeline failure is fatal to its request and propagates to the
//! transport boundary as an [`ExtractError`]; there is no internal retry or
//! recovery anywhere in the pipeline. The one deliberate exception is the
//! model provider: the adapter in [`crate::pipeline::provider`] swallows
//! provider failures into an absent result, and the call site turns that
//! absence into [`ExtractError::ProviderFailed`]. A provider outage is an
//! external-dependency problem; a provider reply that is not valid JSON is a
//! contract violation and keeps its own variant ([`ExtractError::Parse`]).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Schema reference string is not of the form `path:TypeName`.
    #[error("Invalid schema reference '{reference}': expected 'path/to/schema.proto:TypeName'")]
    InvalidReference { reference: String },

    /// A local file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote document could not be fetched.
    #[error("Failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// The input PDF could not be opened or rasterised.
    #[error("Failed to decode '{path}': {detail}")]
    Decode { path: PathBuf, detail: String },

    // ── Schema errors ─────────────────────────────────────────────────────
    /// The compiled descriptor set or the named type within it is missing.
    #[error("Failed to resolve schema type: {detail}")]
    Resolution { detail: String },

    // ── Model-output errors ───────────────────────────────────────────────
    /// The named provider is not one of the supported variants.
    #[error("Unknown model provider '{name}': expected 'openai' or 'anthropic'")]
    UnknownProvider { name: String },

    /// The provider call produced no result (auth, rate limit, network…).
    /// Details were already logged by the adapter.
    #[error("Model provider '{provider}' returned no result")]
    ProviderFailed { provider: String },

    /// The model's reply is not valid JSON even after fence stripping.
    #[error("Model output is not valid JSON: {detail}")]
    Parse { detail: String },

    /// The JSON parsed but cannot populate the target message type.
    #[error("JSON does not match message type '{type_name}': {detail}")]
    Coercion { type_name: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
