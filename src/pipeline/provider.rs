//! Model adapter: one best-effort vision call per extraction request.
//!
//! Two provider strategies sit behind the `edgequake-llm` [`LLMProvider`]
//! trait; selecting one is a per-call string choice, with no persistent
//! state. Each variant pins a fixed vision-capable model identifier —
//! extraction quality is part of this tool's contract, not a user knob.
//!
//! ## Best-effort policy
//!
//! Unlike every other pipeline stage, a provider failure here does NOT
//! propagate: auth errors, rate limits, and network faults are logged and
//! reported as an absent result. The provider is an external dependency the
//! caller may want to treat as recoverable; both current call sites treat
//! `None` as fatal, but that decision belongs to them, and nothing in this
//! module may panic the process. A *successful* call returning garbage is a
//! different matter — the coercer fails hard on that.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::pipeline::ingest::PageSet;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, error};

/// Fixed OpenAI vision model.
const OPENAI_MODEL: &str = "gpt-4o";

/// Fixed Anthropic vision model.
const ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";

/// The supported provider variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    /// Parse the wire/CLI provider name.
    pub fn parse(name: &str) -> Result<Self, ExtractError> {
        match name {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            _ => Err(ExtractError::UnknownProvider {
                name: name.to_string(),
            }),
        }
    }

    /// Canonical name, as accepted by [`Provider::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// The pinned model identifier for this provider.
    pub fn model_id(&self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_MODEL,
            Provider::Anthropic => ANTHROPIC_MODEL,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Send the prompt and page images to the selected provider.
///
/// Returns the raw model text, or `None` if the provider could not be
/// created or the call failed for any reason. Errors are logged here; the
/// caller only decides whether absence is fatal.
///
/// A single user message carries the prompt text followed by one base64
/// image attachment per page, each tagged with the page set's shared MIME
/// type. Zero pages produce a text-only request — an empty PDF must still
/// get a well-formed call.
pub async fn run_model(
    provider: Provider,
    pages: &PageSet,
    prompt: &str,
    config: &ExtractConfig,
) -> Option<String> {
    // Provider clients are created per request: construction is cheap
    // (credentials from the environment) and per-request instances keep the
    // pipeline free of shared mutable state.
    let client = match create_client(provider) {
        Ok(c) => c,
        Err(e) => {
            error!("Provider '{}' is not available: {}", provider, e);
            return None;
        }
    };

    let images: Vec<ImageData> = pages
        .pages()
        .iter()
        .map(|bytes| ImageData::new(STANDARD.encode(bytes), pages.mime_type()))
        .collect();

    debug!(
        "Calling {} ({}) with {} image(s), encoding '{}'",
        provider,
        provider.model_id(),
        images.len(),
        pages.encoding()
    );

    let messages = vec![ChatMessage::user_with_images(prompt, images)];

    let options = CompletionOptions {
        max_tokens: Some(config.max_output_tokens),
        ..Default::default()
    };

    match client.chat(&messages, Some(&options)).await {
        Ok(response) => {
            debug!(
                "{} replied: {} tokens in / {} out",
                provider, response.prompt_tokens, response.completion_tokens
            );
            Some(response.content)
        }
        Err(e) => {
            error!("An error occurred during {} API call: {}", provider, e);
            None
        }
    }
}

/// Instantiate the provider client for one request.
fn create_client(provider: Provider) -> Result<Arc<dyn LLMProvider>, ExtractError> {
    ProviderFactory::create_llm_provider(provider.name(), provider.model_id()).map_err(|e| {
        ExtractError::ProviderFailed {
            provider: format!("{provider}: {e}"),
        }
    })
}
