//! Result coercion: raw model text → validated JSON → typed message.
//!
//! The prompt demands bare JSON, but fence-wrapped replies
//! (```` ```json … ``` ````) are near-universal model behaviour and are
//! tolerated here rather than fought in the prompt. Past the fence strip
//! there is no leniency: text that is not valid JSON is a hard
//! [`ExtractError::Parse`], and valid JSON that cannot populate the target
//! type is a hard [`ExtractError::Coercion`]. A provider that *succeeded*
//! and returned garbage has violated the contract; silently papering over
//! that would hand callers a half-filled message.

use crate::error::ExtractError;
use crate::schema::ResolvedType;
use once_cell::sync::Lazy;
use prost_reflect::DynamicMessage;
use regex::Regex;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Strip one outer Markdown code fence (```` ```json … ``` ```` or bare
/// ```` ``` … ``` ````) plus surrounding whitespace.
///
/// Idempotent: already-bare JSON passes through unchanged.
pub fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(caps) = RE_OUTER_FENCES.captures(trimmed) {
        caps[1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse the model's raw reply and populate an instance of `target`.
///
/// Returns the stripped JSON alongside the typed message so the transport
/// boundary can hand back both representations.
pub fn coerce(
    raw: &str,
    target: &ResolvedType,
) -> Result<(String, DynamicMessage), ExtractError> {
    let json = strip_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| ExtractError::Parse {
            detail: e.to_string(),
        })?;

    let message = target.from_json(value)?;
    Ok((json, message))
}
