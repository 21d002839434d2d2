//! Schema references and runtime type resolution.
//!
//! A schema reference `path/to/receipt.proto:Receipt` names two things at
//! once: a human-readable `.proto` file whose text goes verbatim into the
//! prompt, and a compiled message type the model's JSON output is coerced
//! into. The text side is a plain file read. The type side maps the schema
//! path onto a pre-compiled `FileDescriptorSet` and looks the message up
//! through `prost-reflect`, which supplies the construct/parse/pack/unpack
//! operations a [`ResolvedType`] exposes.
//!
//! ## Compiled-schema layout
//!
//! Every schema source at `<schema_root>/P.proto` has a descriptor file at
//! `<gen_root>/P.binpb` — the same relative path, extension swapped. Two
//! deployment layouts are supported:
//!
//! * **Loose tree** — one `.binpb` per schema file, mirroring the source
//!   tree under `gen_root`.
//! * **Bundle** — a single `<gen_root>/descriptors.binpb` covering every
//!   schema, used when generated code ships as one artifact. Tried whenever
//!   the loose file is absent.
//!
//! Descriptors are re-read on every call. Extraction latency is dominated
//! by the provider round-trip, so the extra file read is noise, and schema
//! edits become visible without a process restart.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use prost::Message as _;
use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A parsed `path:TypeName` schema reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    /// Path to the `.proto` source file.
    pub path: PathBuf,
    /// Message type name declared in that file (short or full name).
    pub type_name: String,
}

impl SchemaReference {
    /// Parse a reference string, splitting on the first `:`.
    ///
    /// Fails with [`ExtractError::InvalidReference`] before any I/O occurs.
    pub fn parse(reference: &str) -> Result<Self, ExtractError> {
        let (path, type_name) =
            reference
                .split_once(':')
                .ok_or_else(|| ExtractError::InvalidReference {
                    reference: reference.to_string(),
                })?;
        if path.is_empty() || type_name.is_empty() {
            return Err(ExtractError::InvalidReference {
                reference: reference.to_string(),
            });
        }
        Ok(Self {
            path: PathBuf::from(path),
            type_name: type_name.to_string(),
        })
    }
}

/// A runtime handle to one compiled message type.
///
/// Wraps a `prost-reflect` [`MessageDescriptor`] and exposes the four
/// operations the pipeline needs: construct an empty instance, populate it
/// from JSON, pack it into a `google.protobuf.Any`, and unpack an `Any`
/// back into a named instance.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    descriptor: MessageDescriptor,
}

impl ResolvedType {
    /// Fully-qualified name of the message type, e.g. `receipts.Receipt`.
    pub fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    /// Construct an empty instance.
    pub fn new_instance(&self) -> DynamicMessage {
        DynamicMessage::new(self.descriptor.clone())
    }

    /// Populate a new instance from a parsed JSON value.
    ///
    /// Field mapping follows the protobuf JSON spec as enforced by
    /// `prost-reflect`: unknown fields and type mismatches are rejected.
    pub fn from_json(&self, json: serde_json::Value) -> Result<DynamicMessage, ExtractError> {
        DynamicMessage::deserialize(self.descriptor.clone(), json).map_err(|e| {
            ExtractError::Coercion {
                type_name: self.full_name().to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Pack an instance into a type-erased `google.protobuf.Any`.
    pub fn pack(&self, message: &DynamicMessage) -> prost_types::Any {
        prost_types::Any {
            type_url: format!("type.googleapis.com/{}", self.full_name()),
            value: message.encode_to_vec(),
        }
    }

    /// Unpack an `Any` produced by [`ResolvedType::pack`].
    ///
    /// Fails if the type tag does not name this type or the payload does not
    /// decode as it.
    pub fn unpack(&self, any: &prost_types::Any) -> Result<DynamicMessage, ExtractError> {
        let expected = self.full_name();
        let tagged = any.type_url.rsplit('/').next().unwrap_or(&any.type_url);
        if tagged != expected {
            return Err(ExtractError::Resolution {
                detail: format!("Any is tagged '{tagged}', expected '{expected}'"),
            });
        }
        DynamicMessage::decode(self.descriptor.clone(), any.value.as_slice()).map_err(|e| {
            ExtractError::Resolution {
                detail: format!("Any payload does not decode as '{expected}': {e}"),
            }
        })
    }
}

/// Read the schema text and resolve its compiled message type.
pub fn load_schema(
    reference: &SchemaReference,
    config: &ExtractConfig,
) -> Result<(String, ResolvedType), ExtractError> {
    let text = std::fs::read_to_string(&reference.path).map_err(|e| ExtractError::Io {
        path: reference.path.clone(),
        source: e,
    })?;
    let resolved = resolve_type(reference, config)?;
    Ok((text, resolved))
}

/// Locate the descriptor set for a schema path and look up the type.
pub fn resolve_type(
    reference: &SchemaReference,
    config: &ExtractConfig,
) -> Result<ResolvedType, ExtractError> {
    let descriptor_path = descriptor_path_for(&reference.path, config);

    let pool_bytes = if descriptor_path.exists() {
        debug!("Loading descriptor set: {}", descriptor_path.display());
        std::fs::read(&descriptor_path).map_err(|e| ExtractError::Io {
            path: descriptor_path.clone(),
            source: e,
        })?
    } else {
        // Bundle layout: one descriptor set covering all schemas.
        let bundle = config.gen_root.join(&config.descriptor_bundle);
        debug!(
            "No loose descriptor at {}, trying bundle {}",
            descriptor_path.display(),
            bundle.display()
        );
        std::fs::read(&bundle).map_err(|_| ExtractError::Resolution {
            detail: format!(
                "no descriptor set at '{}' and no bundle at '{}'",
                descriptor_path.display(),
                bundle.display()
            ),
        })?
    };

    let pool = DescriptorPool::decode(pool_bytes.as_slice()).map_err(|e| {
        ExtractError::Resolution {
            detail: format!("descriptor set is corrupt: {e}"),
        }
    })?;

    let descriptor = find_message(&pool, &reference.type_name).ok_or_else(|| {
        ExtractError::Resolution {
            detail: format!(
                "type '{}' not found in descriptors for '{}'",
                reference.type_name,
                reference.path.display()
            ),
        }
    })?;

    Ok(ResolvedType { descriptor })
}

/// Map a schema source path to its compiled descriptor path:
/// the same path relative to `schema_root`, re-rooted under `gen_root`,
/// with the extension replaced by `.binpb`.
fn descriptor_path_for(schema_path: &Path, config: &ExtractConfig) -> PathBuf {
    let relative = schema_path
        .strip_prefix(&config.schema_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| strip_root(schema_path));
    config.gen_root.join(relative.with_extension("binpb"))
}

/// Drop root/prefix components so an absolute path can be re-rooted.
fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}

/// Look a message up by full name first, then by short name.
///
/// References carry the type name as declared in the `.proto` file, which
/// is the short name; the pool indexes by package-qualified full name.
fn find_message(pool: &DescriptorPool, name: &str) -> Option<MessageDescriptor> {
    pool.get_message_by_name(name)
        .or_else(|| pool.all_messages().find(|m| m.name() == name))
}
