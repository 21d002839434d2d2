//! # proto-extract
//!
//! Extract structured data from documents using vision language models.
//!
//! Give it an image, a PDF, or a URL plus a protobuf schema reference
//! (`path/to/schema.proto:TypeName`) and it renders the document's pages,
//! asks a vision LLM for JSON matching the schema, and returns both the
//! JSON text and a populated instance of the compiled message type.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document (path / URL / PDF)          schema reference
//!  │                                    │
//!  ├─ 1. Ingest   pages as images       ├─ 2. Load   .proto text + compiled type
//!  │   (pdfium rasterisation for PDFs)  │   (FileDescriptorSet via prost-reflect)
//!  └──────────────┬─────────────────────┘
//!                 ├─ 3. Prompt  schema embedded in a fixed instruction template
//!                 ├─ 4. Model   one call to OpenAI or Anthropic (best-effort)
//!                 └─ 5. Coerce  fence-strip → JSON parse → typed message
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use proto_extract::{extract, ExtractConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider credentials come from OPENAI_API_KEY / ANTHROPIC_API_KEY.
//!     let config = ExtractConfig::default();
//!     let output = extract(
//!         "receipt.png",
//!         "schemas/receipt.proto:Receipt",
//!         "openai",
//!         &config,
//!     )
//!     .await?;
//!     println!("{}", output.json);
//!     println!("{:#?}", output.message);
//!     Ok(())
//! }
//! ```
//!
//! The same pipeline is reachable over gRPC: [`service::serve`] exposes a
//! single `ExtractData` operation on port 50051, returning the JSON plus
//! the typed instance packed as a `google.protobuf.Any` the requester
//! unpacks locally.
//!
//! ## Compiled schemas
//!
//! Every `.proto` referenced at runtime must have a compiled
//! `FileDescriptorSet` counterpart under the generated-code root — either
//! one `.binpb` per schema mirroring the source tree, or a single
//! `descriptors.binpb` bundle. Produce them with
//! `protoc --descriptor_set_out`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `extract`, `extract-server`, and `extract-client` binaries |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod schema;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractConfig, ExtractConfigBuilder};
pub use error::ExtractError;
pub use extract::{extract, ExtractionOutput};
pub use pipeline::ingest::PageSet;
pub use pipeline::provider::Provider;
pub use schema::{ResolvedType, SchemaReference};
