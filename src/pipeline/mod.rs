//! Pipeline stages for document-to-structured-output extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. add a provider) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! ingest ──▶ provider ──▶ coerce
//! (pages)    (vision LLM)  (JSON → message)
//! ```
//!
//! 1. [`ingest`]   — normalise a path or URL into a [`ingest::PageSet`];
//!    PDF rasterisation runs in `spawn_blocking` because pdfium is not
//!    async-safe
//! 2. [`provider`] — single best-effort call to the selected vision model;
//!    the only stage with provider network I/O
//! 3. [`coerce`]   — strip markdown fences, parse JSON, populate the
//!    resolved message type

pub mod coerce;
pub mod ingest;
pub mod provider;
