//! Configuration for the extraction pipeline and service.
//!
//! All behaviour is controlled through [`ExtractConfig`], built via its
//! [`ExtractConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config between the CLI and the gRPC service and to
//! diff two runs to understand why their outputs differ.

use crate::error::ExtractError;
use std::path::PathBuf;

/// Configuration for an extraction run.
///
/// Built via [`ExtractConfig::builder()`] or [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use proto_extract::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .gen_root("gen")
///     .concurrency(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Root under which schema source paths are interpreted. Default: `"."`.
    ///
    /// A schema path inside a reference is made relative to this root before
    /// being mapped into `gen_root`; absolute paths outside the root fall
    /// back to stripping their filesystem root.
    pub schema_root: PathBuf,

    /// Root of the pre-compiled descriptor tree. Default: `"gen"`.
    ///
    /// For a schema at `<schema_root>/protos/receipt.proto` the loader looks
    /// for `<gen_root>/protos/receipt.binpb` (a serialized
    /// `FileDescriptorSet`), falling back to the bundle file below.
    pub gen_root: PathBuf,

    /// File name of the single bundled descriptor set inside `gen_root`,
    /// used when no per-schema descriptor file exists. Default:
    /// `"descriptors.binpb"`.
    ///
    /// The bundle layout ships one `FileDescriptorSet` covering every schema,
    /// which is how packaged deployments (one artifact, no loose tree)
    /// distribute generated code.
    pub descriptor_bundle: String,

    /// Linear scale factor for PDF page rasterisation. Default: 2.0.
    ///
    /// Rendering at 2× keeps small print legible to the vision model; 1× is
    /// frequently too coarse for receipts and dense forms.
    pub render_scale: f32,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// Applied where the provider API requires an explicit bound
    /// (Anthropic's messages API); generous enough for any single JSON
    /// object a document-sized schema can describe.
    pub max_output_tokens: usize,

    /// Maximum concurrent requests the gRPC service will process. Default: 10.
    ///
    /// Extraction latency is dominated by the provider call (seconds), so a
    /// small bounded pool keeps memory and provider rate-limit pressure
    /// predictable while still overlapping network waits.
    pub concurrency: usize,

    /// TCP port the gRPC service binds. Default: 50051.
    pub port: u16,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            schema_root: PathBuf::from("."),
            gen_root: PathBuf::from("gen"),
            descriptor_bundle: "descriptors.binpb".to_string(),
            render_scale: 2.0,
            download_timeout_secs: 120,
            max_output_tokens: 4096,
            concurrency: 10,
            port: 50051,
        }
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn schema_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.schema_root = root.into();
        self
    }

    pub fn gen_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.gen_root = root.into();
        self
    }

    pub fn descriptor_bundle(mut self, name: impl Into<String>) -> Self {
        self.config.descriptor_bundle = name.into();
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ExtractError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if !(c.render_scale > 0.0) {
            return Err(ExtractError::InvalidConfig(format!(
                "Render scale must be positive, got {}",
                c.render_scale
            )));
        }
        if c.max_output_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
