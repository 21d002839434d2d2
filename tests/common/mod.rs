//! Shared fixtures: a `Receipt` schema with its compiled descriptor set,
//! laid out on disk the way deployments ship it.
//!
//! The descriptor set is built programmatically with `prost-types` so the
//! tests need no protoc binary at runtime.

// Each test binary compiles its own copy; not all of them use every helper.
#![allow(dead_code)]

use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
};
use proto_extract::ExtractConfig;
use tempfile::TempDir;

/// The schema text the prompt embeds; mirrors the compiled descriptor below.
pub const RECEIPT_SCHEMA: &str = r#"syntax = "proto3";

package receipts;

message Receipt {
  double total = 1;
  repeated string items = 2;
}
"#;

/// `receipts.Receipt` as a compiled `FileDescriptorSet`.
pub fn receipt_descriptor_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("schemas/receipt.proto".into()),
            package: Some("receipts".into()),
            syntax: Some("proto3".into()),
            message_type: vec![DescriptorProto {
                name: Some("Receipt".into()),
                field: vec![
                    FieldDescriptorProto {
                        name: Some("total".into()),
                        number: Some(1),
                        label: Some(Label::Optional as i32),
                        r#type: Some(Type::Double as i32),
                        json_name: Some("total".into()),
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: Some("items".into()),
                        number: Some(2),
                        label: Some(Label::Repeated as i32),
                        r#type: Some(Type::String as i32),
                        json_name: Some("items".into()),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

/// A schema + descriptor tree rooted in a temp directory.
pub struct SchemaFixture {
    /// Keeps the directory alive for the test's duration.
    pub dir: TempDir,
    pub config: ExtractConfig,
    /// Ready-to-use `path:TypeName` reference string.
    pub reference: String,
}

/// Loose-tree layout: one `.binpb` per schema, mirroring the source tree.
pub fn loose_layout() -> SchemaFixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let schema_path = root.join("schemas/receipt.proto");
    std::fs::create_dir_all(schema_path.parent().unwrap()).unwrap();
    std::fs::write(&schema_path, RECEIPT_SCHEMA).unwrap();

    let descriptor_path = root.join("gen/schemas/receipt.binpb");
    std::fs::create_dir_all(descriptor_path.parent().unwrap()).unwrap();
    std::fs::write(&descriptor_path, receipt_descriptor_set().encode_to_vec()).unwrap();

    let config = ExtractConfig::builder()
        .schema_root(root)
        .gen_root(root.join("gen"))
        .build()
        .unwrap();
    let reference = format!("{}:Receipt", schema_path.display());

    SchemaFixture {
        dir,
        config,
        reference,
    }
}

/// Bundle layout: a single descriptor set covering every schema, no loose
/// per-schema files.
pub fn bundle_layout() -> SchemaFixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let schema_path = root.join("schemas/receipt.proto");
    std::fs::create_dir_all(schema_path.parent().unwrap()).unwrap();
    std::fs::write(&schema_path, RECEIPT_SCHEMA).unwrap();

    let gen = root.join("gen");
    std::fs::create_dir_all(&gen).unwrap();
    std::fs::write(
        gen.join("descriptors.binpb"),
        receipt_descriptor_set().encode_to_vec(),
    )
    .unwrap();

    let config = ExtractConfig::builder()
        .schema_root(root)
        .gen_root(gen)
        .build()
        .unwrap();
    let reference = format!("{}:Receipt", schema_path.display());

    SchemaFixture {
        dir,
        config,
        reference,
    }
}
