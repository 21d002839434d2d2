//! Generates the tonic service stubs for `proto/extract_service.proto`.
//!
//! Uses the vendored protoc so the build needs no system protobuf install.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc = protoc_bin_vendored::protoc_bin_path()?;
    std::env::set_var("PROTOC", protoc);

    let includes = [
        std::path::PathBuf::from("proto"),
        protoc_bin_vendored::include_path()?,
    ];

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/extract_service.proto"], &includes)?;

    println!("cargo:rerun-if-changed=proto/extract_service.proto");
    Ok(())
}
