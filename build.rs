//! Build script for the task service crate
//!
//! Compiles the Protocol Buffer definition in `proto/task.proto` into tonic
//! server and client code. Generated code is written to `$OUT_DIR/task.rs` and
//! included from `src/grpc/proto.rs`; the encoded file descriptor set is written
//! alongside it for the reflection service.
//!
//! # Protocol Buffer Compiler
//!
//! A `PROTOC` environment variable pointing at a system `protoc` takes
//! precedence. Without one, the vendored compiler binary is used.

use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path()?;
        std::env::set_var("PROTOC", protoc);
    }

    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let proto_root = manifest_dir.join("proto");
    let proto_file = proto_root.join("task.proto");

    if !proto_file.exists() {
        return Err(format!("Proto file not found: {}", proto_file.display()).into());
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(PathBuf::from(std::env::var("OUT_DIR")?).join("task_descriptor.bin"))
        .emit_rerun_if_changed(true)
        .compile_protos(&[&proto_file], &[&proto_root])?;

    println!("cargo:rerun-if-changed={}", proto_file.display());

    Ok(())
}
