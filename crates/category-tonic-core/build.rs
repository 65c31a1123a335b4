/// Builds the gRPC client and server code for `category.proto` using
/// `tonic-prost-build`.
///
/// Alongside the generated modules, an encoded `FileDescriptorSet` is written
/// to `OUT_DIR/category_descriptor.bin` so the server can register the schema
/// with the gRPC reflection service.
///
/// # Files and Paths
///
/// - Proto file: `proto/category.proto`
/// - Includes: `proto/`
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("category");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let descriptor_path = out_dir.join("category_descriptor.bin");

    println!("cargo:rerun-if-changed=proto/category.proto");

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&["proto/category.proto"], &["proto"])?;

    Ok(())
}
