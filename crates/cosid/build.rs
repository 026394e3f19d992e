fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Vendored protoc, no system install required
    let protoc_path = protoc_bin_vendored::protoc_bin_path()?;
    unsafe {
        std::env::set_var("PROTOC", protoc_path);
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/cosi.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/cosi.proto");
    Ok(())
}
