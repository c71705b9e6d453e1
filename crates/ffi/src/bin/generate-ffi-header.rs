//! Writes `include/cvwrapper.h` for the exported C functions.
//!
//! Usage: `cargo run -p facemark-ffi --features generate-header --bin generate-ffi-header [OUT]`

use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let output = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| crate_dir.join("include").join("cvwrapper.h"));

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("CVWRAPPER_H".to_string()),
        cpp_compat: true,
        autogen_warning: Some(
            "/* Generated by generate-ffi-header. Do not edit by hand. */".to_string(),
        ),
        ..Default::default()
    };

    if let Some(parent) = output.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error: cannot create {}: {e}", parent.display());
            process::exit(1);
        }
    }

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&output);
            println!("Wrote {}", output.display());
        }
        Err(e) => {
            eprintln!("Error: failed to generate header: {e}");
            process::exit(1);
        }
    }
}
