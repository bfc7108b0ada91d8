//! Generates `include/campaign_ffi.h` from the `extern "C"` surface.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let Ok(crate_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let include_dir = PathBuf::from(&crate_dir).join("include");
    if let Err(err) = std::fs::create_dir_all(&include_dir) {
        println!("cargo:warning=cannot create {}: {err}", include_dir.display());
        return;
    }

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("CAMPAIGN_FFI_H".to_string()),
        documentation: true,
        ..Default::default()
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(include_dir.join("campaign_ffi.h"));
        }
        Err(err) => println!("cargo:warning=C header not generated: {err}"),
    }
}
