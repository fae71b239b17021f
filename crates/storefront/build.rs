//! Hashes the compiled stylesheet so templates can link an immutable URL.

use std::env;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

const CSS_SOURCE: &str = "static/css/main.css";

fn main() {
    let manifest_dir: PathBuf = env::var_os("CARGO_MANIFEST_DIR")
        .expect("CARGO_MANIFEST_DIR must be set by Cargo")
        .into();
    let css_path = manifest_dir.join(CSS_SOURCE);

    println!("cargo:rerun-if-changed={}", css_path.display());

    let Ok(content) = fs::read(&css_path) else {
        // First build on a fresh checkout may run before assets exist
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short = &digest[..8];
    println!("cargo:rustc-env=CSS_HASH={short}");

    // Copy to static/css/derived/main.<hash>.css, the path templates link
    let derived = manifest_dir.join("static/css/derived");
    fs::create_dir_all(&derived).expect("failed to create derived CSS directory");
    fs::copy(&css_path, derived.join(format!("main.{short}.css")))
        .expect("failed to copy hashed CSS");
}
