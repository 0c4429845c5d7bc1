//! Build script for the site crate.
//!
//! Fingerprints the stylesheet so pages can reference
//! `/static/css/main.css?v=<hash>` and browsers pick up new styles on deploy.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = match fs::read(&css_path) {
        Ok(content) => short_hash(&content),
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            String::from("dev")
        }
    };

    println!("cargo:rustc-env=CSS_HASH={hash}");
}

/// First 8 hex chars of the SHA-256 digest.
fn short_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest.iter().take(4).map(|b| format!("{b:02x}")).collect()
}
