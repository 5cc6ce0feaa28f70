//! Build settings the crate relies on

use std::path::Path;

fn manifest() -> toml::Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let text = std::fs::read_to_string(path).unwrap();
    toml::from_str(&text).unwrap()
}

#[test]
fn test_unwrap_lint_is_enabled() {
    let manifest = manifest();
    assert_eq!(manifest["lints"]["clippy"]["unwrap_used"].as_str(), Some("warn"));

    let clippy = std::fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join("clippy.toml")).unwrap();
    let clippy: toml::Value = toml::from_str(&clippy).unwrap();
    assert_eq!(clippy["allow-unwrap-in-tests"].as_bool(), Some(true));
}

#[test]
fn test_release_profile() {
    let manifest = manifest();
    let release = &manifest["profile"]["release"];
    assert_eq!(release["lto"].as_bool(), Some(true));
    assert_eq!(release["codegen-units"].as_integer(), Some(1));
}
