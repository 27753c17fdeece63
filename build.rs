use std::path::Path;
use std::process::Command;

fn main() {
    let profile = match std::env::var("PROFILE").as_deref() {
        Ok("release") => "release",
        _ => "development",
    };

    println!("cargo:rustc-env=PIXELVEIL_VERSION={}", package_version());
    println!("cargo:rustc-env=PIXELVEIL_PROFILE={}", profile);
    println!("cargo:rustc-env=PIXELVEIL_GIT_HASH={}", git_hash());

    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-env-changed=PROFILE");
}

/// A VERSION file next to the manifest overrides the crate version.
fn package_version() -> String {
    let manifest = env!("CARGO_PKG_VERSION").to_string();
    let path = Path::new("VERSION");
    if !path.exists() {
        return manifest;
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or(manifest)
}

fn git_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
