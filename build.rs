//! Build script for surge-sim
//!
//! Embeds git revision, build time, target and profile into the binary.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-changed=config/personas");

    let git_hash = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let git_dirty = match git(&["status", "--porcelain"]) {
        Some(out) if !out.is_empty() => "true",
        Some(_) => "false",
        None => "unknown",
    };
    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    println!("cargo:rustc-env=SURGE_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=SURGE_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=SURGE_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=SURGE_TARGET={}", env_or_unknown("TARGET"));
    println!("cargo:rustc-env=SURGE_PROFILE={}", env_or_unknown("PROFILE"));
}

/// Run a git command and return trimmed stdout on success
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn env_or_unknown(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| "unknown".to_string())
}
