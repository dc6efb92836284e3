//! Command implementations.

pub mod build;
pub mod clean;

use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};

use swift_addon::BuildConfig;

/// Load the JSON config file if one was given, else start from defaults.
pub fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
    match path {
        Some(p) => BuildConfig::from_file(p),
        None => Ok(BuildConfig::default()),
    }
}

/// Fold a `--napi` CLI value into its raw config shape.
///
/// Numeric input becomes a JSON number so it validates as a level; anything
/// else is passed through as a string (only "experimental" survives
/// validation).
pub fn napi_value(raw: &str) -> Value {
    match raw.parse::<u64>() {
        Ok(n) => json!(n),
        Err(_) => json!(raw),
    }
}

/// Default architecture for the host, in SwiftPM spelling.
pub fn host_arch() -> String {
    match std::env::consts::ARCH {
        "aarch64" => "arm64".to_string(),
        other => other.to_string(),
    }
}
