//! Raw build configuration.
//!
//! The configuration surface is deliberately loose: it originates from a JSON
//! file (or CLI overrides folded into one), and several fields accept more
//! than one shape: flag groups are a single space-delimited string or an
//! array of tokens, `napi` is an integer level or the sentinel string
//! `"experimental"`. Fields are kept as raw [`serde_json::Value`]s here and
//! validated exactly once, in [`crate::plan::resolve`], so the rest of the
//! pipeline only ever sees typed data.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::BuildError;

/// User-supplied build configuration, prior to validation.
///
/// Every field is optional; absent fields take the defaults documented on
/// [`crate::plan::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Root directory for build output (default: `<packagePath>/.build`).
    #[serde(rename = "buildPath")]
    pub build_path: Option<Value>,

    /// Directory of the Swift package to build (default: cwd).
    #[serde(rename = "packagePath")]
    pub package_path: Option<Value>,

    /// Product to build; inferred from the manifest when absent.
    pub product: Option<Value>,

    /// Target triple forwarded to SwiftPM as `--triple`.
    pub triple: Option<Value>,

    /// Node-API level: a positive integer or the string `"experimental"`.
    pub napi: Option<Value>,

    /// Build a statically linked addon (default: dynamic).
    #[serde(rename = "static")]
    pub is_static: Option<Value>,

    /// Enable library evolution (stable module interfaces).
    #[serde(rename = "enableEvolution")]
    pub enable_evolution: Option<Value>,

    /// Flags passed to SwiftPM itself.
    #[serde(rename = "swiftPMFlags")]
    pub swiftpm_flags: Option<Value>,

    /// Flags forwarded to the C compiler (`-Xcc`).
    #[serde(rename = "cFlags")]
    pub c_flags: Option<Value>,

    /// Flags forwarded to the Swift compiler (`-Xswiftc`).
    #[serde(rename = "swiftFlags")]
    pub swift_flags: Option<Value>,

    /// Flags forwarded to the C++ compiler (`-Xcxx`).
    #[serde(rename = "cxxFlags")]
    pub cxx_flags: Option<Value>,

    /// Flags forwarded to the linker (`-Xlinker`).
    #[serde(rename = "linkerFlags")]
    pub linker_flags: Option<Value>,
}

impl BuildConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

/// Human-readable class of a JSON value, for validation errors.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalize a flag-group field into an ordered token sequence.
///
/// Accepts an absent field (empty), a single space-delimited string, or an
/// array of strings. Anything else fails naming the offending field.
pub fn flag_tokens(field: &'static str, value: Option<&Value>) -> Result<Vec<String>, BuildError> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => {
            if s.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(s.split(' ').map(str::to_string).collect())
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(BuildError::InvalidConfig {
                    field,
                    expected: "an array of strings",
                    found: json_type(other),
                }),
            })
            .collect(),
        Some(other) => Err(BuildError::InvalidConfig {
            field,
            expected: "a string or an array of strings",
            found: json_type(other),
        }),
    }
}

/// JavaScript-style truthiness, used for coerced boolean fields.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_tokens_absent() {
        assert!(flag_tokens("cFlags", None).unwrap().is_empty());
    }

    #[test]
    fn test_flag_tokens_string_splits_on_single_spaces() {
        let v = json!("-O2 -Wall -Werror");
        let tokens = flag_tokens("cFlags", Some(&v)).unwrap();
        assert_eq!(tokens, vec!["-O2", "-Wall", "-Werror"]);
    }

    #[test]
    fn test_flag_tokens_empty_string() {
        let v = json!("");
        assert!(flag_tokens("cFlags", Some(&v)).unwrap().is_empty());
    }

    #[test]
    fn test_flag_tokens_array_is_identity() {
        let v = json!(["-g", "-fno-omit-frame-pointer"]);
        let tokens = flag_tokens("swiftFlags", Some(&v)).unwrap();
        assert_eq!(tokens, vec!["-g", "-fno-omit-frame-pointer"]);
    }

    #[test]
    fn test_flag_tokens_rejects_number() {
        let v = json!(42);
        let err = flag_tokens("linkerFlags", Some(&v)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("linkerFlags"));
        assert!(msg.contains("a number"));
    }

    #[test]
    fn test_flag_tokens_rejects_mixed_array() {
        let v = json!(["-g", 7]);
        let err = flag_tokens("cxxFlags", Some(&v)).unwrap_err();
        assert!(err.to_string().contains("cxxFlags"));
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("yes")));
        assert!(truthy(&json!([])));
    }

    #[test]
    fn test_config_from_json() {
        let config: BuildConfig = serde_json::from_str(
            r#"{
                "product": "MyAddon",
                "napi": 8,
                "static": false,
                "swiftPMFlags": "--disable-sandbox",
                "cFlags": ["-DDEBUG"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.product, Some(serde_json::json!("MyAddon")));
        assert_eq!(config.napi, Some(serde_json::json!(8)));
        assert_eq!(config.is_static, Some(serde_json::json!(false)));
        assert!(config.triple.is_none());
    }
}
