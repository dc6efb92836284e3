//! Configuration resolution.
//!
//! [`resolve`] turns a raw [`BuildConfig`] plus a build target (mode,
//! architecture) into an immutable [`ResolvedPlan`]. Validation runs
//! field-by-field in a fixed order; the first failure wins and nothing
//! partially resolved escapes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::{flag_tokens, json_type, truthy, BuildConfig};
use crate::errors::BuildError;

/// Build mode, selecting the SwiftPM configuration and the artifact
/// subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }
}

/// Fully-resolved build plan for a single `build()` invocation.
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub mode: BuildMode,
    pub arch: String,

    /// Dynamic linking (the default); false when `static` was set.
    pub dynamic: bool,

    /// Canonical absolute path of the package being built.
    pub package_path: PathBuf,

    /// Root build output directory (shared across architectures).
    pub build_path: PathBuf,

    /// Architecture-qualified scratch directory for this invocation.
    pub build_dir: PathBuf,

    /// Configured product name, if any; otherwise inferred from the
    /// manifest during introspection.
    pub product: Option<String>,

    /// Whether library evolution is enabled.
    pub evolution: bool,

    /// Flags passed to SwiftPM itself (`--triple`, evolution, user flags).
    pub swiftpm_flags: Vec<String>,

    /// Auxiliary `-X<tool> <token>` pairs appended to every invocation.
    pub tool_flags: Vec<String>,
}

/// Validate `packagePath`/`buildPath` and derive the output root.
///
/// Shared between [`resolve`] and `clean`, which needs the output root
/// without a full plan.
pub fn resolve_output_paths(config: &BuildConfig) -> Result<(PathBuf, PathBuf)> {
    let package_path = match &config.package_path {
        None => std::env::current_dir().context("failed to determine current directory")?,
        Some(Value::String(s)) => PathBuf::from(s),
        Some(other) => {
            return Err(invalid("packagePath", "a string", other).into());
        }
    };

    let package_path = package_path
        .canonicalize()
        .map_err(|_| BuildError::PackagePathNotFound {
            path: package_path.display().to_string(),
        })?;

    let build_path = match &config.build_path {
        None => package_path.join(".build"),
        Some(Value::String(s)) => {
            let p = PathBuf::from(s);
            if p.is_absolute() {
                p
            } else {
                std::env::current_dir()
                    .context("failed to determine current directory")?
                    .join(p)
            }
        }
        Some(other) => {
            return Err(invalid("buildPath", "a string", other).into());
        }
    };

    Ok((package_path, build_path))
}

/// Resolve a raw configuration into a [`ResolvedPlan`].
pub fn resolve(mode: BuildMode, arch: &str, config: &BuildConfig) -> Result<ResolvedPlan> {
    // static
    let dynamic = match &config.is_static {
        None => true,
        Some(Value::Bool(b)) => !b,
        Some(other) => return Err(invalid("static", "a boolean", other).into()),
    };

    // packagePath / buildPath
    let (package_path, build_path) = resolve_output_paths(config)?;

    // Flag groups
    let mut swiftpm_flags = flag_tokens("swiftPMFlags", config.swiftpm_flags.as_ref())?;
    let mut c_flags = flag_tokens("cFlags", config.c_flags.as_ref())?;
    let mut swift_flags = flag_tokens("swiftFlags", config.swift_flags.as_ref())?;
    let cxx_flags = flag_tokens("cxxFlags", config.cxx_flags.as_ref())?;
    let linker_flags = flag_tokens("linkerFlags", config.linker_flags.as_ref())?;

    // triple
    match &config.triple {
        None => {}
        Some(Value::String(s)) => {
            swiftpm_flags.push("--triple".to_string());
            swiftpm_flags.push(s.clone());
        }
        Some(other) => return Err(invalid("triple", "a string", other).into()),
    }

    // napi
    match &config.napi {
        None => {}
        Some(Value::Number(n)) if n.as_u64().is_some_and(|v| v >= 1) => {
            let level = n.as_u64().unwrap_or(1);
            c_flags.push(format!("-DNAPI_VERSION={level}"));
            swift_flags.push("-DNAPI_VERSIONED".to_string());
            for version in 1..=level {
                swift_flags.push(format!("-DNAPI_GE_{version}"));
            }
        }
        Some(Value::String(s)) if s == "experimental" => {
            c_flags.push("-DNAPI_EXPERIMENTAL".to_string());
            swift_flags.push("-DNAPI_EXPERIMENTAL".to_string());
        }
        Some(other) => {
            return Err(
                invalid("napi", "a positive integer or \"experimental\"", other).into(),
            );
        }
    }

    // enableEvolution (coerced)
    let evolution = config.enable_evolution.as_ref().map_or(false, truthy);
    if evolution {
        swiftpm_flags.push("--enable-library-evolution".to_string());
    }

    // product
    let product = match &config.product {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => return Err(invalid("product", "a string", other).into()),
    };

    // Auxiliary -X<tool> pairs, appended to every external invocation.
    let mut tool_flags = Vec::new();
    interleave("cc", &c_flags, &mut tool_flags);
    interleave("swiftc", &swift_flags, &mut tool_flags);
    interleave("cxx", &cxx_flags, &mut tool_flags);
    interleave("linker", &linker_flags, &mut tool_flags);

    let build_dir = build_path.join(arch);

    Ok(ResolvedPlan {
        mode,
        arch: arch.to_string(),
        dynamic,
        package_path,
        build_path,
        build_dir,
        product,
        evolution,
        swiftpm_flags,
        tool_flags,
    })
}

fn invalid(field: &'static str, expected: &'static str, value: &Value) -> BuildError {
    BuildError::InvalidConfig {
        field,
        expected,
        found: json_type(value),
    }
}

fn interleave(tool: &str, tokens: &[String], out: &mut Vec<String>) {
    for token in tokens {
        out.push(format!("-X{tool}"));
        out.push(token.clone());
    }
}
