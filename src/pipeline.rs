//! Build pipeline orchestration.
//!
//! A `build()` call runs two sequential, blocking SwiftPM phases:
//!
//! 1. **Introspection**: `swift package dump-package` against the user's
//!    package, parsed to resolve the product and minimum macOS version.
//! 2. **Build**: `swift build` against the bundled host package, which
//!    depends on the user's package via the environment overlay below.
//!
//! Either phase exiting non-zero is fatal and carries the exit code. There
//! is no timeout, retry, or cancellation; a hung toolchain hangs the tool.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::artifact::install_artifact;
use crate::config::BuildConfig;
use crate::errors::BuildError;
use crate::manifest::Manifest;
use crate::plan::{resolve, resolve_output_paths, BuildMode, ResolvedPlan};
use crate::platform::{dispatch, PlatformSpec, HOST_PRODUCT};
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::process::{find_swift, ProcessBuilder};

/// Name of the process the addon is loaded into, passed to the host package.
pub const HOST_BINARY: &str = "node";

pub const ENV_PACKAGE_NAME: &str = "SWIFT_ADDON_PACKAGE_NAME";
pub const ENV_PACKAGE_PATH: &str = "SWIFT_ADDON_PACKAGE_PATH";
pub const ENV_PRODUCT: &str = "SWIFT_ADDON_PRODUCT";
pub const ENV_HOST_BINARY: &str = "SWIFT_ADDON_HOST_BINARY";
pub const ENV_MACOS_VERSION: &str = "SWIFT_ADDON_MACOS_VERSION";
pub const ENV_DYNAMIC: &str = "SWIFT_ADDON_DYNAMIC";
pub const ENV_EVOLUTION: &str = "SWIFT_ADDON_EVOLUTION";

/// SwiftPM verbosity spellings stripped from introspection invocations,
/// where chatter would corrupt the JSON stdout.
const VERBOSE_FLAGS: [&str; 4] = ["-v", "--verbose", "--very-verbose", "--vv"];

/// Build the addon for one (mode, architecture) pair.
///
/// Returns the path of the installed `<product>.node` artifact.
pub fn build(mode: BuildMode, arch: &str, config: &BuildConfig) -> Result<PathBuf> {
    let plan = resolve(mode, arch, config)?;

    // Platform dispatch happens before any subprocess is spawned, so an
    // unsupported platform/arch pair never reaches the toolchain.
    let host_dir = host_package_dir()?;
    let platform = dispatch(std::env::consts::OS, arch, &host_dir)?;
    let swift = find_swift()?;

    tracing::info!(
        "building {} ({} / {})",
        plan.package_path.display(),
        mode.as_str(),
        arch
    );

    let manifest = introspect(&swift, &plan)?;
    let product = manifest.resolve_product(plan.product.as_deref())?;
    let macos_version = manifest.macos_version();

    run_build_phase(&swift, &plan, &platform, &host_dir, &manifest, &product, &macos_version)?;

    install_artifact(
        &plan.build_dir,
        mode,
        &platform.raw_library,
        &product,
        platform.codesign,
    )
}

/// Delete the build output tree. Tolerant of it not existing.
pub fn clean(config: &BuildConfig) -> Result<()> {
    let (_, build_path) = resolve_output_paths(config)?;
    remove_dir_all_if_exists(&build_path)
}

/// Phase 1: dump and parse the package manifest.
fn introspect(swift: &std::path::Path, plan: &ResolvedPlan) -> Result<Manifest> {
    let output = ProcessBuilder::new(swift)
        .args(["package", "dump-package", "--package-path"])
        .arg(&plan.package_path)
        .args(filter_verbose(&plan.swiftpm_flags))
        .args(&plan.tool_flags)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }
        return Err(BuildError::PhaseFailed {
            phase: "package dump-package",
            code: output.status.code().unwrap_or(-1),
        }
        .into());
    }

    Manifest::parse(&String::from_utf8_lossy(&output.stdout))
}

/// Phase 2: build the host package with the user's package as its target.
fn run_build_phase(
    swift: &std::path::Path,
    plan: &ResolvedPlan,
    platform: &PlatformSpec,
    host_dir: &std::path::Path,
    manifest: &Manifest,
    product: &str,
    macos_version: &str,
) -> Result<()> {
    let status = ProcessBuilder::new(swift)
        .args(["build", "--configuration", plan.mode.as_str()])
        .arg("--arch")
        .arg(&plan.arch)
        .args(["--product", HOST_PRODUCT])
        .arg("--package-path")
        .arg(host_dir)
        .arg("--scratch-path")
        .arg(&plan.build_dir)
        .args(&platform.linker_flags)
        .args(&plan.swiftpm_flags)
        .args(&plan.tool_flags)
        .envs(build_env(plan, manifest, product, macos_version))
        .status()?;

    if !status.success() {
        return Err(BuildError::PhaseFailed {
            phase: "build",
            code: status.code().unwrap_or(-1),
        }
        .into());
    }

    Ok(())
}

/// Environment overlay consumed by the host package's build logic.
///
/// All values are plain strings; the host package reads them back to depend
/// on the user's package by path.
fn build_env(
    plan: &ResolvedPlan,
    manifest: &Manifest,
    product: &str,
    macos_version: &str,
) -> Vec<(String, String)> {
    let flag = |b: bool| if b { "1" } else { "0" }.to_string();

    vec![
        (ENV_PACKAGE_NAME.to_string(), manifest.name.clone()),
        (
            ENV_PACKAGE_PATH.to_string(),
            plan.package_path.display().to_string(),
        ),
        (ENV_PRODUCT.to_string(), product.to_string()),
        (ENV_HOST_BINARY.to_string(), HOST_BINARY.to_string()),
        (ENV_MACOS_VERSION.to_string(), macos_version.to_string()),
        (ENV_DYNAMIC.to_string(), flag(plan.dynamic)),
        (ENV_EVOLUTION.to_string(), flag(plan.evolution)),
    ]
}

fn filter_verbose(flags: &[String]) -> Vec<String> {
    flags
        .iter()
        .filter(|f| !VERBOSE_FLAGS.contains(&f.as_str()))
        .cloned()
        .collect()
}

/// Directory of the bundled host package.
///
/// `SWIFT_ADDON_HOST_DIR` overrides the default location next to the
/// executable.
fn host_package_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SWIFT_ADDON_HOST_DIR") {
        return Ok(PathBuf::from(dir));
    }

    let exe = std::env::current_exe().context("failed to locate the running executable")?;
    Ok(exe
        .parent()
        .map(|p| p.join("host"))
        .unwrap_or_else(|| PathBuf::from("host")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_filter_verbose() {
        let flags: Vec<String> = ["-v", "--disable-sandbox", "--verbose", "--vv", "--jobs", "4"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            filter_verbose(&flags),
            vec!["--disable-sandbox", "--jobs", "4"]
        );
    }

    #[test]
    fn test_build_env_overlay() {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig {
            package_path: Some(json!(tmp.path().to_string_lossy())),
            is_static: Some(json!(true)),
            enable_evolution: Some(json!(true)),
            ..BuildConfig::default()
        };
        let plan = resolve(BuildMode::Release, "x86_64", &config).unwrap();
        let manifest = Manifest::parse(r#"{"name": "Pkg", "products": [{"name": "Foo"}]}"#).unwrap();

        let env = build_env(&plan, &manifest, "Foo", "12.0");
        let get = |key: &str| {
            env.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get(ENV_PACKAGE_NAME), "Pkg");
        assert_eq!(get(ENV_PRODUCT), "Foo");
        assert_eq!(get(ENV_HOST_BINARY), "node");
        assert_eq!(get(ENV_MACOS_VERSION), "12.0");
        assert_eq!(get(ENV_DYNAMIC), "0");
        assert_eq!(get(ENV_EVOLUTION), "1");
        assert_eq!(get(ENV_PACKAGE_PATH), plan.package_path.display().to_string());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig {
            package_path: Some(json!(tmp.path().to_string_lossy())),
            ..BuildConfig::default()
        };

        std::fs::create_dir_all(tmp.path().join(".build/x86_64/release")).unwrap();
        clean(&config).unwrap();
        assert!(!tmp.path().join(".build").exists());

        // Nonexistent build directory is not an error.
        clean(&config).unwrap();
    }
}
