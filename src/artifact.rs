//! Artifact assembly.
//!
//! After a successful build phase, the raw shared library SwiftPM emitted is
//! renamed to the canonical `<product>.node` inside the mode subdirectory,
//! and a `<product>.node` symlink at the build directory root is pointed at
//! it so consumers always load the most recent build.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::plan::BuildMode;
use crate::util::fs::replace_symlink;
use crate::util::process::ProcessBuilder;

/// Rename the raw library to `<product>.node` and publish the symlink.
///
/// Returns the path of the renamed artifact. When `codesign` is set the
/// artifact is ad-hoc signed; signing failures are logged and ignored since
/// an unsigned artifact is still usable.
pub fn install_artifact(
    build_dir: &Path,
    mode: BuildMode,
    raw_library: &str,
    product: &str,
    codesign: bool,
) -> Result<PathBuf> {
    let mode_dir = build_dir.join(mode.as_str());
    let raw = mode_dir.join(raw_library);
    let artifact = mode_dir.join(format!("{product}.node"));

    fs::rename(&raw, &artifact).with_context(|| {
        format!(
            "failed to rename {} to {}",
            raw.display(),
            artifact.display()
        )
    })?;

    // Relative target so the link survives moving the build tree.
    let link = build_dir.join(format!("{product}.node"));
    let target = Path::new(mode.as_str()).join(format!("{product}.node"));
    replace_symlink(&target, &link)?;

    if codesign {
        sign_ad_hoc(&artifact);
    }

    Ok(artifact)
}

/// Best-effort ad-hoc code signing.
fn sign_ad_hoc(artifact: &Path) {
    let result = ProcessBuilder::new("codesign")
        .args(["--force", "--sign", "-"])
        .arg(artifact)
        .output();

    match result {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            tracing::warn!(
                "codesign failed for {}: {}",
                artifact.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Err(e) => {
            tracing::warn!("codesign unavailable for {}: {}", artifact.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::fs::ensure_dir;
    use tempfile::TempDir;

    fn fake_build_output(build_dir: &Path, mode: &str, raw: &str) {
        let mode_dir = build_dir.join(mode);
        ensure_dir(&mode_dir).unwrap();
        fs::write(mode_dir.join(raw), b"\x7fELF fake").unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_install_renames_and_links() {
        let tmp = TempDir::new().unwrap();
        let build_dir = tmp.path().join("x86_64");
        fake_build_output(&build_dir, "release", "libHost.so");

        let artifact =
            install_artifact(&build_dir, BuildMode::Release, "libHost.so", "Foo", false).unwrap();

        assert_eq!(artifact, build_dir.join("release").join("Foo.node"));
        assert!(artifact.exists());
        assert!(!build_dir.join("release").join("libHost.so").exists());

        let link = build_dir.join("Foo.node");
        assert_eq!(
            fs::read_link(&link).unwrap(),
            PathBuf::from("release/Foo.node")
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_tracks_latest_mode() {
        let tmp = TempDir::new().unwrap();
        let build_dir = tmp.path().join("arm64");

        fake_build_output(&build_dir, "release", "libHost.so");
        install_artifact(&build_dir, BuildMode::Release, "libHost.so", "Foo", false).unwrap();

        fake_build_output(&build_dir, "debug", "libHost.so");
        install_artifact(&build_dir, BuildMode::Debug, "libHost.so", "Foo", false).unwrap();

        let link = build_dir.join("Foo.node");
        assert_eq!(
            fs::read_link(&link).unwrap(),
            PathBuf::from("debug/Foo.node")
        );
        // Both mode artifacts remain on disk.
        assert!(build_dir.join("release/Foo.node").exists());
        assert!(build_dir.join("debug/Foo.node").exists());
    }

    #[test]
    fn test_missing_raw_library_fails() {
        let tmp = TempDir::new().unwrap();
        let build_dir = tmp.path().join("x86_64");
        ensure_dir(&build_dir.join("release")).unwrap();

        let err = install_artifact(&build_dir, BuildMode::Release, "libHost.so", "Foo", false)
            .unwrap_err();
        assert!(err.to_string().contains("failed to rename"));
    }
}
