//! Platform dispatch for the build pipeline.
//!
//! Maps a (platform, architecture) pair to the raw shared-library filename
//! SwiftPM produces for the host package and the extra linker flags the
//! addon needs on that platform. Anything outside the table is an explicit
//! unsupported-platform error, raised before any subprocess is spawned.

use std::path::Path;

use crate::errors::BuildError;

/// Product name of the bundled host package's build target.
pub const HOST_PRODUCT: &str = "Host";

/// Per-platform build constants.
#[derive(Debug, Clone)]
pub struct PlatformSpec {
    /// Filename of the raw shared library SwiftPM emits.
    pub raw_library: String,

    /// Extra linker flags, already in `-Xlinker <token>` form.
    pub linker_flags: Vec<String>,

    /// Whether the final artifact should be ad-hoc code-signed.
    pub codesign: bool,
}

/// Look up the build constants for a platform/architecture pair.
///
/// `host_dir` is the bundled host package directory; on Windows it holds the
/// `node.lib` import library the addon delay-loads against.
pub fn dispatch(os: &str, arch: &str, host_dir: &Path) -> Result<PlatformSpec, BuildError> {
    match os {
        "macos" => Ok(PlatformSpec {
            raw_library: format!("lib{HOST_PRODUCT}.dylib"),
            linker_flags: xlinker(["-undefined", "dynamic_lookup"]),
            codesign: true,
        }),
        "linux" => Ok(PlatformSpec {
            raw_library: format!("lib{HOST_PRODUCT}.so"),
            linker_flags: xlinker(["--unresolved-symbols=ignore-all"]),
            codesign: false,
        }),
        // Delay-load the Node import library so symbol resolution against
        // the embedding node.exe is deferred until first use.
        "windows" if arch == "x86_64" => {
            let import_lib = host_dir
                .join("windows")
                .join("node.lib")
                .to_string_lossy()
                .into_owned();
            Ok(PlatformSpec {
                raw_library: format!("{HOST_PRODUCT}.dll"),
                linker_flags: xlinker([
                    import_lib.as_str(),
                    "delayimp.lib",
                    "/DELAYLOAD:node.exe",
                ]),
                codesign: false,
            })
        }
        _ => Err(BuildError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }),
    }
}

fn xlinker<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut flags = Vec::new();
    for token in tokens {
        flags.push("-Xlinker".to_string());
        flags.push(token.to_string());
    }
    flags
}
