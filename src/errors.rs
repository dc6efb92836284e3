//! Error types for configuration validation and the build pipeline.

use thiserror::Error;

/// Error raised while validating configuration or driving a build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A configuration field had a malformed type or value.
    #[error("invalid value for `{field}`: expected {expected}, got {found}")]
    InvalidConfig {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// The configured package path does not exist.
    #[error("package path does not exist: {path}")]
    PackagePathNotFound { path: String },

    /// The host platform/architecture pair has no build mapping.
    #[error("unsupported platform/arch combination: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// An external toolchain invocation exited with a non-zero status.
    #[error("`swift {phase}` exited with code {code}")]
    PhaseFailed { phase: &'static str, code: i32 },

    /// The package manifest declares no products and none was configured.
    #[error("no products found in package `{package}`")]
    NoProducts { package: String },

    /// The package manifest declares several products and none was configured.
    #[error(
        "package `{package}` declares multiple products ({products}); \
         set `product` in the build configuration to choose one"
    )]
    AmbiguousProduct { package: String, products: String },
}
