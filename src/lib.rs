//! swift-addon - build orchestrator for Swift-based Node.js native addons.
//!
//! This crate drives SwiftPM to build a user's Swift package into a loadable
//! `.node` native-extension file: a loosely-typed configuration is validated
//! into an immutable build plan, two SwiftPM phases run per architecture
//! (manifest introspection, then a build of the bundled host package), and
//! the resulting shared library is renamed and symlinked into a stable
//! layout.

pub mod artifact;
pub mod config;
pub mod errors;
pub mod manifest;
pub mod pipeline;
pub mod plan;
pub mod platform;
pub mod util;

pub use config::BuildConfig;
pub use errors::BuildError;
pub use manifest::Manifest;
pub use pipeline::{build, clean};
pub use plan::{BuildMode, ResolvedPlan};
