//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// swift-addon - build Swift packages into Node.js native addons
#[derive(Parser)]
#[command(name = "swift-addon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the addon for one or more architectures
    Build(BuildArgs),

    /// Remove build artifacts
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,

    /// Target architecture (repeatable; defaults to the host architecture)
    #[arg(long)]
    pub arch: Vec<String>,

    /// Path to a JSON build configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Product to build (overrides the config file)
    #[arg(long)]
    pub product: Option<String>,

    /// Directory of the Swift package (defaults to the current directory)
    #[arg(long)]
    pub package_path: Option<PathBuf>,

    /// Root directory for build output
    #[arg(long)]
    pub build_path: Option<PathBuf>,

    /// Target triple forwarded to SwiftPM
    #[arg(long)]
    pub triple: Option<String>,

    /// Node-API level (an integer or "experimental")
    #[arg(long)]
    pub napi: Option<String>,

    /// Build a statically linked addon
    #[arg(long = "static")]
    pub static_link: bool,

    /// Enable library evolution
    #[arg(long)]
    pub enable_evolution: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Path to a JSON build configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory of the Swift package (defaults to the current directory)
    #[arg(long)]
    pub package_path: Option<PathBuf>,

    /// Root directory for build output
    #[arg(long)]
    pub build_path: Option<PathBuf>,
}
