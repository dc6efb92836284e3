//! `swift-addon build` command

use anyhow::Result;
use serde_json::json;

use crate::cli::BuildArgs;
use crate::commands::{host_arch, load_config, napi_value};
use swift_addon::{build, BuildMode};

pub fn execute(args: BuildArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    // CLI overrides are folded into the raw config before resolution.
    if let Some(product) = args.product {
        config.product = Some(json!(product));
    }
    if let Some(path) = args.package_path {
        config.package_path = Some(json!(path.to_string_lossy()));
    }
    if let Some(path) = args.build_path {
        config.build_path = Some(json!(path.to_string_lossy()));
    }
    if let Some(triple) = args.triple {
        config.triple = Some(json!(triple));
    }
    if let Some(napi) = args.napi.as_deref() {
        config.napi = Some(napi_value(napi));
    }
    if args.static_link {
        config.is_static = Some(json!(true));
    }
    if args.enable_evolution {
        config.enable_evolution = Some(json!(true));
    }

    let mode = if args.release {
        BuildMode::Release
    } else {
        BuildMode::Debug
    };

    let arches = if args.arch.is_empty() {
        vec![host_arch()]
    } else {
        args.arch
    };

    // One isolated, sequential build per architecture.
    for arch in &arches {
        let artifact = build(mode, arch, &config)?;
        eprintln!("    Finished `{}` -> {}", arch, artifact.display());
    }

    Ok(())
}
