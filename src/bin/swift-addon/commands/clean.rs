//! `swift-addon clean` command

use anyhow::Result;
use serde_json::json;

use crate::cli::CleanArgs;
use crate::commands::load_config;
use swift_addon::clean;

pub fn execute(args: CleanArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(path) = args.package_path {
        config.package_path = Some(json!(path.to_string_lossy()));
    }
    if let Some(path) = args.build_path {
        config.build_path = Some(json!(path.to_string_lossy()));
    }

    clean(&config)?;
    eprintln!("     Removed build output");

    Ok(())
}
