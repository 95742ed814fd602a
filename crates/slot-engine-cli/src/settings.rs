//! Layered scan configuration: optional file, then `SLOTS__*` environment
//! variables. Command-line flags are applied on top by the caller.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use slot_engine::ScanConfig;

pub const ENV_PREFIX: &str = "SLOTS";

/// Load the scan configuration.
///
/// `path` may be any format the `config` crate recognises by extension
/// (TOML, JSON, YAML). `SLOTS__GRANULARITY_MINUTES=15` and friends override
/// file values.
pub fn load_scan_config(path: Option<&Path>) -> Result<ScanConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to load configuration")?;

    settings
        .try_deserialize::<ScanConfig>()
        .context("Invalid configuration")
}
