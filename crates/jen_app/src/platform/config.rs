use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use jen_core::{is_valid_url, JenConfig};
use jen_logging::jen_debug;

pub const DEFAULT_CONFIG_FILENAME: &str = "jen.ron";

/// Reads the connection record for the current repository.
pub fn load_config(path: &Path) -> anyhow::Result<JenConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let config: JenConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config from {}", path.display()))?;

    if !is_valid_url(&config.url) {
        bail!("config {} has an invalid server url: {}", path.display(), config.url);
    }

    jen_debug!("Loaded config from {:?}", path);
    Ok(config)
}
