// crates/synthex-cli/src/config.rs
//
// Loading the system configuration for the Synthex CLI.
// Read from a TOML file, or the defaults when the file is missing or invalid.

use std::fs;

use synthex_economics::SystemConfig;

/// Load and validate a `SystemConfig` from the TOML file at `path`.
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load(path: &str) -> Result<SystemConfig, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(expand_tilde(path))?;
    let config: SystemConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration at `path`, falling back to defaults with a warning.
pub fn load_or_default(path: &str) -> SystemConfig {
    match load(path) {
        Ok(config) => {
            tracing::info!("Loaded configuration from {}", path);
            config
        }
        Err(e) => {
            tracing::warn!("Could not load config from {}: {}. Using defaults.", path, e);
            SystemConfig::default()
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
