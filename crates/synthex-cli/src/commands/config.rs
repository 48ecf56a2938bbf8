// crates/synthex-cli/src/commands/config.rs
//
// `synthex config`: print the effective system configuration.

use synthex_economics::SystemConfig;

use crate::output::{format_json, OutputFormat};

/// Run the config command.
pub fn run(config: &SystemConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", format_json(config)),
        OutputFormat::Table => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}
