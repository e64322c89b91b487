//! Config command implementation

use crate::cli::ConfigArgs;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use parcelnorm_core::config::CliConfigOverrides;
use std::collections::BTreeMap;
use tabled::Tabled;

pub fn execute(args: ConfigArgs, output: &OutputWriter) -> Result<()> {
    let layered =
        super::load_layered_config(args.config.as_deref(), CliConfigOverrides::default())?;

    // Sort by key for consistent output
    let values: BTreeMap<String, ConfigEntry> = layered
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| (key, ConfigEntry { value, source: format!("{:?}", source) }))
        .collect();

    if let Err(e) = layered.to_pipeline_config() {
        output.warning(format!("Effective configuration is invalid: {}", e));
    }

    if output.is_json() {
        output.result(ConfigOutput { values })?;
    } else {
        output.section("Configuration Values");

        #[derive(Tabled)]
        struct ConfigRow {
            #[tabled(rename = "Key")]
            key: String,
            #[tabled(rename = "Value")]
            value: String,
            #[tabled(rename = "Source")]
            source: String,
        }

        let rows: Vec<ConfigRow> = values
            .into_iter()
            .map(|(key, entry)| ConfigRow { key, value: entry.value, source: entry.source })
            .collect();
        output.table(rows);

        output.section("Configuration Precedence");
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
