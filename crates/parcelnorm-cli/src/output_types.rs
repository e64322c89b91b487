use parcelnorm_core::config::PipelineConfig;
use parcelnorm_core::models::{OutcomeRecord, ReportSummary};
use serde::Serialize;
use std::collections::BTreeMap;

/// Output for run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub input: String,
    pub config: PipelineConfig,
    pub summary: ReportSummary,
    pub report_path: Option<String>,
    pub geojson_path: Option<String>,
    /// Full records, included only when no report file was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<OutcomeRecord>>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: BTreeMap<String, ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}
