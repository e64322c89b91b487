//! Run command implementation

use crate::cli::RunArgs;
use crate::export::to_feature_collection;
use crate::output::OutputWriter;
use crate::output_types::RunOutput;
use anyhow::{Context, Result};
use parcelnorm_core::config::CliConfigOverrides;
use parcelnorm_core::models::{RawRecord, ResolutionReport};
use parcelnorm_geo::Pipeline;
use std::fs;
use std::path::Path;
use tabled::Tabled;

pub fn execute(args: RunArgs, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        minimum_area_acres: args.min_area_acres,
        negligible_overlap_fraction: args.negligible_overlap,
        overlap_tolerance_acres: args.overlap_tolerance_acres,
        processing_order: args.order.map(Into::into),
        rotation_default_origin: None,
    };
    let config = super::load_layered_config(args.config.as_deref(), overrides)?
        .to_pipeline_config()
        .context("Invalid pipeline configuration")?;

    let records = load_records(&args.input)?;
    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run(&records)?;

    if let Some(path) = &args.output {
        fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    if let Some(path) = &args.geojson {
        let collection = to_feature_collection(&report);
        fs::write(path, serde_json::to_string_pretty(&collection)?)
            .with_context(|| format!("Failed to write GeoJSON to {}", path.display()))?;
    }

    if output.is_json() {
        output.result(RunOutput {
            input: args.input.display().to_string(),
            config,
            summary: report.summary.clone(),
            report_path: args.output.as_ref().map(|p| p.display().to_string()),
            geojson_path: args.geojson.as_ref().map(|p| p.display().to_string()),
            records: args.output.is_none().then(|| report.records.clone()),
        })?;
    } else {
        print_summary(&args, &report, output);
    }

    Ok(())
}

/// Read a JSON array of raw records
fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let records: Vec<RawRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records from {}", path.display()))?;
    tracing::debug!(count = records.len(), path = %path.display(), "Loaded raw records");
    Ok(records)
}

fn print_summary(args: &RunArgs, report: &ResolutionReport, output: &OutputWriter) {
    let summary = &report.summary;

    output.section("Run Summary");
    output.kv("Input", args.input.display());
    output.kv("Records", summary.total);
    output.kv("Accepted", summary.accepted);
    output.kv("Modified", summary.modified);
    output.kv("Rejected", summary.rejected);
    output.kv("Total Area", format!("{:.4} acres", summary.total_area_acres));

    if !summary.by_reason.is_empty() {
        output.section("Outcomes by Reason");

        #[derive(Tabled)]
        struct ReasonRow {
            #[tabled(rename = "Reason")]
            reason: String,
            #[tabled(rename = "Count")]
            count: usize,
        }

        let rows: Vec<ReasonRow> = summary
            .by_reason
            .iter()
            .map(|(reason, count)| ReasonRow { reason: reason.clone(), count: *count })
            .collect();
        output.table(rows);
    }

    if summary.rejected > 0 {
        output.warning(format!("{} of {} records were rejected", summary.rejected, summary.total));
    }

    match &args.output {
        Some(path) => output.success(format!("Report written to {}", path.display())),
        None => output.info("Use --output to write the full report"),
    }
    if let Some(path) = &args.geojson {
        output.success(format!("GeoJSON written to {}", path.display()));
    }
}
