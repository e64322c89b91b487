//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use parcelnorm_core::config::{
    CliConfigOverrides, ConfigSource, LayeredConfig, ProcessingOrder, RotationOrigin,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_KEYS: [&str; 5] = [
    "PARCELNORM_MIN_AREA_ACRES",
    "PARCELNORM_NEGLIGIBLE_OVERLAP",
    "PARCELNORM_OVERLAP_TOLERANCE_ACRES",
    "PARCELNORM_PROCESSING_ORDER",
    "PARCELNORM_ROTATION_ORIGIN",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    clear_env();
    let file = config_file(
        r#"
minimum_area_acres = 0.25
negligible_overlap_fraction = 0.2
overlap_tolerance_acres = 0.001
processing_order = "area_descending"
rotation_default_origin = "centroid"
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.minimum_area_acres.value, 0.25);
    assert_eq!(config.minimum_area_acres.source, ConfigSource::File);
    assert_eq!(config.negligible_overlap_fraction.value, 0.2);
    assert_eq!(config.overlap_tolerance_acres.value, 0.001);
    assert_eq!(config.processing_order.value, ProcessingOrder::AreaDescending);
    assert_eq!(config.rotation_default_origin.source, ConfigSource::File);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file("minimum_area_acres = 0.25\nprocessing_order = \"area_descending\"");

    env::set_var("PARCELNORM_MIN_AREA_ACRES", "2.5");
    env::set_var("PARCELNORM_ROTATION_ORIGIN", "110.5,-7.25");

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.minimum_area_acres.value, 2.5);
    assert_eq!(config.minimum_area_acres.source, ConfigSource::Environment);
    assert_eq!(config.processing_order.value, ProcessingOrder::AreaDescending);
    assert_eq!(config.processing_order.source, ConfigSource::File);
    assert_eq!(
        config.rotation_default_origin.value,
        RotationOrigin::ExplicitPoint { longitude: 110.5, latitude: -7.25 }
    );

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("PARCELNORM_NEGLIGIBLE_OVERLAP", "a lot");
    env::set_var("PARCELNORM_PROCESSING_ORDER", "alphabetical");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.negligible_overlap_fraction.source, ConfigSource::Default);
    assert_eq!(config.processing_order.value, ProcessingOrder::InputOrder);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("PARCELNORM_PROCESSING_ORDER", "area");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        processing_order: Some(ProcessingOrder::InputOrder),
        negligible_overlap_fraction: Some(0.3),
        ..Default::default()
    });

    assert_eq!(config.processing_order.value, ProcessingOrder::InputOrder);
    assert_eq!(config.processing_order.source, ConfigSource::Cli);

    let pipeline = config.to_pipeline_config().unwrap();
    assert_eq!(pipeline.negligible_overlap_fraction, 0.3);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_toml_is_reported() {
    clear_env();
    let file = config_file("minimum_area_acres = \"lots\"");

    let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}
